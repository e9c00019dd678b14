mod client;
pub use client::Client;

mod device;
pub use device::{Device, DeviceData, Gateway};

mod error;
pub use error::Error;

mod number;

pub type Result<T> = std::result::Result<T, Error>;
