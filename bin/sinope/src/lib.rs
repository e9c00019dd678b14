mod bridge;
pub use bridge::Bridge;

mod commands;
pub use commands::{Commands, Delivery};

mod config;
pub use config::{level_filter, Args, BridgeConfig};

mod error;
pub use error::Error;

mod gateway;
pub use gateway::GatewayClient;

mod poller;
pub use poller::{refresh, Poller, Report};

mod pubsub;
pub use pubsub::{Inbound, Mqtt, PubSubClient};

mod shutdown;
pub use shutdown::Shutdown;

mod storage;
pub use storage::{Gateway, Storage, Thermostat};

mod supervisor;
pub use supervisor::supervise;

#[cfg(test)]
mod testing;

pub type Result<T> = std::result::Result<T, Error>;
