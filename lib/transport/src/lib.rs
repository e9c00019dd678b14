mod command;
pub use command::Command;

mod status;
pub use status::Status;

mod topic;
pub use topic::Topic;
