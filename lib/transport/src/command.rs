use serde::{Deserialize, Serialize};

/// Request received on [`crate::Topic::Set`]. A missing `setpoint` asks for nothing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint: Option<f64>,
}
