use serde::{Deserialize, Serialize};

/// Thermostat reading published on [`crate::Topic::Status`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Status {
    pub name: String,
    pub temperature: f64,
    pub setpoint: f64,
}
