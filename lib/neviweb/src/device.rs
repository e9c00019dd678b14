use serde::Deserialize;

use crate::number;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Gateway {
    pub id: u64,
    pub name: String,
    #[serde(skip)]
    pub devices: Vec<Device>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Device {
    pub id: u64,
    pub name: String,
}

/// Latest values reported by a thermostat. `None` while the device is offline.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DeviceData {
    #[serde(default, deserialize_with = "number::deserialize")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "number::deserialize")]
    pub setpoint: Option<f64>,
}
