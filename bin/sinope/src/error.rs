use std::fmt;

#[derive(Debug)]
pub enum Error {
    Neviweb(neviweb::Error),
    Mqtt(paho_mqtt::Error),
    Json(serde_json::Error),
    UnknownThermostat(String),
}

impl Error {
    /// Errors the supervisor recovers from by rebuilding both clients.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Neviweb(err) => err.is_connection(),
            Self::Mqtt(_) => true,
            Self::Json(_) | Self::UnknownThermostat(_) => false,
        }
    }
}

impl From<neviweb::Error> for Error {
    fn from(err: neviweb::Error) -> Self {
        Self::Neviweb(err)
    }
}

impl From<paho_mqtt::Error> for Error {
    fn from(err: paho_mqtt::Error) -> Self {
        Self::Mqtt(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neviweb(err) => write!(f, "neviweb error: {err}"),
            Self::Mqtt(err) => write!(f, "mqtt error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::UnknownThermostat(name) => write!(f, "unknown thermostat {name}"),
        }
    }
}

impl std::error::Error for Error {}
