use std::fmt;
use std::str::FromStr;

use serde::de::{value, Error};

const PREFIX: &str = "sinope";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topic {
    Status,
    Set,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topic::Status => write!(f, "{PREFIX}/status"),
            Topic::Set => write!(f, "{PREFIX}/set"),
        }
    }
}

impl FromStr for Topic {
    type Err = value::Error;

    fn from_str(s: &str) -> std::result::Result<Topic, Self::Err> {
        const ERROR_MSG: &str = "supported topics are sinope/status and sinope/set";

        let (prefix, name) = s
            .split_once('/')
            .ok_or_else(|| value::Error::custom(ERROR_MSG))?;

        match (prefix, name) {
            (PREFIX, "status") => Ok(Topic::Status),
            (PREFIX, "set") => Ok(Topic::Set),
            _ => Err(value::Error::custom(ERROR_MSG)),
        }
    }
}
