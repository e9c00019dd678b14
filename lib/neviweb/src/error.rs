use std::fmt;

const SESSION_EXPIRED: &str = "USRSESSEXP";

#[derive(Debug)]
pub enum Error {
    Timeout,
    Connection(reqwest::Error),
    Http(reqwest::Error),
    Status(u16),
    Api(String),
    SessionExpired,
    NotConnected,
    Json(serde_json::Error),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Failures that a fresh session may cure.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connection(_) | Self::SessionExpired
        )
    }

    /// Reading a response body only fails on the transport; decoding is
    /// done separately with `serde_json`.
    pub(crate) fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Connection(err)
        }
    }

    pub(crate) fn from_code(code: String) -> Self {
        if code == SESSION_EXPIRED {
            Self::SessionExpired
        } else {
            Self::Api(code)
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() {
            // refused, reset or dropped before a complete response
            Self::Connection(err)
        } else {
            Self::Http(err)
        }
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
            Self::Timeout => write!(f, "request timed out"),
            Self::Connection(err) => write!(f, "connection error: {err}"),
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Status(status) => write!(f, "unexpected status code {status}"),
            Self::Api(code) => write!(f, "neviweb error {code}"),
            Self::SessionExpired => write!(f, "session expired"),
            Self::NotConnected => write!(f, "not connected"),
            Self::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
