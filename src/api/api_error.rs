use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    Network(String),
    Timeout(String),
    /// 401 from the API. Terminal for the session: the stored token is
    /// cleared and the user re-authenticates.
    Unauthorized,
    JsonParse(String),
    UnexpectedShape(String),
    Config(String),
}

impl ApiError {
    /// Transport-class failures are recoverable by falling back to
    /// cached or sample data; everything else propagates.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {msg}"),
            ApiError::Timeout(msg) => write!(f, "Request timed out: {msg}"),
            ApiError::Unauthorized => write!(f, "API rejected the auth token (401)"),
            ApiError::JsonParse(msg) => write!(f, "JSON parse error: {msg}"),
            ApiError::UnexpectedShape(msg) => write!(f, "Unexpected response shape: {msg}"),
            ApiError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl Error for ApiError {}
