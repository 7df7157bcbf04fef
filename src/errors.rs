use astra::Response;
// errors.rs
use std::fmt;

/// Errors originating from the web layer itself
/// (routing, bad form input, etc.) or downstream layers (DB, remote API).
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    /// The reports API rejected our token. Terminal for the session: the
    /// stored token is cleared and the user is sent back to /login.
    Unauthorized,
    DbError(String),
    ApiError(String),
    XlsxError(String),
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::Unauthorized => write!(f, "Unauthorized"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::ApiError(msg) => write!(f, "Reports API Error: {msg}"),
            ServerError::XlsxError(msg) => write!(f, "Spreadsheet Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}
