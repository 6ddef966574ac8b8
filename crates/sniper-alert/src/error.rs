//! Alert error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub type AlertResult<T> = Result<T, AlertError>;
