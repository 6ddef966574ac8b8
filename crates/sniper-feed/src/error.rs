//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed protobuf frame: {0}")]
    Protobuf(#[from] prost::DecodeError),

    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(#[from] sniper_core::CoreError),
}

pub type FeedResult<T> = Result<T, FeedError>;
