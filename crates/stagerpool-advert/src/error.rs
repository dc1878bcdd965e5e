//! Error types for heartbeat decoding.

use thiserror::Error;

/// Result type alias for advertisement operations.
pub type AdvertResult<T> = Result<T, AdvertError>;

/// Errors raised while turning a heartbeat payload into an advertisement.
#[derive(Debug, Error)]
pub enum AdvertError {
    #[error("malformed heartbeat: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("heartbeat has an empty stager id")]
    MissingStagerId,

    #[error("heartbeat from {stager_id} reports negative {field}: {value}")]
    NegativeCapacity {
        stager_id: String,
        field: &'static str,
        value: i64,
    },

    #[error("heartbeat from {0} lists an empty stack name")]
    EmptyStack(String),
}
