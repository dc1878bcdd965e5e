//! Placement error types.

use thiserror::Error;

use stagerpool_advert::AdvertError;

/// Errors that can occur while recording heartbeats or placing work.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// No advertisement, live or stale, lists the requested stack.
    #[error("the requested app stack {0} is not available on this system")]
    StackUnavailable(String),

    #[error("no advertisement for stager: {0}")]
    StagerNotFound(String),

    #[error("rejected heartbeat: {0}")]
    Heartbeat(#[from] AdvertError),

    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse pool configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read pool configuration: {0}")]
    ConfigRead(#[from] std::io::Error),
}

pub type PlacementResult<T> = Result<T, PlacementError>;
