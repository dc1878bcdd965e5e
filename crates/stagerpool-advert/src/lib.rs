//! stagerpool-advert — stager advertisements and heartbeat decoding.
//!
//! Stagers periodically publish a heartbeat describing their free memory,
//! free disk and the stacks they can build against. This crate turns those
//! payloads into [`Advertisement`] snapshots with an absolute expiry, and
//! provides the capacity predicates the placement engine filters on.
//!
//! # Lifecycle
//!
//! ```text
//! raw bytes ──► StagerHeartbeat::from_slice ──► validate
//!                                                  │
//!                      into_advertisement(expires_at)
//!                                                  ▼
//!                                           Advertisement
//! ```

pub mod error;
pub mod heartbeat;
pub mod types;

pub use error::{AdvertError, AdvertResult};
pub use heartbeat::StagerHeartbeat;
pub use types::{Advertisement, StagerId};
