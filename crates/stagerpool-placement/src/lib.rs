//! stagerpool-placement — stager advertisement tracking and placement.
//!
//! Stagers announce spare capacity through expiring heartbeats. The
//! [`StagerPool`] keeps the latest snapshot per stager and answers "which
//! stager should stage this app?" for a `(stack, memory, disk)` request.
//!
//! # Selection pass
//!
//! ```text
//! find_stager(stack, memory, disk)        [table lock held throughout]
//!   1. any advertisement lists stack?  no → StackUnavailable
//!   2. prune advertisements with expires_at <= now
//!   3. keep stagers with stack, memory and disk to spare
//!   4. sort by available memory, keep the top N
//!   5. pick one uniformly at random     (none fit → Ok(None))
//! ```
//!
//! # Components
//!
//! - **`pool`** — `StagerPool`, the locked table and its operations
//! - **`selector`** — window sizing, ranking and sampling
//! - **`config`** — `PoolConfig` (TTL, top-stager percentage)
//! - **`clock`** — wall-clock abstraction for expiry

pub mod clock;
pub mod config;
pub mod error;
pub mod pool;
pub mod selector;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_ADVERTISEMENT_TIMEOUT_SECS, PoolConfig};
pub use error::{PlacementError, PlacementResult};
pub use pool::StagerPool;
pub use selector::{MIN_TOP_STAGERS, sample, top_n, window_size};
pub use stagerpool_advert::{Advertisement, StagerHeartbeat, StagerId};
