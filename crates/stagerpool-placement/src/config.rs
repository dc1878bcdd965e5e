//! Pool configuration.
//!
//! Fixed at construction and never re-read. Accepts the legacy key names
//! used by older controller configs (`dea_advertisement_timeout_in_seconds`,
//! `placement_top_stager_percentage`) as aliases.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, PlacementResult};

/// Default advertisement lifetime in seconds.
pub const DEFAULT_ADVERTISEMENT_TIMEOUT_SECS: u64 = 10;

/// Immutable settings for a [`StagerPool`](crate::StagerPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Seconds a heartbeat stays valid after it is recorded.
    #[serde(alias = "dea_advertisement_timeout_in_seconds")]
    pub advertisement_timeout_secs: u64,
    /// Share of the fleet (0–100) eligible for random selection.
    #[serde(alias = "placement_top_stager_percentage")]
    pub top_stager_percentage: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            advertisement_timeout_secs: DEFAULT_ADVERTISEMENT_TIMEOUT_SECS,
            top_stager_percentage: 0,
        }
    }
}

impl PoolConfig {
    pub fn new(advertisement_timeout_secs: u64, top_stager_percentage: u32) -> Self {
        Self {
            advertisement_timeout_secs,
            top_stager_percentage,
        }
    }

    pub fn advertisement_timeout(&self) -> Duration {
        Duration::from_secs(self.advertisement_timeout_secs)
    }

    pub fn validate(&self) -> PlacementResult<()> {
        if self.advertisement_timeout_secs == 0 {
            return Err(PlacementError::InvalidConfig(
                "advertisement_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.top_stager_percentage > 100 {
            return Err(PlacementError::InvalidConfig(format!(
                "top_stager_percentage must be within 0..=100, got {}",
                self.top_stager_percentage
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document containing only pool keys.
    pub fn from_toml_str(content: &str) -> PlacementResult<Self> {
        let config: PoolConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> PlacementResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
