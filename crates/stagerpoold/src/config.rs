//! stagerpoold.toml configuration.
//!
//! ```toml
//! [pool]
//! advertisement_timeout_secs = 10
//! top_stager_percentage = 10
//!
//! [log]
//! filter = "info,stagerpool_placement=debug"
//! json = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use stagerpool_placement::PoolConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        config.pool.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides, then re-validate.
    pub fn with_overrides(
        mut self,
        advertisement_timeout_secs: Option<u64>,
        top_stager_percentage: Option<u32>,
    ) -> anyhow::Result<Self> {
        if let Some(ttl) = advertisement_timeout_secs {
            self.pool.advertisement_timeout_secs = ttl;
        }
        if let Some(pct) = top_stager_percentage {
            self.pool.top_stager_percentage = pct;
        }
        self.pool.validate()?;
        Ok(self)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
