//! Queue configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the default wait threshold in milliseconds.
pub const ENV_WARN_AFTER_MS: &str = "LANE_QUEUE_WARN_AFTER_MS";
/// Environment variable holding initial lane ceilings, e.g. `cron=2,subagent=4`.
pub const ENV_CONCURRENCY: &str = "LANE_QUEUE_CONCURRENCY";

const fn default_warn_after_ms() -> u64 {
    2000
}

/// Per-lane configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Initial admission ceiling.
    pub max_concurrent: usize,
}

/// Root queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Wait threshold applied when enqueue options leave it unset.
    #[serde(default = "default_warn_after_ms")]
    pub default_warn_after_ms: u64,
    /// Initial ceilings keyed by lane name. Lanes not listed start at 1.
    #[serde(default)]
    pub lanes: HashMap<String, LaneConfig>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_warn_after_ms: default_warn_after_ms(),
            lanes: HashMap::new(),
        }
    }
}

impl LaneConfig {
    /// Validate lane configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than 0".into());
        }
        Ok(())
    }
}

impl QueueConfig {
    /// Validate the threshold and every lane.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_warn_after_ms == 0 {
            return Err("default_warn_after_ms must be greater than 0".into());
        }
        for (name, lane) in &self.lanes {
            lane.validate()
                .map_err(|e| format!("lane `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Default wait threshold as a duration.
    pub const fn default_warn_after(&self) -> Duration {
        Duration::from_millis(self.default_warn_after_ms)
    }

    /// Parse queue configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the process environment, loading a `.env`
    /// file first if one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_WARN_AFTER_MS) {
            cfg.default_warn_after_ms = raw
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_WARN_AFTER_MS}: {e}"))?;
        }
        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            cfg.lanes = parse_concurrency_list(&raw)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Parse `lane=n` pairs separated by commas.
fn parse_concurrency_list(raw: &str) -> Result<HashMap<String, LaneConfig>, String> {
    let mut lanes = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("{ENV_CONCURRENCY}: expected lane=n, got `{pair}`"))?;
        let max_concurrent = value
            .trim()
            .parse()
            .map_err(|e| format!("{ENV_CONCURRENCY}: lane `{}`: {e}", name.trim()))?;
        lanes.insert(name.trim().to_owned(), LaneConfig { max_concurrent });
    }
    Ok(lanes)
}
