//! CLI configuration
//!
//! Loaded from YAML (see `cli::runtime::load_config`); every field has a
//! default so a partial file or no file at all is fine.

use std::env;

use action_primitives::WaitPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const ENV_POLL_INTERVAL_MS: &str = "FORMPILOT_POLL_INTERVAL_MS";
pub const ENV_INTERRUPT_WAITS: &str = "FORMPILOT_INTERRUPT_WAITS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidOverride { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub automation: AutomationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub poll_interval_ms: u64,
    /// Implicit lookup budget for click/type/paste/... selectors
    pub lookup_timeout_ms: u64,
    pub scroll_settle_ms: u64,
    /// Let a stop request cut pauses and polls short
    pub interrupt_waits_on_stop: bool,
    /// Buffered status events per subscriber
    pub status_capacity: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        let policy = WaitPolicy::default();
        Self {
            poll_interval_ms: policy.poll_interval_ms,
            lookup_timeout_ms: policy.lookup_timeout_ms,
            scroll_settle_ms: policy.scroll_settle_ms,
            interrupt_waits_on_stop: policy.interrupt_on_cancel,
            status_capacity: 256,
        }
    }
}

impl AutomationConfig {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval_ms: self.poll_interval_ms.max(1),
            lookup_timeout_ms: self.lookup_timeout_ms,
            scroll_settle_ms: self.scroll_settle_ms,
            interrupt_on_cancel: self.interrupt_waits_on_stop,
        }
    }
}

impl Config {
    /// Apply `FORMPILOT_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let value = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: ENV_POLL_INTERVAL_MS,
                    value: raw.clone(),
                })?;
            self.automation.poll_interval_ms = value;
            info!(poll_interval_ms = value, "poll interval overridden from environment");
        }

        if let Some(raw) = lookup(ENV_INTERRUPT_WAITS) {
            let value = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        key: ENV_INTERRUPT_WAITS,
                        value: raw,
                    })
                }
            };
            self.automation.interrupt_waits_on_stop = value;
            info!(interrupt_waits_on_stop = value, "wait interruption overridden from environment");
        }
        Ok(())
    }
}
