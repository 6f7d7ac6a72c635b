use crate::crm_paths;
use crate::status_policy::TransitionMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Fixed storage namespace for the persisted snapshot.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Label recorded as the author of every last-action entry.
    #[serde(default = "default_actor")]
    pub actor: String,
    #[serde(default)]
    pub transition_mode: TransitionMode,
    /// Populate demo records when no stored state exists.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    /// Write the JSONL mutation journal.
    #[serde(default = "default_true")]
    pub journal: bool,
}

/// Simulated round-trip latency per operation.
/// All fields have defaults so partial configs stay valid.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LatencyConfig {
    #[serde(default = "default_create_latency_ms")]
    pub create_deal_ms: u64,
    #[serde(default = "default_create_latency_ms")]
    pub create_proposal_ms: u64,
    #[serde(default = "default_update_latency_ms")]
    pub update_status_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            create_deal_ms: default_create_latency_ms(),
            create_proposal_ms: default_create_latency_ms(),
            update_status_ms: default_update_latency_ms(),
        }
    }
}

impl LatencyConfig {
    pub fn zero() -> Self {
        Self {
            create_deal_ms: 0,
            create_proposal_ms: 0,
            update_status_ms: 0,
        }
    }

    pub fn create_deal(&self) -> Duration {
        Duration::from_millis(self.create_deal_ms)
    }

    pub fn create_proposal(&self) -> Duration {
        Duration::from_millis(self.create_proposal_ms)
    }

    pub fn update_status(&self) -> Duration {
        Duration::from_millis(self.update_status_ms)
    }
}

fn default_storage_key() -> String {
    "crm-mobile-storage".to_string()
}

fn default_actor() -> String {
    "User".to_string()
}

fn default_true() -> bool {
    true
}

fn default_create_latency_ms() -> u64 {
    2000
}

fn default_update_latency_ms() -> u64 {
    1000
}

impl StoreConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        const DEFAULT_CONFIG_YAML: &str = include_str!("../crm-mobile.yaml");

        serde_yaml::from_str(DEFAULT_CONFIG_YAML)
            .expect("Failed to parse embedded crm-mobile.yaml - this is a bug in the crm-mobile.yaml file")
    }

    /// Picks the explicit path, then `~/.crm-mobile/config.yaml`, then the embedded default.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let user_path = crm_paths::config_path()?;
        if user_path.exists() {
            tracing::debug!("Loading config from {}", user_path.display());
            return Self::load(&user_path);
        }
        Ok(Self::default_config())
    }

    /// Returns this config with every simulated latency set to zero.
    pub fn without_latency(mut self) -> Self {
        self.latency = LatencyConfig::zero();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            anyhow::bail!("storage_key must not be empty");
        }

        if self
            .storage_key
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '.')
        {
            anyhow::bail!(
                "storage_key '{}' must not contain path separators or dots",
                self.storage_key
            );
        }

        if self.actor.trim().is_empty() {
            anyhow::bail!("actor label must not be empty");
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
