//! Centralized home-based storage paths for all crm-mobile persistence.
//!
//! This module provides helpers for unified storage under `~/.crm-mobile/`:
//! - `storage/<key>.json` - Persisted store snapshot (one slot per storage key)
//! - `logs/events.jsonl` - Structured mutation journal
//! - `config.yaml` - Optional user configuration
//!
//! The root can be redirected with the `CRM_MOBILE_HOME` environment variable.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the crm-mobile directory inside the user's home.
const CRM_MOBILE_DIR: &str = ".crm-mobile";

/// Environment variable that overrides the storage root.
pub const HOME_OVERRIDE_ENV: &str = "CRM_MOBILE_HOME";

/// Returns the crm-mobile root directory: `~/.crm-mobile/` (or `$CRM_MOBILE_HOME`).
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn crm_home_dir() -> Result<PathBuf> {
    let root = match std::env::var_os(HOME_OVERRIDE_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .context("Could not determine home directory for crm-mobile storage")?
            .join(CRM_MOBILE_DIR),
    };
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create crm-mobile directory: {}", root.display()))?;
    Ok(root)
}

/// Returns the storage directory: `~/.crm-mobile/storage/`
///
/// Creates the directory if it doesn't exist.
pub fn storage_dir() -> Result<PathBuf> {
    let dir = crm_home_dir()?.join("storage");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the storage slot for a key: `~/.crm-mobile/storage/<key>.json`
pub fn storage_path(storage_key: &str) -> Result<PathBuf> {
    Ok(storage_dir()?.join(format!("{}.json", storage_key)))
}

/// Returns the logs directory: `~/.crm-mobile/logs/`
///
/// Creates the directory if it doesn't exist.
pub fn logs_dir() -> Result<PathBuf> {
    let dir = crm_home_dir()?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the user config path: `~/.crm-mobile/config.yaml`
pub fn config_path() -> Result<PathBuf> {
    Ok(crm_home_dir()?.join("config.yaml"))
}

#[cfg(test)]
#[path = "tests/crm_paths_tests.rs"]
mod tests;
