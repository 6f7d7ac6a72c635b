//! Durable storage slot for the store snapshot.
//!
//! ## Design Decisions
//!
//! - **One slot per storage key**: `~/.crm-mobile/storage/<key>.json`.
//! - **Layout**: `{ version, deals, proposals, isAuthenticated, userId }`.
//! - **Dates**: every timestamp is encoded as an RFC 3339 string with full
//!   sub-second precision and decoded back into `DateTime<Utc>`, so a reload
//!   yields exactly the committed values.
//! - **Atomic writes**: the snapshot is written to a temp file and synced to
//!   disk, then renamed over the slot. On unix the directory is synced too, so
//!   a save that returned `Ok` survives a crash.
//! - **Finite numbers only**: JSON has no encoding for `inf` or `NaN`, so a
//!   snapshot carrying one is refused instead of being stored as `null`.

use crate::crm_paths;
use crate::store::CrmState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Current storage format version.
/// Increment this when making breaking changes to the persisted layout.
pub const STORAGE_VERSION: u32 = 1;

/// The persisted form of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Format version; files written before versioning are treated as v1.
    #[serde(default = "unversioned")]
    pub version: u32,
    #[serde(flatten)]
    pub state: CrmState,
}

fn unversioned() -> u32 {
    1
}

impl PersistedState {
    pub fn new(state: CrmState) -> Self {
        Self {
            version: STORAGE_VERSION,
            state,
        }
    }
}

/// Serializes a snapshot to its JSON storage form.
pub fn encode(state: &CrmState) -> Result<String> {
    if let Some(proposal) = state
        .proposals
        .iter()
        .find(|p| p.p_and_p.estimated_value.is_some_and(|v| !v.is_finite()))
    {
        anyhow::bail!(
            "Proposal {} has a non-finite estimated value and cannot be stored",
            proposal.id
        );
    }

    let persisted = PersistedState::new(state.clone());
    serde_json::to_string_pretty(&persisted).context("Failed to serialize store snapshot")
}

/// Parses a snapshot from its JSON storage form.
pub fn decode(content: &str) -> Result<CrmState> {
    let persisted: PersistedState =
        serde_json::from_str(content).context("Failed to parse store snapshot as JSON")?;

    if persisted.version > STORAGE_VERSION {
        anyhow::bail!(
            "Storage version {} is newer than supported version {}. Please upgrade crm-mobile.",
            persisted.version,
            STORAGE_VERSION
        );
    }

    Ok(persisted.state)
}

/// A durable key-value slot holding one store snapshot.
#[derive(Debug, Clone)]
pub struct StorageSlot {
    path: PathBuf,
}

impl StorageSlot {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Opens the home-based slot for `storage_key`.
    pub fn for_key(storage_key: &str) -> Result<Self> {
        Ok(Self::new(crm_paths::storage_path(storage_key)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves a snapshot atomically.
    pub fn save(&self, state: &CrmState) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");
        let content = encode(state)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let mut file = File::create(&temp_path).with_context(|| {
            format!("Failed to create temp storage file: {}", temp_path.display())
        })?;
        file.write_all(content.as_bytes()).with_context(|| {
            format!("Failed to write temp storage file: {}", temp_path.display())
        })?;
        file.flush()
            .and_then(|()| file.sync_all())
            .with_context(|| format!("Failed to sync temp storage file: {}", temp_path.display()))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename temp file to: {}", self.path.display()))?;

        #[cfg(unix)]
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)
                .and_then(|dir| dir.sync_all())
                .with_context(|| format!("Failed to sync storage directory: {}", parent.display()))?;
        }

        Ok(())
    }

    /// Loads the stored snapshot, or `None` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<CrmState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage file: {}", self.path.display()))?;

        decode(&content)
            .with_context(|| format!("Invalid storage file: {}", self.path.display()))
            .map(Some)
    }

    /// Removes the stored snapshot, if any.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete storage file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
