//! Whole-blob persistence for the application state.
//!
//! One JSON document under a fixed path (default `~/.doing/state.json`),
//! loaded whole and saved whole. There is no migration machinery: a blob
//! predating the `llmConfig`/`prompts` fields is back-filled through serde
//! defaults, anything else that does not match the schema fails the load.
//!
//! Single-writer assumption: saves are last-writer-wins full replacements.
//! Two processes sharing the same path can overwrite each other's state
//! with no conflict detection.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::StorageError;
use crate::types::{AppState, User, UserRole};

/// File name of the persisted blob inside the data directory.
pub const STATE_FILE: &str = "state.json";

/// Data directory under the user's home, mirroring `~/.doing/`.
const DATA_DIR: &str = ".doing";

/// Handle on the single persisted state blob.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, `~/.doing/state.json`.
    pub fn open_default() -> Self {
        Self::new(default_state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored blob. Absent file yields the seed state (one
    /// administrator account, default LLM configuration). A present but
    /// malformed blob propagates the parse error.
    pub fn load(&self) -> Result<AppState, StorageError> {
        if !self.path.exists() {
            log::info!("no stored state at {}, seeding", self.path.display());
            return Ok(seed_state());
        }
        let raw = fs::read_to_string(&self.path)?;
        let state: AppState = serde_json::from_str(&raw)?;
        Ok(state)
    }

    /// Serialize the entire state and replace the stored blob.
    ///
    /// Writes to a sibling temp file and renames over the target so a
    /// crash mid-write never leaves a half-written blob behind.
    pub fn save(&self, state: &AppState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Delete the stored blob. Destructive and irreversible; callers are
    /// expected to confirm with the user first. The next `load` reseeds.
    pub fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::warn!("stored state cleared at {}", self.path.display());
        }
        Ok(())
    }
}

fn default_state_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(DATA_DIR)
        .join(STATE_FILE)
}

/// Fresh state for a first launch: a single administrator account and the
/// default LLM configuration.
pub fn seed_state() -> AppState {
    AppState {
        users: vec![initial_admin()],
        ..AppState::default()
    }
}

fn initial_admin() -> User {
    User {
        id: "u1".to_string(),
        uid: "ADMIN".to_string(),
        first_name: "System".to_string(),
        last_name: "Admin".to_string(),
        function_title: "System Administrator".to_string(),
        role: UserRole::Admin,
        manager_id: None,
        avatar_url: None,
        password: Some("admin".to_string()),
        location: None,
    }
}

/// Build the export payload: `(file name, pretty JSON)`. The file name
/// carries an ISO date suffix, e.g. `doing_backup_2026-08-06.json`.
pub fn export_state(state: &AppState) -> Result<(String, String), StorageError> {
    let name = format!("doing_backup_{}.json", Utc::now().format("%Y-%m-%d"));
    Ok((name, serde_json::to_string_pretty(state)?))
}

/// Parse an imported document. Malformed JSON is an error; a well-formed
/// document missing the `users` or `teams` top-level keys is silently
/// ignored (`Ok(None)`).
pub fn import_state(raw: &str) -> Result<Option<AppState>, StorageError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.get("users").is_none() || value.get("teams").is_none() {
        log::warn!("import rejected: missing users/teams keys");
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}
