//! User binding persistence.
//!
//! Handles loading and saving user binding overrides to/from disk.
//! Format: HashMap<action_name, String> where each value is an
//! [`ActionRecord`] string such as `"true,CTRL+ALT+W"`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::ActionRecord;
use super::registry::ActionRegistry;
use crate::config::{app_dir, DEFAULT_BINDINGS_FILE};

/// User binding overrides.
///
/// Stored in ~/.action-hotkeys/bindings.json
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingOverrides {
    /// Map of action name -> persisted record
    #[serde(default)]
    pub bindings: HashMap<String, String>,
}

/// Error that can occur when loading, saving or applying overrides.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid binding record '{record}' for action '{action}'")]
    InvalidRecord { action: String, record: String },

    #[error("No action named '{0}' to apply a binding to")]
    UnknownAction(String),
}

impl BindingOverrides {
    /// Load overrides from a JSON file.
    ///
    /// Returns empty overrides if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let overrides: Self = serde_json::from_str(&content)?;
        Ok(overrides)
    }

    /// Save overrides to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Capture the current binding of every registered action.
    pub fn from_registry(registry: &ActionRegistry) -> Self {
        let bindings = registry
            .all()
            .iter()
            .map(|action| (action.name().to_string(), action.record().to_string()))
            .collect();
        Self { bindings }
    }

    /// Rewrite the global flag and key spec of registered actions.
    ///
    /// Returns the records that could not be applied; valid ones are still
    /// applied.
    pub fn apply_to_registry(&self, registry: &mut ActionRegistry) -> Vec<PersistenceError> {
        let mut errors = Vec::new();

        let mut names: Vec<&String> = self.bindings.keys().collect();
        names.sort();

        for name in names {
            let raw = &self.bindings[name];
            let Some(record) = ActionRecord::parse(raw) else {
                errors.push(PersistenceError::InvalidRecord {
                    action: name.clone(),
                    record: raw.clone(),
                });
                continue;
            };

            let Some(current) = registry.try_get(name) else {
                errors.push(PersistenceError::UnknownAction(name.clone()));
                continue;
            };

            let updated = (*current).clone().with_record(&record);
            if let Err(e) = registry.register(updated) {
                tracing::warn!(action = %name, error = %e, "Failed to apply binding override");
            }
        }

        errors
    }

    pub fn set(&mut self, name: impl Into<String>, record: &ActionRecord) {
        self.bindings.insert(name.into(), record.to_string());
    }

    /// Remove an override (revert to the action's default binding).
    pub fn remove(&mut self, name: &str) {
        self.bindings.remove(name);
    }

    /// The parsed record for an action, if present and well-formed.
    pub fn get(&self, name: &str) -> Option<ActionRecord> {
        self.bindings.get(name).and_then(|r| ActionRecord::parse(r))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Get the default path for binding overrides.
pub fn default_bindings_path() -> PathBuf {
    app_dir().join(DEFAULT_BINDINGS_FILE)
}
