//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use super::loader::global_dispatch_supported;
use crate::actions::{default_bindings_path, ActionBehavior, ActionDefinition};

// ============================================
// ACTION CONFIG
// ============================================

/// A declarative action. The behavior is supplied by the host when the
/// action is turned into an [`ActionDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Key spec such as "CTRL+ALT+W"; empty means no shortcut
    #[serde(default)]
    pub key_spec: String,
    /// Fire even when the application is not focused (default: false)
    #[serde(default = "default_action_global")]
    pub global: bool,
    /// Fire on every auto-repeat instead of once per press (default: false)
    #[serde(default = "default_action_continuous")]
    pub continuous: bool,
}

fn default_action_global() -> bool {
    DEFAULT_ACTION_GLOBAL
}
fn default_action_continuous() -> bool {
    DEFAULT_ACTION_CONTINUOUS
}

impl ActionConfig {
    pub fn new(name: impl Into<String>, key_spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            key_spec: key_spec.into(),
            global: DEFAULT_ACTION_GLOBAL,
            continuous: DEFAULT_ACTION_CONTINUOUS,
        }
    }

    /// Build the registrable action, attaching `behavior`.
    pub fn to_definition(&self, behavior: ActionBehavior) -> ActionDefinition {
        ActionDefinition::new(self.name.clone(), move || behavior())
            .with_description(self.description.clone())
            .with_key_spec(self.key_spec.clone())
            .global(self.global)
            .continuous(self.continuous)
    }
}

// ============================================
// DISPATCH SETTINGS
// ============================================

/// The two flags the coordinator consumes.
///
/// `supported` is platform capability and never changes at runtime.
/// `enabled` is the user toggle and means nothing when unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub supported: bool,
    pub enabled: bool,
}

impl DispatchSettings {
    pub fn new(supported: bool, enabled: bool) -> Self {
        Self { supported, enabled }
    }

    /// Settings for the running platform.
    pub fn detect(enabled: bool) -> Self {
        Self::new(global_dispatch_supported(), enabled)
    }

    /// Whether global dispatch should actually be used.
    pub fn global_active(&self) -> bool {
        self.supported && self.enabled
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::detect(DEFAULT_GLOBAL_DISPATCH_ENABLED)
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// User toggle for global (unfocused) dispatch (default: false)
    #[serde(default = "default_global_dispatch_enabled")]
    pub global_dispatch_enabled: bool,
    /// Where binding overrides are stored (default: ~/.action-hotkeys/bindings.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings_path: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

fn default_global_dispatch_enabled() -> bool {
    DEFAULT_GLOBAL_DISPATCH_ENABLED
}

impl Default for Config {
    fn default() -> Self {
        Config {
            global_dispatch_enabled: DEFAULT_GLOBAL_DISPATCH_ENABLED,
            bindings_path: None,
            actions: Vec::new(),
        }
    }
}

impl Config {
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings::detect(self.global_dispatch_enabled)
    }

    /// Returns the bindings path, expanding a leading `~`
    pub fn get_bindings_path(&self) -> PathBuf {
        match &self.bindings_path {
            Some(path) => PathBuf::from(shellexpand::tilde(path).as_ref()),
            None => default_bindings_path(),
        }
    }
}
