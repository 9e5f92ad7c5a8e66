//! Configuration module - dispatch settings and declarative actions
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.action-hotkeys/config.json
//! - Default values for all settings
//! - Platform detection for global dispatch
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, ActionConfig, DispatchSettings)
//! - `loader` - File system loading and saving

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_APP_DIR, DEFAULT_BINDINGS_FILE, DEFAULT_GLOBAL_DISPATCH_ENABLED};

pub use types::{ActionConfig, Config, DispatchSettings};

pub use loader::{
    app_dir, default_config_path, global_dispatch_supported, load_config, save_config,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
