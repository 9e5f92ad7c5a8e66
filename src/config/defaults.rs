//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Global dispatch is opt-in
pub const DEFAULT_GLOBAL_DISPATCH_ENABLED: bool = false;

/// Directory under the home directory holding config, bindings and logs
pub const DEFAULT_APP_DIR: &str = ".action-hotkeys";

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BINDINGS_FILE: &str = "bindings.json";

/// Declarative actions fire once per press unless marked continuous
pub const DEFAULT_ACTION_CONTINUOUS: bool = false;

pub const DEFAULT_ACTION_GLOBAL: bool = false;
