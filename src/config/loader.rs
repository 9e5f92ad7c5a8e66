//! Configuration loading from file system
//!
//! Handles loading and saving the JSON config file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::defaults::{DEFAULT_APP_DIR, DEFAULT_CONFIG_FILE};
use super::types::Config;

/// ~/.action-hotkeys, or a directory under the temp dir when there is no home
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_APP_DIR)
}

/// ~/.action-hotkeys/config.json
pub fn default_config_path() -> PathBuf {
    app_dir().join(DEFAULT_CONFIG_FILE)
}

/// Load configuration from `path`.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!(actions = config.actions.len(), "Successfully loaded config");
            config
        }
        Err(e) => {
            let hint = if e.to_string().contains("missing field `name`") {
                "\n\nHint: every entry in 'actions' needs a 'name'. Example:\n\
                 { \"actions\": [{ \"name\": \"screenshot\", \"keySpec\": \"CTRL+ALT+W\" }] }"
            } else {
                ""
            };
            warn!(error = %e, hint = %hint, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}

/// Write `config` to `path` as pretty JSON, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Whether this platform has a native global hotkey facility.
pub fn global_dispatch_supported() -> bool {
    cfg!(any(target_os = "windows", target_os = "macos", target_os = "linux"))
}
