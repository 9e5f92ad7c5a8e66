//! `action-hotkeys` command line.
//!
//! - `check` validates key specs
//! - `record` decodes a persisted binding record
//! - `listen` runs the configured actions until killed

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use action_hotkeys::actions::{ActionRecord, BindingOverrides};
use action_hotkeys::config::{self, Config};
use action_hotkeys::coordinator::DispatchCoordinator;
use action_hotkeys::hotkeys::{ChannelExecutor, GlobalHotKeyHook};
use action_hotkeys::logging;
use action_hotkeys::shortcuts::{KeyCombination, Platform};

#[derive(Parser)]
#[command(name = "action-hotkeys")]
#[command(about = "Named actions bound to local and global keyboard shortcuts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse key specs and print their canonical form
    Check {
        /// Key specs such as "CTRL+ALT+W" or "F4"
        #[arg(required = true, value_name = "SPEC")]
        specs: Vec<String>,
    },

    /// Decode a persisted "<global>,<keySpec>" record
    Record {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Register the configured actions and dispatch until killed
    Listen {
        /// Config file (default: ~/.action-hotkeys/config.json)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Enable global dispatch regardless of the config file
        #[arg(long)]
        global: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    match Cli::parse().command {
        Commands::Check { specs } => check(&specs),
        Commands::Record { text } => record(&text),
        Commands::Listen { config, global } => listen(config, global),
    }
}

fn check(specs: &[String]) -> Result<()> {
    let platform = Platform::current();
    for spec in specs {
        let combination = KeyCombination::parse(spec)
            .with_context(|| format!("invalid key spec '{}'", spec))?;
        println!(
            "{:<24} {:<24} {:<12} raw=0x{:02X}",
            spec,
            combination.to_spec_string(),
            combination.display_for_platform(platform),
            combination.key().raw_code()
        );
    }
    Ok(())
}

fn record(text: &str) -> Result<()> {
    let Some(record) = ActionRecord::parse(text) else {
        bail!("'{}' is not a binding record (expected \"<global>,<keySpec>\")", text);
    };
    println!("global:   {}", record.global);
    println!("key spec: {}", record.key_spec);
    if !record.key_spec.is_empty() {
        let combination = KeyCombination::parse(&record.key_spec)
            .with_context(|| format!("record names an invalid key spec '{}'", record.key_spec))?;
        println!("display:  {}", combination.display());
    }
    Ok(())
}

fn listen(config_path: Option<PathBuf>, force_global: bool) -> Result<()> {
    let _guard = logging::init();

    let config_path = config_path.unwrap_or_else(config::default_config_path);
    let mut config: Config = config::load_config(&config_path);
    if force_global {
        config.global_dispatch_enabled = true;
    }

    let executor = Arc::new(ChannelExecutor::new());
    let coordinator = DispatchCoordinator::new(
        Arc::new(GlobalHotKeyHook::new()),
        executor.clone(),
        config.dispatch_settings(),
    );

    for action in &config.actions {
        let name = action.name.clone();
        let key_spec = action.key_spec.clone();
        let global = action.global;
        let definition = action.to_definition(Arc::new(move || {
            logging::log_action_fired(&name, &key_spec, global);
        }));
        if let Err(e) = coordinator.register_action(definition) {
            warn!(action = %action.name, error = %e, "Skipping configured action");
        }
    }

    let bindings_path = config.get_bindings_path();
    match BindingOverrides::load(&bindings_path) {
        Ok(overrides) if !overrides.is_empty() => {
            coordinator.apply_overrides(&overrides);
        }
        Ok(_) => {}
        Err(e) => warn!(path = %bindings_path.display(), error = %e, "Ignoring binding overrides"),
    }

    coordinator.start_action_listening()?;
    info!(
        actions = coordinator.actions().len(),
        global = coordinator.is_global_dispatch_active(),
        "Listening, press Ctrl+C to exit"
    );

    // Triggers are drained on the main thread until the process is killed.
    executor.run_blocking();
    Ok(())
}
