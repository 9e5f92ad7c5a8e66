//! Action Hotkeys - named actions bound to keyboard shortcuts
//!
//! Actions are dispatched through one of two paths:
//! - **local**: scene-scoped accelerators, active only while a window has focus
//! - **global**: a process-wide native keyboard hook, active regardless of focus
//!
//! [`coordinator::DispatchCoordinator`] owns the action registry and keeps
//! each action wired to the right path.

pub mod actions;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod hotkeys;
pub mod local;
pub mod logging;
pub mod shortcuts;

pub use actions::{ActionDefinition, ActionRecord, ActionRegistry};
pub use coordinator::DispatchCoordinator;
pub use error::{ActionError, HookError, Result};
pub use shortcuts::{KeyCombination, KeySpecError};
