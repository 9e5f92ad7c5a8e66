use thiserror::Error;
use tracing::{error, warn};

use crate::shortcuts::KeySpecError;

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,  // recoverable
    Error,    // operation failed
    Critical, // lifecycle bug in the caller
}

/// Caller-facing errors raised by the action subsystem.
///
/// These indicate a fixable misuse (unknown name, bad key spec, lifecycle
/// bug) and are always returned to the caller. Hook-side failures use
/// [`HookError`] instead and never leave the hook subsystem.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("no action named '{0}' is registered")]
    NotFound(String),

    #[error("action '{action}' has an invalid key spec '{spec}': {source}")]
    InvalidKeySpec {
        action: String,
        spec: String,
        #[source]
        source: KeySpecError,
    },

    #[error("action listening is already running")]
    AlreadyRunning,

    #[error("action name must not be empty")]
    EmptyName,

    #[error("action '{action}' panicked: {message}")]
    BehaviorPanicked { action: String, message: String },
}

impl ActionError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) => ErrorSeverity::Error,
            Self::InvalidKeySpec { .. } => ErrorSeverity::Warning,
            Self::AlreadyRunning => ErrorSeverity::Critical,
            Self::EmptyName => ErrorSeverity::Error,
            Self::BehaviorPanicked { .. } => ErrorSeverity::Error,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(name) => format!("Unknown action: {}", name),
            Self::InvalidKeySpec { action, spec, .. } => {
                format!("Shortcut '{}' for '{}' is not valid", spec, action)
            }
            Self::AlreadyRunning => "Shortcut listening is already active".to_string(),
            Self::EmptyName => "Actions need a name".to_string(),
            Self::BehaviorPanicked { action, .. } => format!("Action '{}' failed", action),
        }
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;

/// Failures reported by a native hook backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("native hook registration failed: {0}")]
    HookRegistrationFailed(String),

    #[error("native hook unregistration failed: {0}")]
    HookUnregistrationFailed(String),

    #[error("could not consume native key event: {0}")]
    ConsumeFailed(String),
}

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use action_hotkeys::error::ResultExt;
///
/// hook.consume(&event).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_running_is_critical() {
        assert_eq!(
            ActionError::AlreadyRunning.severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn invalid_key_spec_keeps_source() {
        let err = ActionError::InvalidKeySpec {
            action: "zoom".into(),
            spec: "CTRL+NOPE".into(),
            source: KeySpecError::UnknownKey("NOPE".into()),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("CTRL+NOPE"));
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn results_are_logged_not_propagated() {
        let ok: std::result::Result<u8, HookError> = Ok(3);
        assert_eq!(ok.warn_on_err(), Some(3));

        let failed: std::result::Result<u8, HookError> =
            Err(HookError::ConsumeFailed("no handle".into()));
        assert_eq!(failed.log_err(), None);
    }
}
