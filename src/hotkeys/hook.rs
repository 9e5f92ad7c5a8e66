//! Native hook capability contract.
//!
//! A native hook delivers raw keyboard events from outside the
//! application's input focus, on a thread it owns. Backends implement
//! [`NativeHook`]; the engine implements [`NativeKeyListener`].

use std::sync::Arc;

use crate::error::HookError;
use crate::shortcuts::KeyCombination;

/// Direction of a native key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

/// One raw keyboard event as delivered by a native hook.
///
/// Borrowed so the hook thread does not allocate per event.
#[derive(Clone, Copy, Debug)]
pub struct NativeKeyEvent<'a> {
    pub kind: KeyEventKind,
    pub raw_code: u32,
    pub raw_modifiers: u32,
    pub key_name: &'a str,
}

impl<'a> NativeKeyEvent<'a> {
    pub fn pressed(raw_code: u32, raw_modifiers: u32, key_name: &'a str) -> Self {
        Self {
            kind: KeyEventKind::Pressed,
            raw_code,
            raw_modifiers,
            key_name,
        }
    }

    pub fn released(raw_code: u32, raw_modifiers: u32, key_name: &'a str) -> Self {
        Self {
            kind: KeyEventKind::Released,
            raw_code,
            raw_modifiers,
            key_name,
        }
    }
}

/// Receives native key events on the hook's own thread.
///
/// Implementations must return quickly: the OS may stall input, or drop
/// the hook, if the callback blocks.
pub trait NativeKeyListener: Send + Sync {
    fn on_key_event(&self, event: &NativeKeyEvent<'_>);
}

/// An OS-level keyboard hook.
pub trait NativeHook: Send + Sync {
    /// Install the process-wide hook.
    fn register_hook(&self) -> Result<(), HookError>;

    /// Remove the process-wide hook.
    fn unregister_hook(&self) -> Result<(), HookError>;

    fn add_listener(&self, listener: Arc<dyn NativeKeyListener>);

    fn remove_listener(&self, listener: &Arc<dyn NativeKeyListener>);

    /// Best-effort: stop `event` from reaching the OS or the foreground app.
    /// Only meaningful while the event is being delivered.
    fn consume(&self, event: &NativeKeyEvent<'_>) -> Result<(), HookError>;

    /// Told about every combination the engine currently listens for.
    ///
    /// Backends that observe all keys ignore this. Backends that can only
    /// grab specific combinations use it to decide what to grab.
    fn sync_grabs(&self, _combinations: &[KeyCombination]) {}
}
