//! Global hotkeys: the native hook contract, the engine that matches native
//! events against registered combos, executors, and the `global-hotkey`
//! backend.

mod engine;
mod executor;
mod global_hotkey_hook;
mod hook;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;

pub use engine::{ActionTrigger, ComboBinding, GlobalHotkeyEngine};
pub use executor::{ChannelExecutor, Executor, Task, ThreadExecutor};
pub use global_hotkey_hook::GlobalHotKeyHook;
pub use hook::{KeyEventKind, NativeHook, NativeKeyEvent, NativeKeyListener};
