//! In-process hook for exercising the engine and coordinator without an OS
//! keyboard hook.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::hook::{NativeHook, NativeKeyEvent, NativeKeyListener};
use crate::error::HookError;
use crate::shortcuts::KeyCombination;

/// Records every call and replays synthetic key events to its listeners.
#[derive(Default)]
pub(crate) struct FakeHook {
    installed: AtomicBool,
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
    consumed: AtomicUsize,
    grab_syncs: AtomicUsize,
    fail_register: AtomicBool,
    fail_unregister: AtomicBool,
    fail_consume: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn NativeKeyListener>>>,
    grabs: Mutex<Vec<KeyCombination>>,
}

impl FakeHook {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_unregister(&self, fail: bool) {
        self.fail_unregister.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_consume(&self, fail: bool) {
        self.fail_consume.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub(crate) fn uninstalls(&self) -> usize {
        self.uninstalls.load(Ordering::SeqCst)
    }

    pub(crate) fn consumed(&self) -> usize {
        self.consumed.load(Ordering::SeqCst)
    }

    pub(crate) fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub(crate) fn grab_syncs(&self) -> usize {
        self.grab_syncs.load(Ordering::SeqCst)
    }

    pub(crate) fn grabs(&self) -> Vec<KeyCombination> {
        self.grabs.lock().clone()
    }

    /// Deliver a key-down, as the OS would, if the hook is installed.
    pub(crate) fn press(&self, raw_code: u32, raw_modifiers: u32, key_name: &str) {
        self.emit(&NativeKeyEvent::pressed(raw_code, raw_modifiers, key_name));
    }

    pub(crate) fn release(&self, raw_code: u32, raw_modifiers: u32, key_name: &str) {
        self.emit(&NativeKeyEvent::released(raw_code, raw_modifiers, key_name));
    }

    fn emit(&self, event: &NativeKeyEvent<'_>) {
        if !self.is_installed() {
            return;
        }
        // Clone so listeners may call back into the hook.
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_key_event(event);
        }
    }
}

impl NativeHook for FakeHook {
    fn register_hook(&self) -> Result<(), HookError> {
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(HookError::HookRegistrationFailed(
                "fake hook refused".to_string(),
            ));
        }
        self.installs.fetch_add(1, Ordering::SeqCst);
        self.installed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unregister_hook(&self) -> Result<(), HookError> {
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unregister.load(Ordering::SeqCst) {
            return Err(HookError::HookUnregistrationFailed(
                "fake hook refused".to_string(),
            ));
        }
        self.installed.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn add_listener(&self, listener: Arc<dyn NativeKeyListener>) {
        self.listeners.lock().push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn NativeKeyListener>) {
        let target = Arc::as_ptr(listener) as *const ();
        self.listeners
            .lock()
            .retain(|l| Arc::as_ptr(l) as *const () != target);
    }

    fn consume(&self, _event: &NativeKeyEvent<'_>) -> Result<(), HookError> {
        if self.fail_consume.load(Ordering::SeqCst) {
            return Err(HookError::ConsumeFailed("fake hook refused".to_string()));
        }
        self.consumed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn sync_grabs(&self, combinations: &[KeyCombination]) {
        self.grab_syncs.fetch_add(1, Ordering::SeqCst);
        *self.grabs.lock() = combinations.to_vec();
    }
}
