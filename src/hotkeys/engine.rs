//! Global hotkey engine.
//!
//! Owns the native hook lifecycle and the live table of key combos. Native
//! events arrive on the hook's thread; matching and the press/release state
//! machine run there, and matched actions are handed to the executor.
//!
//! The combo table is an immutable snapshot behind an [`ArcSwap`]. The hook
//! thread loads it without locking while registration publishes a new
//! snapshot, so a mutation is seen by the next event. Bulk changes go
//! through `register_all`/`unregister_all` so the native grabs are updated
//! once per change, not once per combo.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::executor::Executor;
use super::hook::{KeyEventKind, NativeHook, NativeKeyEvent, NativeKeyListener};
use crate::error::ResultExt;
use crate::shortcuts::{normalize_raw_code, KeyCombination, ModifierMask};

/// What the engine runs when a combo fires. Called on the executor's thread.
pub type ActionTrigger = Arc<dyn Fn() + Send + Sync>;

/// One globally bound action: its combination plus press state.
struct KeyCombo {
    name: String,
    combination: KeyCombination,
    continuous: bool,
    pressed: AtomicBool,
    trigger: ActionTrigger,
}

type ComboTable = Vec<Arc<KeyCombo>>;

/// A combo to register, as handed to [`GlobalHotkeyEngine::register_all`].
pub struct ComboBinding {
    pub name: String,
    pub combination: KeyCombination,
    pub continuous: bool,
    pub trigger: ActionTrigger,
}

/// Receives native events on the hook thread.
struct EngineListener {
    combos: Arc<ArcSwap<ComboTable>>,
    executor: Arc<dyn Executor>,
    hook: Weak<dyn NativeHook>,
}

impl EngineListener {
    fn key_pressed(&self, event: &NativeKeyEvent<'_>) {
        let raw_code = normalize_raw_code(event.raw_code);
        let modifiers = ModifierMask::from_raw(event.raw_modifiers).stripped();

        let table = self.combos.load();
        let mut matched = false;

        // Every matching combo fires, not just the first.
        for combo in table.iter() {
            if !combo
                .combination
                .matches_normalized(raw_code, modifiers, event.key_name)
            {
                continue;
            }
            matched = true;

            let was_released = !combo.pressed.swap(true, Ordering::AcqRel);
            if combo.continuous || was_released {
                debug!(
                    category = "HOTKEY",
                    action = %combo.name,
                    combo = %combo.combination,
                    "Global hotkey fired"
                );
                let trigger = combo.trigger.clone();
                self.executor.submit(Box::new(move || trigger()));
            }
        }

        if matched {
            if let Some(hook) = self.hook.upgrade() {
                hook.consume(event).warn_on_err();
            }
        }
    }

    // The native stream does not reliably pair key-ups with their key-downs
    // across modifier chords, so any release re-arms every combo.
    fn key_released(&self) {
        for combo in self.combos.load().iter() {
            combo.pressed.store(false, Ordering::Release);
        }
    }
}

impl NativeKeyListener for EngineListener {
    fn on_key_event(&self, event: &NativeKeyEvent<'_>) {
        match event.kind {
            KeyEventKind::Pressed => self.key_pressed(event),
            KeyEventKind::Released => self.key_released(),
        }
    }
}

/// Process-wide global hotkey dispatcher.
pub struct GlobalHotkeyEngine {
    hook: Arc<dyn NativeHook>,
    executor: Arc<dyn Executor>,
    combos: Arc<ArcSwap<ComboTable>>,
    /// Installed listener. The lock also serializes start/stop.
    listener: Mutex<Option<Arc<dyn NativeKeyListener>>>,
    running: AtomicBool,
}

impl GlobalHotkeyEngine {
    pub fn new(hook: Arc<dyn NativeHook>, executor: Arc<dyn Executor>) -> Self {
        Self {
            hook,
            executor,
            combos: Arc::new(ArcSwap::from_pointee(Vec::new())),
            listener: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Install the native hook and start listening.
    ///
    /// Idempotent. If the platform refuses the hook the failure is logged and
    /// the engine stays stopped; returns whether the engine is running.
    pub fn start(&self) -> bool {
        let mut slot = self.listener.lock();
        if self.running.load(Ordering::Acquire) {
            return true;
        }

        if let Err(e) = self.hook.register_hook() {
            warn!(
                category = "HOTKEY",
                error = %e,
                "Global hotkeys unavailable, continuing with local shortcuts only"
            );
            return false;
        }

        let listener: Arc<dyn NativeKeyListener> = Arc::new(EngineListener {
            combos: self.combos.clone(),
            executor: self.executor.clone(),
            hook: Arc::downgrade(&self.hook),
        });
        self.hook.add_listener(listener.clone());
        *slot = Some(listener);
        self.running.store(true, Ordering::Release);
        self.sync_grabs();

        info!(
            category = "HOTKEY",
            combos = self.combos.load().len(),
            "Global hotkey engine started"
        );
        true
    }

    /// Remove the listener and the native hook. Idempotent.
    ///
    /// Local state is cleared even if the hook refuses to unregister, so a
    /// later `start` is always possible.
    pub fn stop(&self) {
        let mut slot = self.listener.lock();
        if !self.running.load(Ordering::Acquire) {
            return;
        }

        if let Some(listener) = slot.take() {
            self.hook.remove_listener(&listener);
        }
        if let Err(e) = self.hook.unregister_hook() {
            warn!(category = "HOTKEY", error = %e, "Failed to unregister native hook");
        }
        self.running.store(false, Ordering::Release);
        self.release_all();

        info!(category = "HOTKEY", "Global hotkey engine stopped");
    }

    /// Stop and forget every combo.
    pub fn shutdown(&self) {
        self.stop();
        self.combos.store(Arc::new(Vec::new()));
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Bind `combination` to `trigger` under `name`, replacing any combo
    /// already registered under that name. Safe while running.
    pub fn register(
        &self,
        name: &str,
        combination: KeyCombination,
        continuous: bool,
        trigger: ActionTrigger,
    ) {
        self.register_all(vec![ComboBinding {
            name: name.to_string(),
            combination,
            continuous,
            trigger,
        }]);
    }

    /// Register several bindings with one table publish and one grab update.
    /// Later bindings replace earlier ones with the same name.
    pub fn register_all(&self, bindings: Vec<ComboBinding>) {
        if bindings.is_empty() {
            return;
        }
        let incoming: ComboTable = bindings
            .into_iter()
            .map(|b| {
                debug!(
                    category = "HOTKEY",
                    action = %b.name,
                    combo = %b.combination,
                    continuous = b.continuous,
                    "Registered global combo"
                );
                Arc::new(KeyCombo {
                    name: b.name,
                    combination: b.combination,
                    continuous: b.continuous,
                    pressed: AtomicBool::new(false),
                    trigger: b.trigger,
                })
            })
            .collect();

        self.combos.rcu(|table| {
            let mut next: ComboTable = Vec::with_capacity(table.len() + incoming.len());
            next.extend(table.iter().cloned());
            for combo in &incoming {
                match next.iter_mut().find(|c| c.name == combo.name) {
                    Some(slot) => *slot = combo.clone(),
                    None => next.push(combo.clone()),
                }
            }
            next
        });
        self.sync_if_running();
    }

    /// Remove the combo registered under `name`. Returns whether one existed.
    pub fn unregister(&self, name: &str) -> bool {
        let previous = self.combos.rcu(|table| {
            table
                .iter()
                .filter(|c| c.name != name)
                .cloned()
                .collect::<ComboTable>()
        });
        let removed = previous.iter().any(|c| c.name == name);
        if removed {
            debug!(category = "HOTKEY", action = name, "Unregistered global combo");
            self.sync_if_running();
        }
        removed
    }

    /// Remove every combo in one step. Returns how many were registered.
    ///
    /// The hook sees a single grab update, not one per combo.
    pub fn unregister_all(&self) -> usize {
        let previous = self.combos.swap(Arc::new(Vec::new()));
        if !previous.is_empty() {
            debug!(
                category = "HOTKEY",
                combos = previous.len(),
                "Unregistered all global combos"
            );
            self.sync_if_running();
        }
        previous.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.combos.load().iter().any(|c| c.name == name)
    }

    /// Names of registered combos, in registration order.
    pub fn registered(&self) -> Vec<String> {
        self.combos.load().iter().map(|c| c.name.clone()).collect()
    }

    pub fn combination(&self, name: &str) -> Option<KeyCombination> {
        self.combos
            .load()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.combination)
    }

    /// Whether the combo for `name` is currently held down.
    pub fn is_pressed(&self, name: &str) -> Option<bool> {
        self.combos
            .load()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.pressed.load(Ordering::Acquire))
    }

    pub fn len(&self) -> usize {
        self.combos.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.load().is_empty()
    }

    fn release_all(&self) {
        for combo in self.combos.load().iter() {
            combo.pressed.store(false, Ordering::Release);
        }
    }

    fn sync_if_running(&self) {
        if self.is_running() {
            self.sync_grabs();
        }
    }

    fn sync_grabs(&self) {
        let combinations: Vec<KeyCombination> =
            self.combos.load().iter().map(|c| c.combination).collect();
        self.hook.sync_grabs(&combinations);
    }
}

impl Drop for GlobalHotkeyEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
