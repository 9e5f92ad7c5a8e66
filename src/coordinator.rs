//! Dispatch coordinator.
//!
//! Owns the action registry and decides, per action, which dispatch path it
//! is wired to:
//!
//! - the global engine, when the action is global and global dispatch is
//!   supported, enabled and actually running
//! - the local dispatcher otherwise
//!
//! An action is wired to exactly one path at a time. Whenever the global
//! toggle changes every action is unwired from both paths and wired again,
//! so nothing keeps firing through a path it should no longer use.
//!
//! Every invocation, from either path or from [`DispatchCoordinator::invoke`],
//! goes through the same pre/post observers.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::actions::{ActionDefinition, ActionRegistry, BindingOverrides, PersistenceError};
use crate::config::DispatchSettings;
use crate::error::{ActionError, Result};
use crate::hotkeys::{ComboBinding, Executor, GlobalHotkeyEngine, NativeHook};
use crate::local::{LocalDispatcher, Scene, SceneId};
use crate::shortcuts::KeyCombination;

/// Observer called around every action run.
pub type RunObserver = Arc<dyn Fn(&ActionDefinition) + Send + Sync>;

#[derive(Default)]
struct RunHooks {
    pre: RwLock<Vec<RunObserver>>,
    post: RwLock<Vec<RunObserver>>,
}

impl RunHooks {
    /// Run `action` between the observers. Post observers run even if the
    /// behavior panics; the panic becomes [`ActionError::BehaviorPanicked`].
    fn run(&self, action: &ActionDefinition) -> Result<()> {
        // Snapshot so observers may register more observers.
        let pre = self.pre.read().clone();
        for observer in &pre {
            observer(action);
        }

        let behavior = action.behavior().clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| behavior()));

        let post = self.post.read().clone();
        for observer in &post {
            observer(action);
        }

        outcome.map_err(|payload| {
            let message = panic_message(payload.as_ref());
            error!(action = %action.name(), message = %message, "Action behavior panicked");
            ActionError::BehaviorPanicked {
                action: action.name().to_string(),
                message,
            }
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Top-level entry point for registering and dispatching actions.
pub struct DispatchCoordinator {
    registry: RwLock<ActionRegistry>,
    local: Mutex<LocalDispatcher>,
    engine: GlobalHotkeyEngine,
    supported: bool,
    enabled: AtomicBool,
    listening: AtomicBool,
    /// Serializes listening and toggle transitions with wiring.
    lifecycle: Mutex<()>,
    hooks: Arc<RunHooks>,
}

impl DispatchCoordinator {
    pub fn new(
        hook: Arc<dyn NativeHook>,
        executor: Arc<dyn Executor>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            registry: RwLock::new(ActionRegistry::new()),
            local: Mutex::new(LocalDispatcher::new()),
            engine: GlobalHotkeyEngine::new(hook, executor),
            supported: settings.supported,
            enabled: AtomicBool::new(settings.global_active()),
            listening: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
            hooks: Arc::new(RunHooks::default()),
        }
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Start dispatching. Fails with [`ActionError::AlreadyRunning`] if
    /// already listening.
    ///
    /// Actions whose key spec does not parse are logged and left unwired.
    pub fn start_action_listening(&self) -> Result<()> {
        let _guard = self.lifecycle.lock();
        if self.listening.swap(true, Ordering::AcqRel) {
            return Err(ActionError::AlreadyRunning);
        }

        if self.wants_global() {
            self.engine.start();
        }
        self.wire_all();

        info!(
            actions = self.registry.read().len(),
            global = self.engine.is_running(),
            "Action listening started"
        );
        Ok(())
    }

    /// Stop dispatching on both paths. Idempotent.
    pub fn stop_action_listening(&self) {
        let _guard = self.lifecycle.lock();
        if !self.listening.swap(false, Ordering::AcqRel) {
            return;
        }

        self.unwire_all();
        self.engine.shutdown();
        info!("Action listening stopped");
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Flip the user toggle and move every action to the path it now
    /// belongs on.
    ///
    /// The engine is started only if the toggle is on and the coordinator
    /// is listening; otherwise it is stopped. On a platform without global
    /// dispatch the toggle is read-only and stays off.
    pub fn set_global_dispatch_enabled(&self, enabled: bool) {
        let _guard = self.lifecycle.lock();
        if !self.supported {
            if enabled {
                warn!("Global dispatch is not supported on this platform, staying local");
            }
            return;
        }
        self.enabled.store(enabled, Ordering::Release);

        if !self.is_listening() {
            debug!(enabled, "Global dispatch toggle stored, not listening");
            return;
        }

        self.unwire_all();
        if self.wants_global() {
            self.engine.start();
        } else {
            self.engine.stop();
        }
        self.wire_all();

        info!(
            enabled,
            active = self.engine.is_running(),
            "Global dispatch toggled"
        );
    }

    pub fn is_global_dispatch_supported(&self) -> bool {
        self.supported
    }

    pub fn is_global_dispatch_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Whether global actions are currently reaching the global engine.
    pub fn is_global_dispatch_active(&self) -> bool {
        self.engine.is_running()
    }

    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings::new(self.supported, self.is_global_dispatch_enabled())
    }

    pub fn engine(&self) -> &GlobalHotkeyEngine {
        &self.engine
    }

    // ============================================
    // ACTIONS
    // ============================================

    /// Register (or replace) an action and, while listening, wire it.
    ///
    /// An invalid key spec is reported as [`ActionError::InvalidKeySpec`] but
    /// the action stays registered and can still be invoked directly.
    pub fn register_action(&self, action: ActionDefinition) -> Result<Arc<ActionDefinition>> {
        let _guard = self.lifecycle.lock();
        let name = action.name().to_string();
        let action = {
            let mut registry = self.registry.write();
            registry.register(action)?;
            registry.get(&name)?
        };

        if self.is_listening() {
            self.unwire(&name);
            self.wire(&action)?;
        }
        Ok(action)
    }

    pub fn unregister_action(&self, name: &str) -> Result<Arc<ActionDefinition>> {
        let _guard = self.lifecycle.lock();
        let removed = self
            .registry
            .write()
            .unregister(name)
            .ok_or_else(|| ActionError::NotFound(name.to_string()))?;
        self.unwire(name);
        Ok(removed)
    }

    pub fn get_action(&self, name: &str) -> Result<Arc<ActionDefinition>> {
        self.registry.read().get(name)
    }

    pub fn try_get_action(&self, name: &str) -> Option<Arc<ActionDefinition>> {
        self.registry.read().try_get(name)
    }

    /// Snapshot of every registered action in registration order.
    pub fn actions(&self) -> Vec<Arc<ActionDefinition>> {
        self.registry.read().all()
    }

    /// Run an action now, on the calling thread, through the observers.
    pub fn invoke(&self, name: &str) -> Result<()> {
        let action = self.get_action(name)?;
        self.hooks.run(&action)
    }

    pub fn on_action_run_pre<F>(&self, observer: F)
    where
        F: Fn(&ActionDefinition) + Send + Sync + 'static,
    {
        self.hooks.pre.write().push(Arc::new(observer));
    }

    pub fn on_action_run_post<F>(&self, observer: F)
    where
        F: Fn(&ActionDefinition) + Send + Sync + 'static,
    {
        self.hooks.post.write().push(Arc::new(observer));
    }

    /// Apply persisted binding overrides and rewire. Returns the overrides
    /// that could not be applied.
    pub fn apply_overrides(&self, overrides: &BindingOverrides) -> Vec<PersistenceError> {
        let _guard = self.lifecycle.lock();
        let errors = overrides.apply_to_registry(&mut self.registry.write());
        for e in &errors {
            warn!(error = %e, "Skipped binding override");
        }
        if self.is_listening() {
            self.unwire_all();
            self.wire_all();
        }
        errors
    }

    /// Current bindings in persistable form.
    pub fn binding_overrides(&self) -> BindingOverrides {
        BindingOverrides::from_registry(&self.registry.read())
    }

    // ============================================
    // SCENES
    // ============================================

    pub fn add_scene(&self, scene: Arc<dyn Scene>) {
        self.local.lock().add_scene(scene);
    }

    pub fn remove_scene(&self, id: SceneId) -> bool {
        self.local.lock().remove_scene(id).is_some()
    }

    pub fn scene_count(&self) -> usize {
        self.local.lock().scene_count()
    }

    /// Whether `name` is currently wired to the local dispatcher.
    pub fn is_locally_bound(&self, name: &str) -> bool {
        self.local.lock().is_bound(name)
    }

    // ============================================
    // WIRING
    // ============================================

    fn wants_global(&self) -> bool {
        self.supported && self.is_global_dispatch_enabled() && self.is_listening()
    }

    fn wire_all(&self) {
        let actions = self.registry.read().all();
        let mut global = Vec::new();
        for action in actions {
            match self.binding_for(&action) {
                Ok(Some(binding)) if self.routes_globally(&action) => global.push(binding),
                Ok(Some(binding)) => self.bind_locally(binding),
                Ok(None) => {}
                Err(e) => warn!(action = %action.name(), error = %e, "Action left unwired"),
            }
        }
        if !global.is_empty() {
            debug!(combos = global.len(), "Wired to global engine");
            self.engine.register_all(global);
        }
    }

    fn unwire_all(&self) {
        self.local.lock().unbind_all();
        self.engine.unregister_all();
    }

    fn unwire(&self, name: &str) {
        self.engine.unregister(name);
        self.local.lock().unbind(name);
    }

    fn wire(&self, action: &Arc<ActionDefinition>) -> Result<()> {
        let Some(binding) = self.binding_for(action)? else {
            return Ok(());
        };
        if self.routes_globally(action) {
            debug!(action = %action.name(), combo = %binding.combination, "Wired to global engine");
            self.engine.register_all(vec![binding]);
        } else {
            self.bind_locally(binding);
        }
        Ok(())
    }

    fn routes_globally(&self, action: &ActionDefinition) -> bool {
        action.is_global() && self.engine.is_running()
    }

    fn bind_locally(&self, binding: ComboBinding) {
        debug!(action = %binding.name, combo = %binding.combination, "Wired to local scenes");
        self.local
            .lock()
            .bind(&binding.name, binding.combination, binding.trigger);
    }

    /// Parse the action's key spec. `None` when the action has no key.
    fn binding_for(&self, action: &Arc<ActionDefinition>) -> Result<Option<ComboBinding>> {
        if !action.has_key() {
            return Ok(None);
        }
        let combination = KeyCombination::parse(action.key_spec()).map_err(|source| {
            ActionError::InvalidKeySpec {
                action: action.name().to_string(),
                spec: action.key_spec().to_string(),
                source,
            }
        })?;
        Ok(Some(ComboBinding {
            name: action.name().to_string(),
            combination,
            continuous: action.is_continuous(),
            trigger: self.trigger_for(action),
        }))
    }

    fn trigger_for(&self, action: &Arc<ActionDefinition>) -> Arc<dyn Fn() + Send + Sync> {
        let hooks = self.hooks.clone();
        let action = action.clone();
        Arc::new(move || {
            // Panics are already logged inside `run`.
            let _ = hooks.run(&action);
        })
    }
}

impl Drop for DispatchCoordinator {
    fn drop(&mut self) {
        self.stop_action_listening();
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
