//! Local (scene-scoped) dispatch.
//!
//! A scene is one window's keyboard-accelerator table. Its accelerators are
//! only active while the window is visible and focused, and they fire on the
//! UI thread through the UI framework's own event dispatch.
//!
//! [`LocalDispatcher`] keeps every bound action installed in every live
//! scene: scenes that appear get the current bindings, scenes that go away
//! have theirs removed, and rebinding an action replaces it everywhere.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use action_hotkeys::local::{AcceleratorScene, LocalDispatcher};
//! use action_hotkeys::shortcuts::KeyCombination;
//!
//! let mut dispatcher = LocalDispatcher::new();
//! let scene = AcceleratorScene::new();
//! dispatcher.add_scene(scene.clone());
//!
//! let combo = KeyCombination::parse("F4").unwrap();
//! dispatcher.bind("refresh", combo, Arc::new(|| println!("refresh")));
//!
//! scene.set_focused(true);
//! assert!(scene.handle_key(0x73, 0, "F4"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::shortcuts::{normalize_raw_code, KeyCombination, ModifierMask};

/// Callback installed as a scene accelerator.
pub type AcceleratorHandler = Arc<dyn Fn() + Send + Sync>;

/// Identifies a live scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u64);

impl SceneId {
    /// A process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene-{}", self.0)
    }
}

/// A window's accelerator table, as seen by the dispatcher.
pub trait Scene: Send + Sync {
    fn id(&self) -> SceneId;

    /// Install (or replace) the accelerator for `action`.
    fn install_accelerator(
        &self,
        action: &str,
        combination: KeyCombination,
        handler: AcceleratorHandler,
    );

    /// Remove the accelerator for `action`. No-op if none is installed.
    fn remove_accelerator(&self, action: &str);
}

struct LocalBinding {
    combination: KeyCombination,
    handler: AcceleratorHandler,
}

/// Mirrors the set of bound actions into every live scene.
#[derive(Default)]
pub struct LocalDispatcher {
    scenes: BTreeMap<SceneId, Arc<dyn Scene>>,
    bindings: BTreeMap<String, LocalBinding>,
}

impl LocalDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `scene` and install every current binding into it.
    ///
    /// Adding a scene whose id is already tracked replaces the old one; the
    /// old scene's accelerators are removed first.
    pub fn add_scene(&mut self, scene: Arc<dyn Scene>) {
        let id = scene.id();
        if let Some(previous) = self.scenes.remove(&id) {
            self.clear_scene(previous.as_ref());
        }

        for (action, binding) in &self.bindings {
            scene.install_accelerator(action, binding.combination, binding.handler.clone());
        }
        debug!(
            category = "LOCAL",
            scene = %id,
            bindings = self.bindings.len(),
            "Scene added"
        );
        self.scenes.insert(id, scene);
    }

    /// Stop tracking a scene, removing every accelerator installed into it.
    pub fn remove_scene(&mut self, id: SceneId) -> Option<Arc<dyn Scene>> {
        let scene = self.scenes.remove(&id)?;
        self.clear_scene(scene.as_ref());
        debug!(category = "LOCAL", scene = %id, "Scene removed");
        Some(scene)
    }

    /// Bind `action` in every live scene, replacing any previous binding.
    pub fn bind(&mut self, action: &str, combination: KeyCombination, handler: AcceleratorHandler) {
        if self.bindings.contains_key(action) {
            self.unbind(action);
        }
        for scene in self.scenes.values() {
            scene.install_accelerator(action, combination, handler.clone());
        }
        self.bindings.insert(
            action.to_string(),
            LocalBinding {
                combination,
                handler,
            },
        );
    }

    /// Remove `action` from every live scene. Returns whether it was bound.
    pub fn unbind(&mut self, action: &str) -> bool {
        if self.bindings.remove(action).is_none() {
            return false;
        }
        for scene in self.scenes.values() {
            scene.remove_accelerator(action);
        }
        true
    }

    pub fn unbind_all(&mut self) {
        let actions: Vec<String> = self.bindings.keys().cloned().collect();
        for action in actions {
            self.unbind(&action);
        }
    }

    pub fn is_bound(&self, action: &str) -> bool {
        self.bindings.contains_key(action)
    }

    pub fn combination(&self, action: &str) -> Option<KeyCombination> {
        self.bindings.get(action).map(|b| b.combination)
    }

    pub fn bound_actions(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    pub fn scene_ids(&self) -> Vec<SceneId> {
        self.scenes.keys().copied().collect()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    fn clear_scene(&self, scene: &dyn Scene) {
        for action in self.bindings.keys() {
            scene.remove_accelerator(action);
        }
    }
}

struct Accelerator {
    action: String,
    combination: KeyCombination,
    handler: AcceleratorHandler,
}

/// Headless [`Scene`] for hosts without a UI toolkit accelerator table.
///
/// The host forwards key events it receives while the window has focus to
/// [`handle_key`](Self::handle_key).
pub struct AcceleratorScene {
    id: SceneId,
    focused: AtomicBool,
    accelerators: RwLock<Vec<Accelerator>>,
}

impl AcceleratorScene {
    pub fn new() -> Arc<Self> {
        Self::with_id(SceneId::next())
    }

    pub fn with_id(id: SceneId) -> Arc<Self> {
        Arc::new(Self {
            id,
            focused: AtomicBool::new(false),
            accelerators: RwLock::new(Vec::new()),
        })
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::Release);
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::Acquire)
    }

    /// Fire every accelerator matching the key event. Unfocused scenes
    /// ignore keys. Returns whether anything fired.
    pub fn handle_key(&self, raw_code: u32, raw_modifiers: u32, key_name: &str) -> bool {
        if !self.is_focused() {
            return false;
        }
        let raw_code = normalize_raw_code(raw_code);
        let modifiers = ModifierMask::from_raw(raw_modifiers).stripped();

        // Collect first so handlers can rebind without deadlocking.
        let handlers: Vec<AcceleratorHandler> = self
            .accelerators
            .read()
            .iter()
            .filter(|a| {
                a.combination
                    .matches_normalized(raw_code, modifiers, key_name)
            })
            .map(|a| a.handler.clone())
            .collect();

        for handler in &handlers {
            handler();
        }
        !handlers.is_empty()
    }

    pub fn accelerator_count(&self) -> usize {
        self.accelerators.read().len()
    }

    pub fn has_accelerator(&self, action: &str) -> bool {
        self.accelerators.read().iter().any(|a| a.action == action)
    }
}

impl Scene for AcceleratorScene {
    fn id(&self) -> SceneId {
        self.id
    }

    fn install_accelerator(
        &self,
        action: &str,
        combination: KeyCombination,
        handler: AcceleratorHandler,
    ) {
        let mut accelerators = self.accelerators.write();
        let accelerator = Accelerator {
            action: action.to_string(),
            combination,
            handler,
        };
        match accelerators.iter_mut().find(|a| a.action == action) {
            Some(existing) => *existing = accelerator,
            None => accelerators.push(accelerator),
        }
    }

    fn remove_accelerator(&self, action: &str) {
        self.accelerators.write().retain(|a| a.action != action);
    }
}
