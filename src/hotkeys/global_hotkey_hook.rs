//! Native hook backed by the `global-hotkey` crate.
//!
//! `global-hotkey` cannot observe every key; it grabs specific
//! combinations. The backend therefore uses [`NativeHook::sync_grabs`] to
//! keep the OS grabs in line with the engine's combo table, and translates
//! each `GlobalHotKeyEvent` back into the native event for the grabbed
//! combination. Grabbed keys never reach the foreground application, so
//! [`NativeHook::consume`] has nothing left to do.
//!
//! The `GlobalHotKeyManager` lives on a dedicated thread and is driven by
//! commands over an async channel. A second thread pumps the crate's global
//! event receiver into the listeners.
//!
//! NOTE: on macOS the manager must be created on the main thread and events
//! only flow while an application event loop runs there.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use global_hotkey::hotkey::HotKey;
use global_hotkey::{Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::hook::{NativeHook, NativeKeyEvent, NativeKeyListener};
use crate::error::HookError;
use crate::shortcuts::{KeyCombination, ModifierMask};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

enum Command {
    Grab(Vec<KeyCombination>),
    Shutdown,
}

/// The native event a grabbed hotkey id stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Grabbed {
    raw_code: u32,
    raw_modifiers: u32,
    key_name: &'static str,
}

impl Grabbed {
    fn from_combination(combination: &KeyCombination) -> Self {
        Self {
            raw_code: combination.key().raw_code(),
            raw_modifiers: combination.modifiers().bits(),
            key_name: combination.key().name(),
        }
    }
}

/// What one `Grab` command asks of the manager.
///
/// Several combinations can map to the same `HotKey`: actions sharing a
/// combo, or `META+K` next to `COMMAND+K`. Each hotkey is registered once
/// and its id fans out to every distinct native event behind it.
#[derive(Debug, Default)]
struct GrabTable {
    hotkeys: Vec<HotKey>,
    events: HashMap<u32, Vec<Grabbed>>,
    unmapped: Vec<KeyCombination>,
}

impl GrabTable {
    fn build(combinations: &[KeyCombination]) -> Self {
        let mut table = GrabTable::default();
        for combination in combinations {
            let Some(hotkey) = to_hotkey(combination) else {
                table.unmapped.push(*combination);
                continue;
            };
            let grabbed = Grabbed::from_combination(combination);
            let events = table.events.entry(hotkey.id()).or_insert_with(|| {
                table.hotkeys.push(hotkey);
                Vec::new()
            });
            if !events.contains(&grabbed) {
                events.push(grabbed);
            }
        }
        table
    }
}

#[derive(Default)]
struct Shared {
    listeners: RwLock<Vec<Arc<dyn NativeKeyListener>>>,
    grabbed: RwLock<HashMap<u32, Vec<Grabbed>>>,
    /// Last combination list the engine asked for, replayed on install.
    wanted: Mutex<Vec<KeyCombination>>,
    pumping: AtomicBool,
}

struct Worker {
    commands: async_channel::Sender<Command>,
    manager_thread: JoinHandle<()>,
    pump_thread: JoinHandle<()>,
}

/// [`NativeHook`] over `global_hotkey::GlobalHotKeyManager`.
#[derive(Default)]
pub struct GlobalHotKeyHook {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

impl GlobalHotKeyHook {
    pub fn new() -> Self {
        Self::default()
    }

    fn send(&self, command: Command) {
        if let Some(worker) = self.worker.lock().as_ref() {
            if worker.commands.send_blocking(command).is_err() {
                warn!(category = "HOTKEY", "Hotkey manager thread gone");
            }
        }
    }
}

impl NativeHook for GlobalHotKeyHook {
    fn register_hook(&self) -> Result<(), HookError> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        let (commands, command_rx) = async_channel::unbounded::<Command>();
        let (ready_tx, ready_rx) = async_channel::bounded::<Result<(), String>>(1);

        let shared = self.shared.clone();
        let manager_thread = std::thread::Builder::new()
            .name("hotkey-manager".to_string())
            .spawn(move || run_manager(shared, command_rx, ready_tx))
            .map_err(|e| HookError::HookRegistrationFailed(e.to_string()))?;

        match ready_rx.recv_blocking() {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                let _ = manager_thread.join();
                return Err(HookError::HookRegistrationFailed(message));
            }
            Err(_) => {
                let _ = manager_thread.join();
                return Err(HookError::HookRegistrationFailed(
                    "hotkey manager thread exited during startup".to_string(),
                ));
            }
        }

        self.shared.pumping.store(true, Ordering::Release);
        let shared = self.shared.clone();
        let pump_thread = match std::thread::Builder::new()
            .name("hotkey-events".to_string())
            .spawn(move || pump_events(shared))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.pumping.store(false, Ordering::Release);
                let _ = commands.send_blocking(Command::Shutdown);
                let _ = manager_thread.join();
                return Err(HookError::HookRegistrationFailed(e.to_string()));
            }
        };

        let wanted = self.shared.wanted.lock().clone();
        if !wanted.is_empty() && commands.send_blocking(Command::Grab(wanted)).is_err() {
            warn!(category = "HOTKEY", "Hotkey manager thread gone before first grab");
        }

        *worker = Some(Worker {
            commands,
            manager_thread,
            pump_thread,
        });
        info!(category = "HOTKEY", "global-hotkey backend installed");
        Ok(())
    }

    fn unregister_hook(&self) -> Result<(), HookError> {
        let Some(worker) = self.worker.lock().take() else {
            return Ok(());
        };

        self.shared.pumping.store(false, Ordering::Release);
        let _ = worker.commands.send_blocking(Command::Shutdown);

        let manager_ok = worker.manager_thread.join().is_ok();
        let pump_ok = worker.pump_thread.join().is_ok();
        self.shared.grabbed.write().clear();

        if manager_ok && pump_ok {
            info!(category = "HOTKEY", "global-hotkey backend removed");
            Ok(())
        } else {
            Err(HookError::HookUnregistrationFailed(
                "hotkey backend thread panicked".to_string(),
            ))
        }
    }

    fn add_listener(&self, listener: Arc<dyn NativeKeyListener>) {
        self.shared.listeners.write().push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn NativeKeyListener>) {
        let target = Arc::as_ptr(listener) as *const ();
        self.shared
            .listeners
            .write()
            .retain(|l| Arc::as_ptr(l) as *const () != target);
    }

    fn consume(&self, _event: &NativeKeyEvent<'_>) -> Result<(), HookError> {
        Ok(())
    }

    fn sync_grabs(&self, combinations: &[KeyCombination]) {
        *self.shared.wanted.lock() = combinations.to_vec();
        self.send(Command::Grab(combinations.to_vec()));
    }
}

impl Drop for GlobalHotKeyHook {
    fn drop(&mut self) {
        if let Err(e) = self.unregister_hook() {
            warn!(category = "HOTKEY", error = %e, "Failed to remove hotkey backend");
        }
    }
}

fn run_manager(
    shared: Arc<Shared>,
    commands: async_channel::Receiver<Command>,
    ready: async_channel::Sender<Result<(), String>>,
) {
    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            let _ = ready.send_blocking(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send_blocking(Ok(()));

    let mut registered: Vec<HotKey> = Vec::new();
    while let Ok(command) = commands.recv_blocking() {
        match command {
            Command::Grab(combinations) => {
                release_grabs(&manager, &mut registered);
                let GrabTable {
                    hotkeys,
                    mut events,
                    unmapped,
                } = GrabTable::build(&combinations);

                for combination in &unmapped {
                    warn!(
                        category = "HOTKEY",
                        combo = %combination,
                        "Key has no global-hotkey equivalent, skipping"
                    );
                }
                for hotkey in hotkeys {
                    match manager.register(hotkey) {
                        Ok(()) => registered.push(hotkey),
                        Err(e) => {
                            warn!(
                                category = "HOTKEY",
                                "{}",
                                format_hotkey_error(&e, &hotkey.to_string())
                            );
                            events.remove(&hotkey.id());
                        }
                    }
                }
                debug!(
                    category = "HOTKEY",
                    grabbed = registered.len(),
                    wanted = combinations.len(),
                    "Synced global grabs"
                );
                *shared.grabbed.write() = events;
            }
            Command::Shutdown => break,
        }
    }

    release_grabs(&manager, &mut registered);
}

fn release_grabs(manager: &GlobalHotKeyManager, registered: &mut Vec<HotKey>) {
    for hotkey in registered.drain(..) {
        if let Err(e) = manager.unregister(hotkey) {
            warn!(category = "HOTKEY", id = hotkey.id(), error = %e, "Failed to release grab");
        }
    }
}

fn pump_events(shared: Arc<Shared>) {
    let receiver = GlobalHotKeyEvent::receiver();
    while shared.pumping.load(Ordering::Acquire) {
        let Ok(event) = receiver.recv_timeout(EVENT_POLL_INTERVAL) else {
            continue;
        };
        let Some(targets) = shared.grabbed.read().get(&event.id).cloned() else {
            continue;
        };

        let listeners = shared.listeners.read().clone();
        for grabbed in targets {
            let native = match event.state {
                HotKeyState::Pressed => NativeKeyEvent::pressed(
                    grabbed.raw_code,
                    grabbed.raw_modifiers,
                    grabbed.key_name,
                ),
                HotKeyState::Released => NativeKeyEvent::released(
                    grabbed.raw_code,
                    grabbed.raw_modifiers,
                    grabbed.key_name,
                ),
            };
            for listener in &listeners {
                listener.on_key_event(&native);
            }
        }
    }
}

/// Convert a combination into the crate's hotkey, if the key exists there.
///
/// `global-hotkey` has no AltGr or separate Command modifier: AltGr grabs
/// as Alt, and both Meta and Command grab as Super.
fn to_hotkey(combination: &KeyCombination) -> Option<HotKey> {
    let modifiers = combination.modifiers();
    let code = combination.key().code_name().to_uppercase();
    let mut tokens: Vec<&str> = Vec::with_capacity(5);
    if modifiers.contains(ModifierMask::SHIFT) {
        tokens.push("SHIFT");
    }
    if modifiers.contains(ModifierMask::CONTROL) {
        tokens.push("CONTROL");
    }
    if modifiers.intersects(ModifierMask::ALT | ModifierMask::ALT_GRAPH) {
        tokens.push("ALT");
    }
    if modifiers.intersects(ModifierMask::META | ModifierMask::COMMAND) {
        tokens.push("SUPER");
    }
    tokens.push(&code);

    HotKey::from_str(&tokens.join("+")).ok()
}

/// Format a hotkey registration error with helpful context
fn format_hotkey_error(e: &HotkeyError, shortcut_display: &str) -> String {
    match e {
        HotkeyError::AlreadyRegistered(hk) => format!(
            "Hotkey '{}' is already registered by another application (ID: {})",
            shortcut_display,
            hk.id()
        ),
        HotkeyError::FailedToRegister(msg) => format!(
            "System rejected hotkey '{}': {}. The shortcut may be reserved by the OS.",
            shortcut_display, msg
        ),
        HotkeyError::OsError(os_err) => {
            format!("OS error registering '{}': {}", shortcut_display, os_err)
        }
        other => format!("Failed to register hotkey '{}': {}", shortcut_display, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use global_hotkey::hotkey::{Code, Modifiers};

    fn hotkey(spec: &str) -> Option<HotKey> {
        to_hotkey(&KeyCombination::parse(spec).unwrap())
    }

    #[test]
    fn converts_modifiers_and_key() {
        assert_eq!(
            hotkey("CTRL+ALT+W"),
            Some(HotKey::new(
                Some(Modifiers::CONTROL | Modifiers::ALT),
                Code::KeyW
            ))
        );
        assert_eq!(hotkey("F8"), Some(HotKey::new(None, Code::F8)));
    }

    #[test]
    fn meta_and_command_both_grab_as_super() {
        let expected = Some(HotKey::new(Some(Modifiers::SUPER), Code::KeyK));
        assert_eq!(hotkey("META+K"), expected);
        assert_eq!(hotkey("COMMAND+K"), expected);
    }

    #[test]
    fn punctuation_and_digits_convert() {
        assert_eq!(
            hotkey("SHIFT+1"),
            Some(HotKey::new(Some(Modifiers::SHIFT), Code::Digit1))
        );
        assert_eq!(hotkey("BACK_QUOTE"), Some(HotKey::new(None, Code::Backquote)));
    }

    fn combos(specs: &[&str]) -> Vec<KeyCombination> {
        specs
            .iter()
            .map(|spec| KeyCombination::parse(spec).unwrap())
            .collect()
    }

    #[test]
    fn shared_combo_is_grabbed_once() {
        let table = GrabTable::build(&combos(&["CTRL+ALT+W", "CTRL+ALT+W", "F8"]));
        assert_eq!(table.hotkeys.len(), 2);

        let id = hotkey("CTRL+ALT+W").unwrap().id();
        assert_eq!(table.events[&id].len(), 1);
        assert!(table.unmapped.is_empty());
    }

    #[test]
    fn meta_and_command_share_a_grab_but_keep_their_masks() {
        let table = GrabTable::build(&combos(&["META+K", "COMMAND+K"]));
        assert_eq!(table.hotkeys.len(), 1);

        let id = hotkey("COMMAND+K").unwrap().id();
        let masks: Vec<u32> = table.events[&id].iter().map(|g| g.raw_modifiers).collect();
        assert_eq!(
            masks,
            vec![ModifierMask::META.bits(), ModifierMask::COMMAND.bits()]
        );

        // Each fanned-out event matches exactly its own combination.
        let [meta, command] = [combos(&["META+K"])[0], combos(&["COMMAND+K"])[0]];
        for g in &table.events[&id] {
            let hits_meta = meta.matches(g.raw_code, g.raw_modifiers, g.key_name);
            let hits_command = command.matches(g.raw_code, g.raw_modifiers, g.key_name);
            assert!(hits_meta != hits_command);
        }
    }

    #[test]
    fn unregister_without_register_is_a_no_op() {
        let hook = GlobalHotKeyHook::new();
        assert_eq!(hook.unregister_hook(), Ok(()));
        // Stored for replay on install, nothing sent.
        hook.sync_grabs(&[KeyCombination::parse("F8").unwrap()]);
        assert_eq!(hook.shared.wanted.lock().len(), 1);
    }

    /// Needs a desktop session that allows global grabs.
    #[cfg(feature = "system-tests")]
    #[test]
    fn installs_and_removes_against_the_real_os() {
        let hook = GlobalHotKeyHook::new();
        hook.register_hook().unwrap();
        hook.sync_grabs(&[KeyCombination::parse("CTRL+ALT+SHIFT+F12").unwrap()]);
        std::thread::sleep(Duration::from_millis(200));
        hook.unregister_hook().unwrap();
    }
}
