use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::engine::{ActionTrigger, GlobalHotkeyEngine};
use super::executor::ChannelExecutor;
use super::testing::FakeHook;
use crate::shortcuts::{KeyCombination, ModifierMask};

const F8: u32 = 0x77;
const KEY_W: u32 = 0x57;
const CTRL_ALT: u32 = ModifierMask::CONTROL.bits() | ModifierMask::ALT.bits();

struct Fixture {
    hook: Arc<FakeHook>,
    executor: Arc<ChannelExecutor>,
    engine: GlobalHotkeyEngine,
}

impl Fixture {
    fn new() -> Self {
        let hook = FakeHook::new();
        let executor = Arc::new(ChannelExecutor::new());
        let engine = GlobalHotkeyEngine::new(hook.clone(), executor.clone());
        Self {
            hook,
            executor,
            engine,
        }
    }

    fn bind(&self, name: &str, spec: &str, continuous: bool) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let trigger: ActionTrigger = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let combination = KeyCombination::parse(spec).unwrap();
        self.engine.register(name, combination, continuous, trigger);
        count
    }

    fn drain(&self) -> usize {
        self.executor.run_pending()
    }
}

#[test]
fn held_key_fires_once_until_released() {
    let fx = Fixture::new();
    let count = fx.bind("toggle", "F8", false);
    assert!(fx.engine.start());

    fx.hook.press(F8, 0, "F8");
    fx.hook.press(F8, 0, "F8");
    fx.hook.press(F8, 0, "F8");
    fx.hook.release(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn continuous_action_fires_on_every_repeat() {
    let fx = Fixture::new();
    let count = fx.bind("zoom", "F8", true);
    fx.engine.start();

    for _ in 0..3 {
        fx.hook.press(F8, 0, "F8");
    }
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn triggers_run_on_the_executor_not_inline() {
    let fx = Fixture::new();
    let count = fx.bind("toggle", "F8", false);
    fx.engine.start();

    fx.hook.press(F8, 0, "F8");
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(fx.drain(), 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn lock_and_mouse_bits_are_ignored() {
    let fx = Fixture::new();
    let count = fx.bind("screenshot", "CTRL+ALT+W", false);
    fx.engine.start();

    let noisy = CTRL_ALT | ModifierMask::CAPS_LOCK.bits() | ModifierMask::BUTTON1.bits();
    fx.hook.press(KEY_W, noisy, "W");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn extra_modifier_does_not_match() {
    let fx = Fixture::new();
    let count = fx.bind("screenshot", "CTRL+ALT+W", false);
    fx.engine.start();

    fx.hook
        .press(KEY_W, CTRL_ALT | ModifierMask::SHIFT.bits(), "W");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(fx.hook.consumed(), 0);
}

#[test]
fn matched_events_are_consumed() {
    let fx = Fixture::new();
    fx.bind("toggle", "F8", false);
    fx.engine.start();

    fx.hook.press(F8, 0, "F8");
    fx.hook.press(0x78, 0, "F9");
    assert_eq!(fx.hook.consumed(), 1);
}

#[test]
fn consume_failure_still_fires() {
    let fx = Fixture::new();
    let count = fx.bind("toggle", "F8", false);
    fx.hook.fail_consume(true);
    fx.engine.start();

    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(fx.engine.is_running());
}

#[test]
fn every_matching_combo_fires() {
    let fx = Fixture::new();
    let first = fx.bind("first", "F8", false);
    let second = fx.bind("second", "F8", false);
    fx.engine.start();

    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn any_release_rearms_every_combo() {
    let fx = Fixture::new();
    let count = fx.bind("toggle", "F8", false);
    fx.engine.start();

    fx.hook.press(F8, 0, "F8");
    assert_eq!(fx.engine.is_pressed("toggle"), Some(true));

    // Key-up of an unrelated key
    fx.hook.release(0x41, 0, "A");
    assert_eq!(fx.engine.is_pressed("toggle"), Some(false));

    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn start_and_stop_are_idempotent() {
    let fx = Fixture::new();
    assert!(fx.engine.start());
    assert!(fx.engine.start());
    assert_eq!(fx.hook.installs(), 1);
    assert_eq!(fx.hook.listener_count(), 1);

    fx.engine.stop();
    fx.engine.stop();
    assert_eq!(fx.hook.uninstalls(), 1);
    assert_eq!(fx.hook.listener_count(), 0);
    assert!(!fx.engine.is_running());
}

#[test]
fn refused_hook_leaves_engine_stopped() {
    let fx = Fixture::new();
    fx.hook.fail_register(true);

    assert!(!fx.engine.start());
    assert!(!fx.engine.is_running());
    assert_eq!(fx.hook.listener_count(), 0);

    fx.hook.fail_register(false);
    assert!(fx.engine.start());
}

#[test]
fn failed_unregister_still_clears_local_state() {
    let fx = Fixture::new();
    fx.engine.start();
    fx.hook.fail_unregister(true);

    fx.engine.stop();
    assert!(!fx.engine.is_running());
    assert_eq!(fx.hook.listener_count(), 0);

    fx.hook.fail_unregister(false);
    assert!(fx.engine.start());
    assert_eq!(fx.hook.installs(), 2);
}

#[test]
fn register_and_unregister_while_running() {
    let fx = Fixture::new();
    fx.engine.start();

    let count = fx.bind("toggle", "F8", false);
    fx.hook.press(F8, 0, "F8");
    fx.hook.release(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    assert!(fx.engine.unregister("toggle"));
    assert!(!fx.engine.unregister("toggle"));
    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn register_replaces_by_name_in_place() {
    let fx = Fixture::new();
    fx.bind("a", "F1", false);
    let old = fx.bind("b", "F8", false);
    fx.bind("c", "F3", false);
    let new = fx.bind("b", "CTRL+ALT+W", false);

    assert_eq!(fx.engine.registered(), vec!["a", "b", "c"]);
    assert_eq!(
        fx.engine.combination("b"),
        Some(KeyCombination::parse("CTRL+ALT+W").unwrap())
    );

    fx.engine.start();
    fx.hook.press(F8, 0, "F8");
    fx.hook.press(KEY_W, CTRL_ALT, "W");
    fx.drain();
    assert_eq!(old.load(Ordering::SeqCst), 0);
    assert_eq!(new.load(Ordering::SeqCst), 1);
}

#[test]
fn grabs_follow_the_combo_table_while_running() {
    let fx = Fixture::new();
    fx.bind("toggle", "F8", false);
    assert!(fx.hook.grabs().is_empty());

    fx.engine.start();
    assert_eq!(fx.hook.grabs(), vec![KeyCombination::parse("F8").unwrap()]);

    fx.bind("screenshot", "CTRL+ALT+W", false);
    assert_eq!(fx.hook.grabs().len(), 2);

    fx.engine.unregister("toggle");
    assert_eq!(
        fx.hook.grabs(),
        vec![KeyCombination::parse("CTRL+ALT+W").unwrap()]
    );
}

#[test]
fn unregister_all_updates_grabs_once() {
    let fx = Fixture::new();
    let count = fx.bind("toggle", "F8", false);
    fx.bind("screenshot", "CTRL+ALT+W", false);
    fx.bind("zoom", "CTRL+ALT+1", true);
    fx.engine.start();
    let before = fx.hook.grab_syncs();

    assert_eq!(fx.engine.unregister_all(), 3);
    assert_eq!(fx.hook.grab_syncs(), before + 1);
    assert!(fx.hook.grabs().is_empty());
    assert!(fx.engine.is_empty());
    assert!(fx.engine.is_running());

    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    // Nothing left to remove, nothing to resync.
    assert_eq!(fx.engine.unregister_all(), 0);
    assert_eq!(fx.hook.grab_syncs(), before + 1);
}

#[test]
fn stopped_engine_ignores_events() {
    let fx = Fixture::new();
    let count = fx.bind("toggle", "F8", false);
    fx.engine.start();
    fx.engine.stop();

    fx.hook.press(F8, 0, "F8");
    fx.drain();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn shutdown_forgets_combos() {
    let fx = Fixture::new();
    fx.bind("toggle", "F8", false);
    fx.engine.start();

    fx.engine.shutdown();
    assert!(!fx.engine.is_running());
    assert!(fx.engine.is_empty());
}

#[test]
fn dropping_the_engine_removes_the_hook() {
    let hook = FakeHook::new();
    {
        let engine = GlobalHotkeyEngine::new(hook.clone(), Arc::new(ChannelExecutor::new()));
        engine.start();
        assert!(hook.is_installed());
    }
    assert!(!hook.is_installed());
    assert_eq!(hook.uninstalls(), 1);
}
