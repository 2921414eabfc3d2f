//! The throttle record survives a reload of the host.

use nudge_core::{
    Config, FileThrottleStore, Frame, ManualClock, NudgeController, NudgeEvent, StaticTarget,
    SuppressReason,
};

const START: u64 = 1_700_000_000_000;

fn controller(clock: &ManualClock, store: FileThrottleStore) -> NudgeController {
    let mut config = Config::default();
    config.particles.seed = Some(3);
    NudgeController::from_config(
        &config,
        Box::new(clock.clone()),
        Box::new(StaticTarget::at(Frame::new(0.0, 0.0, 400.0, 80.0))),
        Box::new(store),
    )
}

#[test]
fn test_reload_inside_window_stays_throttled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("throttle.json");
    let clock = ManualClock::new(START);

    let mut first = controller(&clock, FileThrottleStore::new(&path));
    first.on_signal(150);
    assert!(first.lifecycle().is_visible());
    drop(first);

    // Page reload: fresh session state, same store.
    clock.advance(60_000);
    let mut second = controller(&clock, FileThrottleStore::new(&path));
    second.on_signal(150);

    assert!(!second.lifecycle().is_visible());
    let events = second.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        NudgeEvent::NudgeSuppressed {
            reason: SuppressReason::Throttled { remaining_ms },
            ..
        } if *remaining_ms == 9 * 60 * 1000
    )));
}

#[test]
fn test_reload_after_window_shows_again() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("throttle.json");
    let clock = ManualClock::new(START);

    let mut first = controller(&clock, FileThrottleStore::new(&path));
    first.on_signal(150);
    drop(first);

    clock.advance(10 * 60 * 1000);
    let mut second = controller(&clock, FileThrottleStore::new(&path));
    second.on_signal(150);

    assert!(second.lifecycle().is_visible());
    assert_eq!(
        second.lifecycle().throttle().last_shown_ms(),
        Some(START + 10 * 60 * 1000)
    );
}

#[test]
fn test_unwritable_store_does_not_block_show() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be: reads and writes both fail.
    let path = dir.path().join("throttle.json");
    std::fs::create_dir(&path).unwrap();
    let clock = ManualClock::new(START);

    let mut c = controller(&clock, FileThrottleStore::new(&path));
    c.on_signal(150);

    assert!(c.lifecycle().is_visible());
}

#[test]
fn test_clear_lifts_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("throttle.json");
    let clock = ManualClock::new(START);

    let mut c = controller(&clock, FileThrottleStore::new(&path));
    c.on_signal(150);
    c.lifecycle_mut().dismiss();
    clock.advance(1_000);
    c.tick();

    c.lifecycle_mut().throttle_mut().clear().unwrap();
    assert!(c.lifecycle_mut().show(None, None));
}
