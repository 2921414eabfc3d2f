//! Integration tests for the nudge controller.
//!
//! These drive the controller the way a host does: signals, periodic ticks,
//! pointer interaction, and draining events after every step.

use nudge_core::{
    Config, Frame, ManualClock, MemoryThrottleStore, NudgeController, NudgeEvent, NudgeTrigger,
    StaticTarget, SuppressReason,
};

const START: u64 = 1_700_000_000_000;
const WINDOW: u64 = 10 * 60 * 1000;

fn controller(clock: &ManualClock) -> NudgeController {
    let mut config = Config::default();
    config.particles.seed = Some(42);
    NudgeController::from_config(
        &config,
        Box::new(clock.clone()),
        Box::new(StaticTarget::at(Frame::new(20.0, 600.0, 420.0, 72.0))),
        Box::new(MemoryThrottleStore::new()),
    )
}

fn shown(events: &[NudgeEvent]) -> Vec<NudgeTrigger> {
    events
        .iter()
        .filter_map(|e| match e {
            NudgeEvent::NudgeShown { trigger, .. } => Some(*trigger),
            _ => None,
        })
        .collect()
}

fn index_of(events: &[NudgeEvent], pred: impl Fn(&NudgeEvent) -> bool) -> usize {
    events
        .iter()
        .position(|e| pred(e))
        .expect("event not emitted")
}

#[test]
fn test_milestone_scenario_with_window_elapsed() {
    let clock = ManualClock::new(START);
    let mut c = controller(&clock);
    let mut fired = Vec::new();

    for count in [0, 10, 55, 120, 199, 205] {
        c.on_signal(count);
        for trigger in shown(&c.drain_events()) {
            fired.push((count, trigger));
        }
        // Let the notice auto-close, fade, and the throttle window pass.
        clock.advance(WINDOW);
        c.tick();
        c.drain_events();
    }

    assert_eq!(
        fired,
        vec![
            (55, NudgeTrigger::Threshold),
            (120, NudgeTrigger::Milestone { milestone: 100 }),
            (205, NudgeTrigger::Milestone { milestone: 200 }),
        ]
    );
}

#[test]
fn test_first_signal_with_history_is_late_trigger() {
    let clock = ManualClock::new(START);
    let mut c = controller(&clock);

    c.on_signal(120);
    let events = c.drain_events();

    assert_eq!(shown(&events), vec![NudgeTrigger::LateTrigger]);
    assert_eq!(c.state().last_milestone, 100);
    assert!(events.iter().any(|e| matches!(
        e,
        NudgeEvent::NudgeShown { body, .. } if body == &Config::default().copy.body
    )));
}

#[test]
fn test_all_trigger_kinds_share_the_throttle() {
    let clock = ManualClock::new(START);
    let mut c = controller(&clock);

    // Threshold nudge shows and is dismissed right away.
    c.on_signal(10);
    c.on_signal(60);
    c.lifecycle_mut().dismiss();
    clock.advance(1_000);
    c.tick();
    c.drain_events();

    // Milestone inside the window is throttled.
    c.on_signal(100);
    let events = c.drain_events();
    assert!(shown(&events).is_empty());
    assert!(events.iter().any(|e| matches!(
        e,
        NudgeEvent::NudgeSuppressed {
            trigger: NudgeTrigger::Milestone { milestone: 100 },
            reason: SuppressReason::Throttled { .. },
            ..
        }
    )));

    // A direct show is throttled too.
    assert!(!c.lifecycle_mut().show(Some("direct"), None));
    assert_eq!(c.lifecycle().throttle().last_shown_ms(), Some(START));
}

#[test]
fn test_full_interaction_flow() {
    let clock = ManualClock::new(START);
    let mut c = controller(&clock);

    c.on_signal(75);
    assert!(c.lifecycle().is_visible());

    // Hover for a long time: no auto-close.
    clock.advance(400);
    c.tick();
    c.lifecycle_mut().pointer_enter();
    clock.advance(30_000);
    c.tick();
    assert!(c.lifecycle().is_visible());

    // Leave, then click before the shorter auto-close fires.
    c.lifecycle_mut().pointer_leave();
    clock.advance(2_000);
    c.tick();
    assert!(c.lifecycle_mut().primary_action());

    clock.advance(250);
    c.tick();
    assert!(c.lifecycle().current().is_none());

    clock.advance(150);
    c.tick();
    clock.advance(1_000);
    c.tick();

    let events = c.drain_events();
    let shown_at = index_of(&events, |e| matches!(e, NudgeEvent::NudgeShown { .. }));
    let entrance = index_of(&events, |e| matches!(e, NudgeEvent::EntranceCompleted { .. }));
    let burst = index_of(&events, |e| matches!(e, NudgeEvent::BurstSpawned { .. }));
    let hidden = index_of(&events, |e| matches!(e, NudgeEvent::NudgeHidden { .. }));
    let detached = index_of(&events, |e| matches!(e, NudgeEvent::NudgeDetached { .. }));
    let target = index_of(&events, |e| matches!(e, NudgeEvent::TargetActionDue { .. }));
    let expired = index_of(&events, |e| matches!(e, NudgeEvent::BurstExpired { .. }));

    assert!(shown_at < entrance);
    assert!(entrance < burst);
    assert!(burst < hidden);
    assert!(hidden < detached);
    assert!(detached < target);
    assert!(target < expired);
}

#[test]
fn test_reset_starts_a_new_session() {
    let clock = ManualClock::new(START);
    let mut c = controller(&clock);

    c.on_signal(250);
    c.reset();
    assert!(!c.lifecycle().is_visible());

    clock.advance(WINDOW);
    c.tick();
    c.drain_events();

    // Next signal is a first observation again.
    c.on_signal(80);
    assert_eq!(shown(&c.drain_events()), vec![NudgeTrigger::LateTrigger]);
    assert_eq!(c.state().last_milestone, 0);
}
