//! Presentation lifecycle.
//!
//! Owns the notification slot, the throttle gate, the particle engine and
//! every timer. There is no internal thread: the host calls `tick()`
//! periodically and the lifecycle fires whatever is due, in deadline order.
//!
//! ## Usage
//!
//! ```ignore
//! let mut lifecycle = PresentationLifecycle::new(&config, clock, target, store);
//! lifecycle.show(None, None);
//! // In a loop:
//! lifecycle.tick();
//! for event in lifecycle.drain_events() { /* render */ }
//! ```

use tracing::{debug, info, warn};

use super::instance::{NotificationInstance, Phase};
use super::target::RenderTarget;
use crate::clock::{to_datetime, Clock};
use crate::events::{HideReason, NudgeEvent, NudgeTrigger, SuppressReason};
use crate::particles::{BurstLayer, ParticleEffectEngine};
use crate::storage::{Config, CopyConfig, PresentationConfig};
use crate::throttle::{Throttle, ThrottleDecision, ThrottleStore};
use crate::timer::{TimerIds, TimerSlot};

/// Timer kinds, ordered for tie-breaking when deadlines coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DueTimer {
    Entrance,
    AutoClose,
    Ambient,
    Fade,
    TargetAction,
}

/// Events kept for the host between two `drain_events()` calls.
pub const MAX_PENDING_EVENTS: usize = 1024;

/// The notification slot and everything that runs while a notice is up.
///
/// Hosts must call `drain_events()` after each `tick()` or command. The
/// outbox holds at most [`MAX_PENDING_EVENTS`]; past that the oldest events
/// are dropped, since a visible notice emits an ambient spawn every period.
pub struct PresentationLifecycle {
    timings: PresentationConfig,
    copy: CopyConfig,
    burst_count: usize,
    clock: Box<dyn Clock>,
    target: Box<dyn RenderTarget>,
    throttle: Throttle,
    particles: ParticleEffectEngine,
    timer_ids: TimerIds,
    current: Option<NotificationInstance>,
    bursts: BurstLayer,
    /// Outlives the instance: the link opens after the notice has detached.
    target_action: TimerSlot,
    target_action_url: Option<String>,
    next_instance_id: u64,
    events: Vec<NudgeEvent>,
    /// Set once the outbox has dropped events since the last drain.
    outbox_overflowed: bool,
}

impl PresentationLifecycle {
    pub fn new(
        config: &Config,
        clock: Box<dyn Clock>,
        target: Box<dyn RenderTarget>,
        store: Box<dyn ThrottleStore>,
    ) -> Self {
        Self {
            timings: config.presentation.clone(),
            copy: config.copy.clone(),
            burst_count: config.particles.burst_count,
            clock,
            target,
            throttle: Throttle::new(store, config.throttle.window_ms()),
            particles: ParticleEffectEngine::new(config.particles.clone()),
            timer_ids: TimerIds::new(),
            current: None,
            bursts: BurstLayer::new(),
            target_action: TimerSlot::new(),
            target_action_url: None,
            next_instance_id: 0,
            events: Vec::new(),
            outbox_overflowed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_visible(&self) -> bool {
        self.current.as_ref().is_some_and(|i| i.is_visible())
    }

    /// The live instance, including one that is still fading out.
    pub fn current(&self) -> Option<&NotificationInstance> {
        self.current.as_ref()
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    pub fn throttle_mut(&mut self) -> &mut Throttle {
        &mut self.throttle
    }

    pub fn bursts(&self) -> &BurstLayer {
        &self.bursts
    }

    pub fn copy(&self) -> &CopyConfig {
        &self.copy
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// URL of a target action armed but not yet due.
    pub fn pending_target_action(&self) -> Option<&str> {
        self.target_action
            .is_armed()
            .then_some(self.target_action_url.as_deref())
            .flatten()
    }

    /// Earliest instant at which `tick()` has something to do.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let mut deadlines: Vec<u64> = Vec::new();
        if let Some(instance) = &self.current {
            deadlines.extend(
                [
                    &instance.entrance,
                    &instance.auto_close,
                    &instance.ambient,
                    &instance.fade,
                ]
                .into_iter()
                .filter_map(TimerSlot::due_at_ms),
            );
            deadlines.extend(instance.particles.particles().iter().map(|p| p.expires_at_ms));
        }
        deadlines.extend(self.target_action.due_at_ms());
        deadlines.extend(self.bursts.bursts().iter().map(|b| b.expires_at_ms));
        deadlines.into_iter().min()
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<NudgeEvent> {
        self.outbox_overflowed = false;
        std::mem::take(&mut self.events)
    }

    /// Number of events waiting for `drain_events()`.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Present a notification. Returns whether one was actually presented.
    ///
    /// Without a body the configured default copy is used. The caller is
    /// responsible for any activity precondition.
    pub fn show(&mut self, body: Option<&str>, header: Option<&str>) -> bool {
        self.present(
            NudgeTrigger::Direct,
            body.map(str::to_owned),
            header.map(str::to_owned),
        )
    }

    pub(crate) fn present(
        &mut self,
        trigger: NudgeTrigger,
        body: Option<String>,
        header: Option<String>,
    ) -> bool {
        let now = self.clock.now_ms();

        if self.is_visible() {
            return self.suppress(trigger, SuppressReason::AlreadyVisible, now);
        }
        if let ThrottleDecision::Limited { remaining_ms } = self.throttle.check(now) {
            return self.suppress(trigger, SuppressReason::Throttled { remaining_ms }, now);
        }
        let Some(frame) = self.target.frame() else {
            return self.suppress(trigger, SuppressReason::NoRenderTarget, now);
        };

        self.throttle.record(now);

        // A notice still fading out gives up the slot immediately.
        if let Some(previous) = self.current.take() {
            self.events.push(NudgeEvent::NudgeDetached {
                instance_id: previous.id,
                at: to_datetime(now),
            });
        }

        self.next_instance_id += 1;
        let body = body.unwrap_or_else(|| self.copy.body.clone());
        let mut instance =
            NotificationInstance::new(self.next_instance_id, trigger, header, body, frame, now);
        let at = to_datetime(now);

        self.events.push(NudgeEvent::NudgeShown {
            instance_id: instance.id,
            trigger,
            header: instance.header.clone(),
            body: instance.body.clone(),
            at,
        });

        instance
            .entrance
            .arm(&mut self.timer_ids, now + self.timings.entrance_ms);

        let particle = self.particles.spawn_ambient(&mut instance.particles, now);
        self.events.push(NudgeEvent::AmbientSpawned {
            instance_id: instance.id,
            particle,
            at,
        });
        let period = self.ambient_period_ms();
        instance.ambient.arm(&mut self.timer_ids, now + period);

        let (timer, replaced) = instance
            .auto_close
            .arm(&mut self.timer_ids, now + self.timings.auto_close_ms);
        self.events.push(NudgeEvent::AutoCloseArmed {
            instance_id: instance.id,
            timer,
            replaced,
            at,
        });

        info!(instance_id = instance.id, ?trigger, "nudge shown");
        self.current = Some(instance);
        true
    }

    /// Start hiding the current notice. Safe to call any number of times,
    /// with or without a notice.
    pub fn hide(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.begin_fade(HideReason::Forced, now)
    }

    /// Pointer entered the notice: pause auto-close.
    pub fn pointer_enter(&mut self) {
        let now = self.clock.now_ms();
        let Some(instance) = self.current.as_mut().filter(|i| i.is_visible()) else {
            return;
        };
        instance.hovered = true;
        if let Some(timer) = instance.auto_close.cancel() {
            self.events.push(NudgeEvent::AutoCloseCancelled {
                instance_id: instance.id,
                timer,
                at: to_datetime(now),
            });
        }
    }

    /// Pointer left the notice: restart auto-close with the shorter delay.
    pub fn pointer_leave(&mut self) {
        let now = self.clock.now_ms();
        let Some(instance) = self.current.as_mut().filter(|i| i.is_visible()) else {
            return;
        };
        instance.hovered = false;
        let (timer, replaced) = instance
            .auto_close
            .arm(&mut self.timer_ids, now + self.timings.hover_resume_ms);
        self.events.push(NudgeEvent::AutoCloseArmed {
            instance_id: instance.id,
            timer,
            replaced,
            at: to_datetime(now),
        });
    }

    /// Primary interaction: burst, hide, then the target action after a delay.
    pub fn primary_action(&mut self) -> bool {
        let now = self.clock.now_ms();
        let Some(instance) = self.current.as_ref().filter(|i| i.is_visible()) else {
            return false;
        };
        let (x, y) = instance.frame.center();

        let burst = self.particles.spawn_burst(x, y, self.burst_count, now);
        self.events.push(NudgeEvent::BurstSpawned {
            burst: burst.clone(),
            at: to_datetime(now),
        });
        self.bursts.push(burst);

        self.begin_fade(HideReason::PrimaryAction, now);

        self.target_action
            .arm(&mut self.timer_ids, now + self.timings.action_delay_ms);
        self.target_action_url = Some(self.copy.target_url.clone());
        true
    }

    /// Dismiss control: hide with no burst and no target action.
    pub fn dismiss(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.begin_fade(HideReason::Dismissed, now)
    }

    /// Fire every due timer, then drop expired particles and bursts.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        while let Some(kind) = self.next_due(now) {
            self.fire(kind, now);
        }

        if let Some(instance) = self.current.as_mut() {
            instance.particles.prune(now);
        }
        for burst_id in self.bursts.prune(now) {
            self.events.push(NudgeEvent::BurstExpired {
                burst_id,
                at: to_datetime(now),
            });
        }
        self.cap_outbox();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Queue an event produced outside the lifecycle (controller policy).
    pub(crate) fn emit(&mut self, event: NudgeEvent) {
        self.events.push(event);
    }

    pub(crate) fn suppress(&mut self, trigger: NudgeTrigger, reason: SuppressReason, now: u64) -> bool {
        debug!(?trigger, ?reason, "nudge not presented");
        self.events.push(NudgeEvent::NudgeSuppressed {
            trigger,
            reason,
            at: to_datetime(now),
        });
        false
    }

    fn cap_outbox(&mut self) {
        let excess = self.events.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess == 0 {
            return;
        }
        if !self.outbox_overflowed {
            warn!(
                limit = MAX_PENDING_EVENTS,
                "event outbox full, dropping oldest events until the next drain"
            );
            self.outbox_overflowed = true;
        }
        self.events.drain(..excess);
    }

    /// Release the instance timers and start the exit transition.
    fn begin_fade(&mut self, reason: HideReason, now: u64) -> bool {
        let Some(instance) = self.current.as_mut() else {
            return false;
        };
        instance.ambient.cancel();
        instance.auto_close.cancel();
        if !instance.is_visible() {
            return false;
        }
        instance.entrance.cancel();
        instance.phase = Phase::Fading;
        instance
            .fade
            .arm(&mut self.timer_ids, now + self.timings.fade_out_ms);

        debug!(instance_id = instance.id, ?reason, "nudge hiding");
        self.events.push(NudgeEvent::NudgeHidden {
            instance_id: instance.id,
            reason,
            at: to_datetime(now),
        });
        true
    }

    fn ambient_period_ms(&self) -> u64 {
        self.timings.ambient_period_ms.max(1)
    }

    fn next_due(&self, now: u64) -> Option<DueTimer> {
        let mut due: Vec<(u64, DueTimer)> = Vec::new();
        if let Some(instance) = &self.current {
            for (slot, kind) in [
                (&instance.entrance, DueTimer::Entrance),
                (&instance.auto_close, DueTimer::AutoClose),
                (&instance.ambient, DueTimer::Ambient),
                (&instance.fade, DueTimer::Fade),
            ] {
                due.extend(slot.due_at_ms().map(|at| (at, kind)));
            }
        }
        due.extend(
            self.target_action
                .due_at_ms()
                .map(|at| (at, DueTimer::TargetAction)),
        );
        due.into_iter()
            .filter(|(at, _)| *at <= now)
            .min()
            .map(|(_, kind)| kind)
    }

    fn fire(&mut self, kind: DueTimer, now: u64) {
        match kind {
            DueTimer::Entrance => {
                let Some(instance) = self.current.as_mut() else {
                    return;
                };
                if let Some(timer) = instance.entrance.take_due(now) {
                    if instance.phase == Phase::Entering {
                        instance.phase = Phase::Shown;
                        self.events.push(NudgeEvent::EntranceCompleted {
                            instance_id: instance.id,
                            at: to_datetime(timer.due_at_ms),
                        });
                    }
                }
            }
            DueTimer::AutoClose => {
                let fired = self
                    .current
                    .as_mut()
                    .and_then(|i| i.auto_close.take_due(now));
                if let Some(timer) = fired {
                    self.begin_fade(HideReason::AutoClose, timer.due_at_ms);
                }
            }
            DueTimer::Ambient => {
                let period = self.ambient_period_ms();
                let Some(instance) = self.current.as_mut() else {
                    return;
                };
                let Some(timer) = instance.ambient.take_due(now) else {
                    return;
                };
                let particle = self
                    .particles
                    .spawn_ambient(&mut instance.particles, timer.due_at_ms);
                // Missed periods collapse into this one spawn.
                let missed = (now - timer.due_at_ms) / period;
                instance
                    .ambient
                    .arm(&mut self.timer_ids, timer.due_at_ms + period * (missed + 1));
                self.events.push(NudgeEvent::AmbientSpawned {
                    instance_id: instance.id,
                    particle,
                    at: to_datetime(timer.due_at_ms),
                });
            }
            DueTimer::Fade => {
                let fired = self.current.as_mut().and_then(|i| i.fade.take_due(now));
                if let Some(timer) = fired {
                    if let Some(instance) = self.current.take() {
                        self.events.push(NudgeEvent::NudgeDetached {
                            instance_id: instance.id,
                            at: to_datetime(timer.due_at_ms),
                        });
                    }
                }
            }
            DueTimer::TargetAction => {
                if let Some(timer) = self.target_action.take_due(now) {
                    if let Some(url) = self.target_action_url.take() {
                        info!(%url, "target action due");
                        self.events.push(NudgeEvent::TargetActionDue {
                            url,
                            at: to_datetime(timer.due_at_ms),
                        });
                    }
                }
            }
        }
    }
}
