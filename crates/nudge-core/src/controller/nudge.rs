//! Nudge controller.
//!
//! ## Decision order per signal
//!
//! ```text
//! first signal / regression -> rebase, maybe late trigger, return
//! previous < floor <= count -> threshold nudge
//! new milestone >= step     -> milestone nudge
//! previous = count
//! ```

use tracing::{debug, info};

use super::milestone::{milestone_for, ActivitySignal, MilestoneState};
use crate::clock::{to_datetime, Clock};
use crate::events::{NudgeEvent, NudgeTrigger, SuppressReason};
use crate::presentation::{PresentationLifecycle, RenderTarget};
use crate::stats::StatsResponse;
use crate::storage::{Config, MilestoneConfig};
use crate::throttle::ThrottleStore;

/// Owns the session's milestone state and the presentation lifecycle.
///
/// Signals must be delivered one at a time, in order; there is no internal
/// locking.
pub struct NudgeController {
    state: MilestoneState,
    policy: MilestoneConfig,
    enabled: bool,
    lifecycle: PresentationLifecycle,
}

impl NudgeController {
    pub fn new(config: &Config, lifecycle: PresentationLifecycle) -> Self {
        Self {
            state: MilestoneState::default(),
            policy: config.milestones.clone(),
            enabled: config.settings.enabled,
            lifecycle,
        }
    }

    /// Build the controller and its lifecycle from one config.
    pub fn from_config(
        config: &Config,
        clock: Box<dyn Clock>,
        target: Box<dyn RenderTarget>,
        store: Box<dyn ThrottleStore>,
    ) -> Self {
        let lifecycle = PresentationLifecycle::new(config, clock, target, store);
        Self::new(config, lifecycle)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &MilestoneState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lifecycle(&self) -> &PresentationLifecycle {
        &self.lifecycle
    }

    /// Interaction handlers (hover, click, dismiss) live on the lifecycle.
    pub fn lifecycle_mut(&mut self) -> &mut PresentationLifecycle {
        &mut self.lifecycle
    }

    pub fn drain_events(&mut self) -> Vec<NudgeEvent> {
        self.lifecycle.drain_events()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Toggle nudging. While disabled, signals still move the baseline.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn tick(&mut self) {
        self.lifecycle.tick();
    }

    /// Process one activity observation.
    pub fn on_signal(&mut self, count: u64) {
        let floor = self.policy.min_activity;
        let step = self.policy.step;

        if !self.state.initialized || count < self.state.previous_count {
            let regressed = self.state.initialized;
            self.state.rebase(count, step);
            if regressed {
                debug!(count, "activity regressed, rebasing session");
                self.emit_session_reset(count);
            }
            if count >= floor && !self.lifecycle.is_visible() {
                info!(count, "late trigger: session starts with a large history");
                self.attempt_show(NudgeTrigger::LateTrigger, count, None, None);
            }
            return;
        }

        if self.state.previous_count < floor && count >= floor && !self.lifecycle.is_visible() {
            self.attempt_show(NudgeTrigger::Threshold, count, None, None);
        }

        let milestone = milestone_for(count, step);
        if milestone > self.state.last_milestone && milestone >= step {
            self.state.last_milestone = milestone;
            info!(milestone, "milestone reached");
            let now = self.lifecycle.now_ms();
            self.lifecycle.emit(NudgeEvent::MilestoneReached {
                milestone,
                at: to_datetime(now),
            });

            let copy = self.lifecycle.copy();
            let header = copy.header_for(milestone);
            let body = copy.body.clone();
            self.attempt_show(
                NudgeTrigger::Milestone { milestone },
                count,
                Some(body),
                Some(header),
            );
        }

        self.state.previous_count = count;
    }

    pub fn on_activity(&mut self, signal: ActivitySignal) {
        self.on_signal(signal.count);
    }

    pub fn on_stats(&mut self, stats: &StatsResponse) {
        self.on_activity(ActivitySignal::from(stats));
    }

    /// Hide whatever is visible and forget the session (navigation change).
    pub fn reset(&mut self) {
        self.lifecycle.hide();
        self.state = MilestoneState::default();
        self.emit_session_reset(0);
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The single funnel for every trigger kind.
    ///
    /// Without a body, default copy is built here after checking the activity
    /// floor; the throttle gate is applied by the lifecycle.
    fn attempt_show(
        &mut self,
        trigger: NudgeTrigger,
        count: u64,
        body: Option<String>,
        header: Option<String>,
    ) -> bool {
        let now = self.lifecycle.now_ms();
        if !self.enabled {
            return self
                .lifecycle
                .suppress(trigger, SuppressReason::Disabled, now);
        }

        let (body, header) = match body {
            Some(body) => (body, header),
            None => {
                if count < self.policy.min_activity {
                    return self.lifecycle.suppress(
                        trigger,
                        SuppressReason::BelowActivityFloor { count },
                        now,
                    );
                }
                let copy = self.lifecycle.copy();
                let rounded = count / 10 * 10;
                (copy.body.clone(), Some(copy.header_for(rounded)))
            }
        };

        self.lifecycle.present(trigger, Some(body), header)
    }

    fn emit_session_reset(&mut self, baseline: u64) {
        let now = self.lifecycle.now_ms();
        self.lifecycle.emit(NudgeEvent::SessionReset {
            baseline,
            at: to_datetime(now),
        });
    }
}
