use clap::Args;
use nudge_core::error::Result;
use nudge_core::{
    Clock, Config, FileThrottleStore, Frame, HideReason, ManualClock, MemoryThrottleStore,
    NudgeController, NudgeEvent, NudgeTrigger, StaticTarget, SuppressReason, SystemClock,
    ThrottleStore,
};

/// Simulated sessions start at a fixed instant so runs are reproducible,
/// unless they share the durable throttle record.
const SIM_START_MS: u64 = 1_700_000_000_000;

/// Bottom-left card over a 1280x800 page.
const SIM_FRAME: Frame = Frame {
    left: 20.0,
    top: 708.0,
    width: 420.0,
    height: 72.0,
};

/// One simulated year; keeps every deadline far from `u64::MAX`.
const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Slack after the last signal for any burst still on screen.
const BURST_SETTLE_MS: u64 = 1_200;

#[derive(Args)]
pub struct SimulateArgs {
    /// Activity counts in arrival order (e.g. "0,10,55,120")
    #[arg(long, value_delimiter = ',', required = true)]
    counts: Vec<u64>,
    /// Simulated seconds between signals (at most one year)
    #[arg(
        long,
        default_value = "1",
        value_parser = clap::value_parser!(u64).range(0..=MAX_INTERVAL_SECS)
    )]
    interval_secs: u64,
    /// Seed for the particle generator
    #[arg(long)]
    seed: Option<u64>,
    /// Print one JSON event per line
    #[arg(long)]
    json: bool,
    /// Hover each notice for half an interval after it appears
    #[arg(long)]
    hover: bool,
    /// Click each notice as soon as it appears
    #[arg(long)]
    click: bool,
    /// Open the target link in the browser when a click action fires
    #[arg(long)]
    open_links: bool,
    /// Use the durable throttle record and start from the current time
    #[arg(long)]
    persist: bool,
}

struct Simulation {
    clock: ManualClock,
    controller: NudgeController,
    args: SimulateArgs,
    start_ms: u64,
    /// Time for a notice shown at the last signal to close and clean up.
    settle_ms: u64,
}

impl Simulation {
    fn new(args: SimulateArgs) -> Result<Self> {
        let mut config = Config::load_or_default();
        if args.seed.is_some() {
            config.particles.seed = args.seed;
        }

        let (start_ms, store): (u64, Box<dyn ThrottleStore>) = if args.persist {
            let store = FileThrottleStore::open_default()?;
            tracing::debug!(path = %store.path().display(), "using durable throttle record");
            (SystemClock.now_ms(), Box::new(store) as Box<dyn ThrottleStore>)
        } else {
            (SIM_START_MS, Box::new(MemoryThrottleStore::new()) as Box<dyn ThrottleStore>)
        };

        let clock = ManualClock::new(start_ms);
        let controller = NudgeController::from_config(
            &config,
            Box::new(clock.clone()),
            Box::new(StaticTarget::at(SIM_FRAME)),
            store,
        );
        let timings = &config.presentation;
        let settle_ms = timings
            .auto_close_ms
            .saturating_add(timings.fade_out_ms)
            .saturating_add(timings.action_delay_ms)
            .saturating_add(BURST_SETTLE_MS);
        Ok(Self {
            clock,
            controller,
            args,
            start_ms,
            settle_ms,
        })
    }

    fn run(&mut self) -> Result<()> {
        let interval_ms = self.args.interval_secs.saturating_mul(1000);
        let counts = self.args.counts.clone();

        for count in counts {
            self.controller.on_signal(count);
            let shown = self.report()?;

            if shown && self.args.click {
                self.controller.lifecycle_mut().primary_action();
                self.report()?;
            } else if shown && self.args.hover {
                self.controller.lifecycle_mut().pointer_enter();
                self.report()?;
                self.advance(interval_ms / 2)?;
                self.controller.lifecycle_mut().pointer_leave();
                self.report()?;
                self.advance(interval_ms - interval_ms / 2)?;
                continue;
            }

            self.advance(interval_ms)?;
        }

        self.advance(self.settle_ms)?;
        Ok(())
    }

    /// Move the clock forward by `delta_ms`, stopping at every deadline on
    /// the way so events come out in order.
    fn advance(&mut self, delta_ms: u64) -> Result<()> {
        let end = self.clock.now_ms().saturating_add(delta_ms);
        while let Some(due) = self
            .controller
            .lifecycle()
            .next_deadline_ms()
            .filter(|due| *due <= end)
        {
            self.clock.set(due.max(self.clock.now_ms()));
            self.controller.tick();
            self.report()?;
        }
        self.clock.set(end);
        self.controller.tick();
        self.report()?;
        Ok(())
    }

    /// Print pending events. Returns whether a notice was shown.
    fn report(&mut self) -> Result<bool> {
        let mut shown = false;
        for event in self.controller.drain_events() {
            shown |= matches!(event, NudgeEvent::NudgeShown { .. });

            if self.args.json {
                println!("{}", serde_json::to_string(&event)?);
            } else {
                let offset_ms = event.at().timestamp_millis() - self.start_ms as i64;
                println!(
                    "[{:>9.3}s] {}",
                    offset_ms as f64 / 1000.0,
                    describe(&event, self.start_ms)
                );
            }

            if let NudgeEvent::TargetActionDue { url, .. } = &event {
                if self.args.open_links {
                    if let Err(e) = open::that(url) {
                        tracing::warn!(%url, error = %e, "failed to open target link");
                    }
                }
            }
        }
        Ok(shown)
    }
}

fn trigger_label(trigger: &NudgeTrigger) -> String {
    match trigger {
        NudgeTrigger::LateTrigger => "late trigger".to_string(),
        NudgeTrigger::Threshold => "threshold".to_string(),
        NudgeTrigger::Milestone { milestone } => format!("milestone {milestone}"),
        NudgeTrigger::Direct => "direct".to_string(),
    }
}

fn reason_label(reason: &SuppressReason) -> String {
    match reason {
        SuppressReason::AlreadyVisible => "already visible".to_string(),
        SuppressReason::Throttled { remaining_ms } => {
            format!("throttled, {}s left", remaining_ms.div_ceil(1000))
        }
        SuppressReason::NoRenderTarget => "no render target".to_string(),
        SuppressReason::BelowActivityFloor { count } => format!("only {count} messages"),
        SuppressReason::Disabled => "disabled".to_string(),
    }
}

fn hide_label(reason: HideReason) -> &'static str {
    match reason {
        HideReason::AutoClose => "auto-close",
        HideReason::PrimaryAction => "clicked",
        HideReason::Dismissed => "dismissed",
        HideReason::Forced => "hidden",
    }
}

fn describe(event: &NudgeEvent, start_ms: u64) -> String {
    match event {
        NudgeEvent::NudgeShown {
            instance_id,
            trigger,
            header,
            body,
            ..
        } => format!(
            "shown #{instance_id} ({}): {} | {body}",
            trigger_label(trigger),
            header.as_deref().unwrap_or("-"),
        ),
        NudgeEvent::NudgeSuppressed { trigger, reason, .. } => format!(
            "suppressed ({}): {}",
            trigger_label(trigger),
            reason_label(reason)
        ),
        NudgeEvent::EntranceCompleted { instance_id, .. } => {
            format!("entrance done #{instance_id}")
        }
        NudgeEvent::AutoCloseArmed {
            instance_id, timer, ..
        } => format!(
            "auto-close armed #{instance_id} (timer {}, due +{}ms)",
            timer.id,
            timer.due_at_ms.saturating_sub(start_ms)
        ),
        NudgeEvent::AutoCloseCancelled {
            instance_id, timer, ..
        } => format!("auto-close paused #{instance_id} (timer {})", timer.id),
        NudgeEvent::AmbientSpawned {
            instance_id,
            particle,
            ..
        } => format!(
            "ambient {} #{instance_id} at {}% ({}px)",
            particle.glyph, particle.left_pct, particle.size_px
        ),
        NudgeEvent::NudgeHidden {
            instance_id,
            reason,
            ..
        } => format!("{} #{instance_id}", hide_label(*reason)),
        NudgeEvent::NudgeDetached { instance_id, .. } => format!("detached #{instance_id}"),
        NudgeEvent::BurstSpawned { burst, .. } => format!(
            "burst {} with {} particles at ({:.0}, {:.0})",
            burst.id,
            burst.particles.len(),
            burst.origin_x,
            burst.origin_y
        ),
        NudgeEvent::BurstExpired { burst_id, .. } => format!("burst {burst_id} cleared"),
        NudgeEvent::TargetActionDue { url, .. } => format!("open {url}"),
        NudgeEvent::MilestoneReached { milestone, .. } => format!("milestone {milestone} reached"),
        NudgeEvent::SessionReset { baseline, .. } => format!("session reset at {baseline}"),
    }
}

pub fn run(args: SimulateArgs) -> Result<()> {
    Simulation::new(args)?.run()
}
