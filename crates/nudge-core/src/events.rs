use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::particles::{AmbientParticle, Burst};
use crate::timer::TimerHandle;

/// Why a nudge was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NudgeTrigger {
    /// First observation of a session already past the activity floor.
    LateTrigger,
    /// Activity crossed the floor from below.
    Threshold,
    /// Activity reached a new multiple of the milestone step.
    Milestone { milestone: u64 },
    /// `show` called directly by the host.
    Direct,
}

/// Why a requested nudge was not presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SuppressReason {
    AlreadyVisible,
    Throttled { remaining_ms: u64 },
    NoRenderTarget,
    BelowActivityFloor { count: u64 },
    Disabled,
}

/// Why a nudge started hiding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideReason {
    AutoClose,
    PrimaryAction,
    Dismissed,
    Forced,
}

/// Every state change in the nudge system produces an Event.
/// Hosts drain them after each call and render accordingly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NudgeEvent {
    NudgeShown {
        instance_id: u64,
        trigger: NudgeTrigger,
        header: Option<String>,
        body: String,
        at: DateTime<Utc>,
    },
    NudgeSuppressed {
        trigger: NudgeTrigger,
        reason: SuppressReason,
        at: DateTime<Utc>,
    },
    /// Entrance transition finished; the notice was interactive before this.
    EntranceCompleted {
        instance_id: u64,
        at: DateTime<Utc>,
    },
    AutoCloseArmed {
        instance_id: u64,
        timer: TimerHandle,
        replaced: Option<TimerHandle>,
        at: DateTime<Utc>,
    },
    AutoCloseCancelled {
        instance_id: u64,
        timer: TimerHandle,
        at: DateTime<Utc>,
    },
    AmbientSpawned {
        instance_id: u64,
        particle: AmbientParticle,
        at: DateTime<Utc>,
    },
    /// Exit transition started. The notice is no longer visible.
    NudgeHidden {
        instance_id: u64,
        reason: HideReason,
        at: DateTime<Utc>,
    },
    /// Exit transition finished; the notice is gone.
    NudgeDetached {
        instance_id: u64,
        at: DateTime<Utc>,
    },
    BurstSpawned {
        burst: Burst,
        at: DateTime<Utc>,
    },
    BurstExpired {
        burst_id: u64,
        at: DateTime<Utc>,
    },
    /// Host should now perform the nudge's target action (open the link).
    TargetActionDue {
        url: String,
        at: DateTime<Utc>,
    },
    MilestoneReached {
        milestone: u64,
        at: DateTime<Utc>,
    },
    /// Activity regressed or the host reset the session.
    SessionReset {
        baseline: u64,
        at: DateTime<Utc>,
    },
}

impl NudgeEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            NudgeEvent::NudgeShown { at, .. }
            | NudgeEvent::NudgeSuppressed { at, .. }
            | NudgeEvent::EntranceCompleted { at, .. }
            | NudgeEvent::AutoCloseArmed { at, .. }
            | NudgeEvent::AutoCloseCancelled { at, .. }
            | NudgeEvent::AmbientSpawned { at, .. }
            | NudgeEvent::NudgeHidden { at, .. }
            | NudgeEvent::NudgeDetached { at, .. }
            | NudgeEvent::BurstSpawned { at, .. }
            | NudgeEvent::BurstExpired { at, .. }
            | NudgeEvent::TargetActionDue { at, .. }
            | NudgeEvent::MilestoneReached { at, .. }
            | NudgeEvent::SessionReset { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = NudgeEvent::NudgeSuppressed {
            trigger: NudgeTrigger::Milestone { milestone: 200 },
            reason: SuppressReason::Throttled { remaining_ms: 1_000 },
            at: DateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "NudgeSuppressed");
        assert_eq!(json["trigger"]["kind"], "milestone");
        assert_eq!(json["trigger"]["milestone"], 200);
        assert_eq!(json["reason"]["reason"], "throttled");
        assert_eq!(json["reason"]["remaining_ms"], 1_000);
    }
}
