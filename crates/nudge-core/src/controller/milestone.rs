use serde::{Deserialize, Serialize};

use crate::stats::StatsResponse;

/// One observation of the host's running activity total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySignal {
    pub count: u64,
}

impl From<&StatsResponse> for ActivitySignal {
    fn from(stats: &StatsResponse) -> Self {
        Self {
            count: stats.total_messages,
        }
    }
}

/// Session-scoped milestone tracking.
///
/// `last_milestone` only moves up, except when the host reports a smaller
/// count than before; the state is then rebased on the new count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneState {
    pub previous_count: u64,
    /// Greatest milestone already celebrated this session.
    pub last_milestone: u64,
    /// False until the first signal of the session has been seen.
    pub initialized: bool,
}

impl MilestoneState {
    /// Take `count` as the new baseline without celebrating anything at or
    /// below it.
    pub fn rebase(&mut self, count: u64, step: u64) {
        self.previous_count = count;
        self.last_milestone = milestone_for(count, step);
        self.initialized = true;
    }
}

/// Greatest multiple of `step` not above `count`.
pub fn milestone_for(count: u64, step: u64) -> u64 {
    if step == 0 {
        return 0;
    }
    count / step * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_rounds_down() {
        assert_eq!(milestone_for(0, 100), 0);
        assert_eq!(milestone_for(99, 100), 0);
        assert_eq!(milestone_for(100, 100), 100);
        assert_eq!(milestone_for(250, 100), 200);
        assert_eq!(milestone_for(250, 0), 0);
    }

    #[test]
    fn rebase_sets_baseline() {
        let mut state = MilestoneState::default();
        state.rebase(120, 100);
        assert_eq!(
            state,
            MilestoneState {
                previous_count: 120,
                last_milestone: 100,
                initialized: true,
            }
        );
    }

    #[test]
    fn signal_from_stats() {
        let stats = StatsResponse {
            total_messages: 77,
            rendered_messages: 20,
            memory_saved_percent: 10.0,
            enabled: true,
        };
        assert_eq!(ActivitySignal::from(&stats).count, 77);
    }
}
