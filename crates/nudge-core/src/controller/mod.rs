//! Milestone and threshold policy.
//!
//! The controller turns a stream of activity counts into nudge attempts. All
//! attempts go through one path, and the presentation lifecycle's throttle
//! gate makes the final call.

mod milestone;
mod nudge;

pub use milestone::{milestone_for, ActivitySignal, MilestoneState};
pub use nudge::NudgeController;
