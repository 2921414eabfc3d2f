//! Rate limiting across every trigger kind.
//!
//! One durable "last shown" record gates all presentations. The record lives
//! in a host-provided [`ThrottleStore`] so it survives reloads.

mod gate;
mod store;

pub use gate::{Throttle, ThrottleDecision, DEFAULT_WINDOW_MS, LAST_SHOWN_KEY};
pub use store::{FileThrottleStore, MemoryThrottleStore, ThrottleStore};
