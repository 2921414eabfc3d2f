//! The single notification slot and its timers.
//!
//! ## State Transitions
//!
//! ```text
//! absent -> Entering -> Shown -> Fading -> absent
//!              \___________________/
//!                    visible
//! ```
//!
//! Everything timer-driven happens inside `tick()`, which the host calls
//! periodically.

mod instance;
mod lifecycle;
mod target;

pub use instance::{NotificationInstance, Phase};
pub use lifecycle::{PresentationLifecycle, MAX_PENDING_EVENTS};
pub use target::{Frame, RenderTarget, StaticTarget};
