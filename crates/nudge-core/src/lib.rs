//! # Nudge Core Library
//!
//! This library decides when to show a transient "support us" nudge to a user
//! of a host application, and runs that nudge's lifecycle once shown. Hosts
//! feed it a running activity count and render the events it emits.
//!
//! ## Architecture
//!
//! - **Controller**: Milestone and threshold policy over the activity stream
//! - **Presentation**: The single notification slot, its timers and the
//!   shared throttle gate. Wall-clock based; the caller invokes `tick()`
//! - **Particles**: Ambient and burst effect generation
//! - **Throttle**: Durable "last shown" record behind a store trait
//! - **Storage**: TOML configuration and data directory
//!
//! ## Key Components
//!
//! - [`NudgeController`]: Activity policy state machine
//! - [`PresentationLifecycle`]: Notification slot and timers
//! - [`ParticleEffectEngine`]: Particle generation
//! - [`ThrottleStore`]: Trait for the durable throttle record
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod particles;
pub mod presentation;
pub mod stats;
pub mod storage;
pub mod throttle;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ActivitySignal, MilestoneState, NudgeController};
pub use error::{ConfigError, CoreError, MessagingError, StorageError};
pub use events::{HideReason, NudgeEvent, NudgeTrigger, SuppressReason};
pub use particles::{ParticleConfig, ParticleEffectEngine};
pub use presentation::{Frame, NotificationInstance, Phase, PresentationLifecycle, RenderTarget, StaticTarget};
pub use stats::{fetch_stats, StatsRequest, StatsResponse, StatsSource, StatsView};
pub use storage::Config;
pub use throttle::{FileThrottleStore, MemoryThrottleStore, Throttle, ThrottleDecision, ThrottleStore};
