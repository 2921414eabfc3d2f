//! Particle effects for a visible nudge.
//!
//! The engine only generates particle parameters; hosts render them. Every
//! particle and burst carries its own expiry, and the containers drop them
//! once the clock passes it.

mod engine;
mod layer;

pub use engine::{ParticleConfig, ParticleEffectEngine, BURST_GLYPHS};
pub use layer::{AmbientParticle, Burst, BurstLayer, BurstParticle, ParticleLayer};
