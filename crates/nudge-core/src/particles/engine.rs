//! Randomized particle generation.
//!
//! The engine keeps no state between calls apart from its RNG and an id
//! counter. Seeding it makes every spawn reproducible.

use std::f64::consts::TAU;
use std::ops::Range;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::layer::{AmbientParticle, Burst, BurstParticle, ParticleLayer};

/// Glyphs and labels a burst draws from. Duplicates weight the draw.
pub const BURST_GLYPHS: [&str; 6] = ["❤️", "💖", "🍺", "🍺", "Thank You!", "Thank You!"];

const AMBIENT_LEFT_PCT: Range<u8> = 10..90;
const AMBIENT_SIZE_PX: Range<u8> = 12..18;
const AMBIENT_LIFETIME_MS: Range<u64> = 2_000..3_500;

const BURST_VELOCITY_PX: Range<f64> = 80.0..280.0;
const BURST_ROTATION_DEG: Range<f64> = -30.0..30.0;
const BURST_DURATION_MS: Range<u64> = 600..1_000;
const BURST_GLYPH_SIZE_PX: Range<u8> = 14..28;
const BURST_LABEL_SIZE_PX: Range<u8> = 12..16;
/// Container lifetime; must stay above `BURST_DURATION_MS.end`.
const BURST_CONTAINER_MS: u64 = 1_200;

/// Particle settings, persisted in the `[particles]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "default_burst_count")]
    pub burst_count: usize,
    #[serde(default = "default_ambient_glyph")]
    pub ambient_glyph: String,
    /// Random seed for reproducible effects (None = entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_burst_count() -> usize {
    50
}
fn default_ambient_glyph() -> String {
    "❤️".into()
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            burst_count: default_burst_count(),
            ambient_glyph: default_ambient_glyph(),
            seed: None,
        }
    }
}

pub struct ParticleEffectEngine {
    config: ParticleConfig,
    rng: Mcg128Xsl64,
    next_id: u64,
}

impl ParticleEffectEngine {
    pub fn new(config: ParticleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            config,
            rng,
            next_id: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(ParticleConfig {
            seed: Some(seed),
            ..ParticleConfig::default()
        })
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Spawn one ambient particle into `container` and return a copy of it.
    ///
    /// The container drops it on the first prune at or after its expiry.
    pub fn spawn_ambient(&mut self, container: &mut ParticleLayer, now_ms: u64) -> AmbientParticle {
        let lifetime_ms = self.rng.gen_range(AMBIENT_LIFETIME_MS);
        let particle = AmbientParticle {
            id: self.allocate_id(),
            glyph: self.config.ambient_glyph.clone(),
            left_pct: self.rng.gen_range(AMBIENT_LEFT_PCT),
            size_px: self.rng.gen_range(AMBIENT_SIZE_PX),
            lifetime_ms,
            born_at_ms: now_ms,
            expires_at_ms: now_ms + lifetime_ms,
        };
        container.attach(particle.clone());
        particle
    }

    /// Build a radial burst of `count` particles around the origin.
    pub fn spawn_burst(&mut self, origin_x: f64, origin_y: f64, count: usize, now_ms: u64) -> Burst {
        let particles = (0..count).map(|_| self.burst_particle()).collect();
        Burst {
            id: self.allocate_id(),
            origin_x,
            origin_y,
            particles,
            started_at_ms: now_ms,
            expires_at_ms: now_ms + BURST_CONTAINER_MS,
        }
    }

    fn burst_particle(&mut self) -> BurstParticle {
        let label = BURST_GLYPHS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(BURST_GLYPHS[0]);
        // Emoji are one or two chars; anything longer is a text label.
        let bold = label.chars().count() > 2;
        let font_size_px = if bold {
            self.rng.gen_range(BURST_LABEL_SIZE_PX)
        } else {
            self.rng.gen_range(BURST_GLYPH_SIZE_PX)
        };

        let angle_rad = self.rng.gen_range(0.0..TAU);
        let velocity = self.rng.gen_range(BURST_VELOCITY_PX);

        BurstParticle {
            label: label.to_string(),
            font_size_px,
            bold,
            angle_rad,
            dx: angle_rad.cos() * velocity,
            dy: angle_rad.sin() * velocity,
            rotation_deg: self.rng.gen_range(BURST_ROTATION_DEG),
            duration_ms: self.rng.gen_range(BURST_DURATION_MS),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_particle_within_bounds() {
        let mut engine = ParticleEffectEngine::with_seed(7);
        let mut layer = ParticleLayer::new();

        for i in 0..200 {
            let p = engine.spawn_ambient(&mut layer, i * 800);
            assert!(AMBIENT_LEFT_PCT.contains(&p.left_pct));
            assert!(AMBIENT_SIZE_PX.contains(&p.size_px));
            assert!(AMBIENT_LIFETIME_MS.contains(&p.lifetime_ms));
            assert_eq!(p.expires_at_ms, p.born_at_ms + p.lifetime_ms);
        }
        assert_eq!(layer.len(), 200);
    }

    #[test]
    fn burst_particles_within_bounds() {
        let mut engine = ParticleEffectEngine::with_seed(11);
        let burst = engine.spawn_burst(100.0, 200.0, 50, 5_000);

        assert_eq!(burst.particles.len(), 50);
        assert_eq!(burst.expires_at_ms, 5_000 + BURST_CONTAINER_MS);
        for p in &burst.particles {
            assert!(BURST_GLYPHS.contains(&p.label.as_str()));
            assert!((0.0..TAU).contains(&p.angle_rad));
            assert!(BURST_ROTATION_DEG.contains(&p.rotation_deg));
            assert!(p.duration_ms < BURST_CONTAINER_MS);
            let distance = (p.dx * p.dx + p.dy * p.dy).sqrt();
            assert!(distance >= BURST_VELOCITY_PX.start - 1e-9);
            assert!(distance < BURST_VELOCITY_PX.end + 1e-9);
            if p.bold {
                assert!(BURST_LABEL_SIZE_PX.contains(&p.font_size_px));
            } else {
                assert!(BURST_GLYPH_SIZE_PX.contains(&p.font_size_px));
            }
        }
    }

    #[test]
    fn seeded_engines_agree() {
        let mut a = ParticleEffectEngine::with_seed(3);
        let mut b = ParticleEffectEngine::with_seed(3);
        assert_eq!(a.spawn_burst(0.0, 0.0, 10, 0), b.spawn_burst(0.0, 0.0, 10, 0));
    }

    #[test]
    fn bursts_are_independent() {
        let mut engine = ParticleEffectEngine::with_seed(5);
        let first = engine.spawn_burst(0.0, 0.0, 5, 0);
        let second = engine.spawn_burst(10.0, 10.0, 8, 100);

        assert_ne!(first.id, second.id);
        assert_eq!(first.particles.len(), 5);
        assert_eq!(second.particles.len(), 8);
    }

    #[test]
    fn empty_burst_is_allowed() {
        let mut engine = ParticleEffectEngine::with_seed(1);
        assert!(engine.spawn_burst(0.0, 0.0, 0, 0).particles.is_empty());
    }
}
