use serde::{Deserialize, Serialize};

/// A decorative particle drifting up from the bottom of the notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientParticle {
    pub id: u64,
    pub glyph: String,
    /// Horizontal position as a percentage of the container width.
    pub left_pct: u8,
    pub size_px: u8,
    pub lifetime_ms: u64,
    pub born_at_ms: u64,
    pub expires_at_ms: u64,
}

/// One particle of a radial burst. Offsets are the end point relative to the
/// burst origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstParticle {
    pub label: String,
    pub font_size_px: u8,
    /// Text labels render bold; glyphs do not.
    pub bold: bool,
    pub angle_rad: f64,
    pub dx: f64,
    pub dy: f64,
    pub rotation_deg: f64,
    pub duration_ms: u64,
}

/// A one-shot radial burst. The whole container goes away at `expires_at_ms`,
/// which is later than any particle's own duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub id: u64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub particles: Vec<BurstParticle>,
    pub started_at_ms: u64,
    pub expires_at_ms: u64,
}

/// Container for the ambient particles of one notification instance.
#[derive(Debug, Clone, Default)]
pub struct ParticleLayer {
    particles: Vec<AmbientParticle>,
}

impl ParticleLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, particle: AmbientParticle) {
        self.particles.push(particle);
    }

    /// Drop particles whose lifetime has elapsed. Returns how many were removed.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.expires_at_ms > now_ms);
        before - self.particles.len()
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Live bursts. Independent of any notification instance, since a burst
/// outlives the notice it was spawned from.
#[derive(Debug, Clone, Default)]
pub struct BurstLayer {
    bursts: Vec<Burst>,
}

impl BurstLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, burst: Burst) {
        self.bursts.push(burst);
    }

    /// Remove expired bursts and return their ids.
    pub fn prune(&mut self, now_ms: u64) -> Vec<u64> {
        let mut removed = Vec::new();
        self.bursts.retain(|b| {
            if b.expires_at_ms <= now_ms {
                removed.push(b.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }
}
