use serde::{Deserialize, Serialize};

use super::target::Frame;
use crate::events::NudgeTrigger;
use crate::particles::ParticleLayer;
use crate::timer::TimerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Sliding in. Already interactive.
    Entering,
    Shown,
    /// Exit transition running; detached when the fade timer fires.
    Fading,
}

/// The one live notification.
///
/// Owns every timer tied to its lifetime. `hide` releases the ambient and
/// auto-close slots; only the fade slot stays armed while fading.
#[derive(Debug, Clone)]
pub struct NotificationInstance {
    pub(crate) id: u64,
    pub(crate) trigger: NudgeTrigger,
    pub(crate) header: Option<String>,
    pub(crate) body: String,
    pub(crate) frame: Frame,
    pub(crate) phase: Phase,
    pub(crate) shown_at_ms: u64,
    pub(crate) hovered: bool,
    pub(crate) auto_close: TimerSlot,
    pub(crate) ambient: TimerSlot,
    pub(crate) entrance: TimerSlot,
    pub(crate) fade: TimerSlot,
    pub(crate) particles: ParticleLayer,
}

impl NotificationInstance {
    pub(crate) fn new(
        id: u64,
        trigger: NudgeTrigger,
        header: Option<String>,
        body: String,
        frame: Frame,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            trigger,
            header,
            body,
            frame,
            phase: Phase::Entering,
            shown_at_ms: now_ms,
            hovered: false,
            auto_close: TimerSlot::new(),
            ambient: TimerSlot::new(),
            entrance: TimerSlot::new(),
            fade: TimerSlot::new(),
            particles: ParticleLayer::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn trigger(&self) -> NudgeTrigger {
        self.trigger
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn shown_at_ms(&self) -> u64 {
        self.shown_at_ms
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Visible means entering or shown; a fading notice no longer counts.
    pub fn is_visible(&self) -> bool {
        self.phase != Phase::Fading
    }

    pub fn auto_close(&self) -> &TimerSlot {
        &self.auto_close
    }

    pub fn ambient(&self) -> &TimerSlot {
        &self.ambient
    }

    pub fn fade(&self) -> &TimerSlot {
        &self.fade
    }

    pub fn particles(&self) -> &ParticleLayer {
        &self.particles
    }
}
