//! Cancellable one-shot timer slots.
//!
//! There is no background thread. A slot is a deadline record; the owner
//! checks it from its `tick()` and fires it when the wall clock has passed
//! `due_at_ms`. Periodic timers are one-shot slots re-armed on every firing.
//!
//! ## Invariant
//!
//! A slot holds at most one pending handle. [`TimerSlot::arm`] always cancels
//! the previous handle before storing the new one, so re-arming can never leak
//! a second outstanding timer.

use serde::{Deserialize, Serialize};

/// A scheduled firing. Ids are unique per [`TimerIds`] allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerHandle {
    pub id: u64,
    pub due_at_ms: u64,
}

/// Monotonic handle id allocator.
#[derive(Debug, Clone, Default)]
pub struct TimerIds {
    next: u64,
}

impl TimerIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    pending: Option<TimerHandle>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot for `due_at_ms`, cancelling whatever was pending.
    ///
    /// Returns the new handle and the handle it replaced, if any.
    pub fn arm(&mut self, ids: &mut TimerIds, due_at_ms: u64) -> (TimerHandle, Option<TimerHandle>) {
        let replaced = self.cancel();
        let handle = TimerHandle {
            id: ids.next_id(),
            due_at_ms,
        };
        self.pending = Some(handle);
        (handle, replaced)
    }

    /// Cancel the pending handle. No-op on an empty slot.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending handle, if armed.
    pub fn due_at_ms(&self) -> Option<u64> {
        self.pending.map(|h| h.due_at_ms)
    }

    /// Remove and return the handle if it is due at `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Option<TimerHandle> {
        match self.pending {
            Some(handle) if handle.due_at_ms <= now_ms => self.pending.take(),
            _ => None,
        }
    }
}
