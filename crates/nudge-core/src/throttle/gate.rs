use serde::{Deserialize, Serialize};

use super::store::ThrottleStore;

/// Store key of the "last shown" record.
pub const LAST_SHOWN_KEY: &str = "nudge_last_shown";

/// Minimum time between two presented nudges: 10 minutes.
pub const DEFAULT_WINDOW_MS: u64 = 10 * 60 * 1000;

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ThrottleDecision {
    Allowed,
    Limited { remaining_ms: u64 },
}

impl ThrottleDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, ThrottleDecision::Allowed)
    }
}

/// The single rate-limit gate every presentation goes through.
///
/// Storage failures never block a nudge: an unreadable record counts as "no
/// prior record" and a failed write is logged and dropped.
pub struct Throttle {
    store: Box<dyn ThrottleStore>,
    window_ms: u64,
}

impl Throttle {
    pub fn new(store: Box<dyn ThrottleStore>, window_ms: u64) -> Self {
        Self { store, window_ms }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Epoch milliseconds of the last presentation, if a readable record exists.
    pub fn last_shown_ms(&self) -> Option<u64> {
        let raw = match self.store.get(LAST_SHOWN_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "throttle record unreadable, treating as absent");
                return None;
            }
        };
        match raw.trim().parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(_) => {
                tracing::warn!(value = %raw, "malformed throttle record, treating as absent");
                None
            }
        }
    }

    pub fn check(&self, now_ms: u64) -> ThrottleDecision {
        let Some(last) = self.last_shown_ms() else {
            return ThrottleDecision::Allowed;
        };
        let elapsed = now_ms.saturating_sub(last);
        if elapsed < self.window_ms {
            ThrottleDecision::Limited {
                remaining_ms: self.window_ms - elapsed,
            }
        } else {
            ThrottleDecision::Allowed
        }
    }

    /// Persist `now_ms` as the last presentation. Best effort.
    pub fn record(&mut self, now_ms: u64) {
        if let Err(e) = self.store.set(LAST_SHOWN_KEY, &now_ms.to_string()) {
            tracing::warn!(error = %e, "failed to persist throttle record");
        }
    }

    /// Forget the last presentation.
    pub fn clear(&mut self) -> Result<(), crate::error::StorageError> {
        self.store.remove(LAST_SHOWN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::throttle::MemoryThrottleStore;

    struct BrokenStore;

    impl ThrottleStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn no_record_allows() {
        let throttle = Throttle::new(Box::new(MemoryThrottleStore::new()), DEFAULT_WINDOW_MS);
        assert_eq!(throttle.check(0), ThrottleDecision::Allowed);
    }

    #[test]
    fn within_window_is_limited() {
        let mut throttle = Throttle::new(Box::new(MemoryThrottleStore::new()), 1_000);
        throttle.record(10_000);

        assert_eq!(
            throttle.check(10_400),
            ThrottleDecision::Limited { remaining_ms: 600 }
        );
        assert_eq!(throttle.check(11_000), ThrottleDecision::Allowed);
    }

    #[test]
    fn malformed_record_counts_as_absent() {
        let mut store = MemoryThrottleStore::new();
        store.set(LAST_SHOWN_KEY, "yesterday").unwrap();
        let throttle = Throttle::new(Box::new(store), DEFAULT_WINDOW_MS);

        assert_eq!(throttle.last_shown_ms(), None);
        assert!(throttle.check(5).is_allowed());
    }

    #[test]
    fn broken_store_never_blocks() {
        let mut throttle = Throttle::new(Box::new(BrokenStore), DEFAULT_WINDOW_MS);
        throttle.record(1_000);
        assert!(throttle.check(1_001).is_allowed());
    }

    #[test]
    fn clear_removes_record() {
        let mut throttle = Throttle::new(Box::new(MemoryThrottleStore::new()), 1_000);
        throttle.record(50);
        throttle.clear().unwrap();
        assert_eq!(throttle.last_shown_ms(), None);
    }
}
