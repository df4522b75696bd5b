//! Per-session tracking of failed loads.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

/// Counts consecutive decode failures per session id.
///
/// Entries are created on the first failure and removed once the session
/// loads again or is deleted after exhausting its attempts. The tracker is
/// owned by a store instance and lives only in memory.
#[derive(Debug, Default)]
pub struct QuarantineTracker {
    failures: DashMap<String, AtomicU32>,
}

impl QuarantineTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current failure count for `id`, 0 if untracked.
    pub fn attempts(&self, id: &str) -> u32 {
        self.failures
            .get(id)
            .map(|count| count.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Records one more failure for `id` and returns the new count.
    pub fn record_failure(&self, id: &str) -> u32 {
        if let Some(count) = self.failures.get(id) {
            return count.fetch_add(1, Ordering::AcqRel) + 1;
        }
        let count = self
            .failures
            .entry(id.to_string())
            .or_insert_with(|| AtomicU32::new(0));
        count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Forgets the failures of `id`, after it loaded or was deleted.
    pub fn clear(&self, id: &str) {
        self.failures.remove(id);
    }

    /// Whether `id` has used up its attempts.
    ///
    /// A `max_attempts` of zero or less disables quarantine entirely.
    pub fn exhausted(&self, id: &str, max_attempts: i32) -> bool {
        max_attempts > 0 && i64::from(self.attempts(id)) >= i64::from(max_attempts)
    }

    /// Ids currently carrying at least one failure.
    pub fn ids(&self) -> HashSet<String> {
        self.failures.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Forgets every failure, as on store start and stop.
    pub fn reset(&self) {
        self.failures.clear();
    }
}
