//! Cancellable debounce timers.
//!
//! One pending deadline per [`TimerKey`]: scheduling under a key that already
//! has a pending deadline replaces it, so a burst of triggers collapses into
//! the single run that fires once the burst goes quiet. Trigger classes use
//! independent keys; a reconcile burst never delays a pending
//! re-initialization or vice versa.

use std::collections::BTreeMap;

/// Debounce window for mutation-driven reconciliation.
pub const RECONCILE_DEBOUNCE_MILLIS: i64 = 500;

/// Delay before a tab-switch-driven full re-initialization.
pub const REINIT_DELAY_MILLIS: i64 = 1000;

/// Independent trigger classes, one pending timer each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKey {
    /// Recompute visibility over the current card set.
    Reconcile,
    /// Tear down and rebuild the whole overlay.
    Reinitialize,
}

/// The pending-timer table.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: BTreeMap<TimerKey, i64>,
}

impl Debouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire at `now_millis + delay_millis`, cancelling any
    /// deadline already pending under the same key.
    pub fn schedule(&mut self, key: TimerKey, now_millis: i64, delay_millis: i64) {
        self.pending
            .insert(key, now_millis.saturating_add(delay_millis));
    }

    /// Cancel the pending deadline for `key`, if any.
    pub fn cancel(&mut self, key: TimerKey) {
        self.pending.remove(&key);
    }

    /// Cancel every pending deadline.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Whether `key` has a pending deadline.
    #[must_use]
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Number of pending deadlines.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drain every key whose deadline has elapsed at `now_millis`, ordered by
    /// deadline then key.
    pub fn due(&mut self, now_millis: i64) -> Vec<TimerKey> {
        let mut elapsed: Vec<(i64, TimerKey)> = self
            .pending
            .iter()
            .filter(|&(_, &deadline)| deadline <= now_millis)
            .map(|(&key, &deadline)| (deadline, key))
            .collect();
        elapsed.sort_unstable();

        for &(_, key) in &elapsed {
            self.pending.remove(&key);
        }
        elapsed.into_iter().map(|(_, key)| key).collect()
    }
}
