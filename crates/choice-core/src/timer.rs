#![forbid(unsafe_code)]

//! Named, time-injected timers.
//!
//! A [`TimerSet`] is a map from an explicit key enum to a deadline. Arming a
//! key that is already pending replaces its deadline, which is exactly the
//! debounce behaviour the widgets need: a burst of structural changes keeps
//! pushing the rebuild out, and each keystroke pushes out the search-buffer
//! reset. Keys are independent, so re-arming one never cancels another.
//!
//! Time is never read from the clock here. Callers pass `now` into every
//! method, so the whole engine stays deterministic under test.
//!
//! # Example
//!
//! ```
//! use choice_core::timer::TimerSet;
//! use web_time::{Duration, Instant};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Key { Rebuild, Search }
//!
//! let mut timers = TimerSet::new();
//! let t0 = Instant::now();
//! timers.arm(Key::Search, t0, Duration::from_millis(600));
//! timers.arm(Key::Rebuild, t0, Duration::from_millis(5));
//!
//! assert_eq!(timers.take_expired(t0 + Duration::from_millis(10)), vec![Key::Rebuild]);
//! assert!(timers.is_pending(Key::Search));
//! ```

use std::hash::Hash;

use ahash::AHashMap;
use web_time::{Duration, Instant};

/// A set of named one-shot timers.
#[derive(Debug, Clone)]
pub struct TimerSet<K> {
    deadlines: AHashMap<K, Instant>,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self {
            deadlines: AHashMap::new(),
        }
    }
}

impl<K> TimerSet<K>
where
    K: Copy + Eq + Hash + Ord,
{
    /// Create an empty timer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire `delay` after `now`.
    ///
    /// Returns `true` if a pending timer with the same key was replaced.
    pub fn arm(&mut self, key: K, now: Instant, delay: Duration) -> bool {
        self.deadlines.insert(key, now + delay).is_some()
    }

    /// Cancel `key`. Returns `true` if it was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    /// Whether `key` is armed.
    #[must_use]
    pub fn is_pending(&self, key: K) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Deadline of `key`, if armed.
    #[must_use]
    pub fn deadline(&self, key: K) -> Option<Instant> {
        self.deadlines.get(&key).copied()
    }

    /// Earliest pending deadline, for hosts that schedule a wake-up.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().copied().min()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether no timer is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Remove and return every key whose deadline is at or before `now`.
    ///
    /// Keys come back ordered by deadline, ties broken by key order, so the
    /// firing order is deterministic.
    pub fn take_expired(&mut self, now: Instant) -> Vec<K> {
        let mut expired: Vec<(Instant, K)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        if expired.is_empty() {
            return Vec::new();
        }
        expired.sort();
        for (_, key) in &expired {
            self.deadlines.remove(key);
        }
        expired.into_iter().map(|(_, key)| key).collect()
    }
}
