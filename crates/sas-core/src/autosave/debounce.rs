//! Per-document debounce timers.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Coalesces change events into one delayed trigger per key.
///
/// Holds at most one pending deadline per key. Every change replaces the
/// key's deadline with `now + delay`, so a burst of edits fires once,
/// `delay` after the last edit. The scheduler does not own a clock: the
/// host passes `now` in and drains due keys from its idle tick with
/// [`poll_due`](Self::poll_due).
#[derive(Debug, Clone)]
pub struct DebounceScheduler<K> {
    delay: Duration,
    pending: HashMap<K, Instant>,
}

impl<K> DebounceScheduler<K>
where
    K: Eq + Hash + Clone,
{
    /// Create a scheduler with no pending timers.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay for timers started from now on.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Record a change for `key` at `now`.
    ///
    /// Returns `true` if a pending timer was cancelled and replaced.
    pub fn on_document_changed(&mut self, key: K, now: Instant) -> bool {
        self.pending.insert(key, now + self.delay).is_some()
    }

    /// Cancel the pending timer for `key`, if any.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Cancel every pending timer whose key matches `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|key, _| !predicate(key));
        before - self.pending.len()
    }

    #[inline]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// When the timer for `key` fires.
    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.pending.get(key).copied()
    }

    /// Earliest pending deadline, for hosts that sleep until the next timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn poll_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (key.clone(), *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);

        for (key, _) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_collapses_to_one_firing_after_last_edit() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(500));

        assert!(!scheduler.on_document_changed("doc", t0));
        assert!(scheduler.on_document_changed("doc", t0 + ms(100)));
        assert!(scheduler.on_document_changed("doc", t0 + ms(200)));
        assert!(scheduler.on_document_changed("doc", t0 + ms(490)));
        assert_eq!(scheduler.pending_count(), 1);

        // Nothing fires at the deadlines of the replaced timers
        assert!(scheduler.poll_due(t0 + ms(500)).is_empty());
        assert!(scheduler.poll_due(t0 + ms(700)).is_empty());
        assert!(scheduler.poll_due(t0 + ms(989)).is_empty());

        assert_eq!(scheduler.poll_due(t0 + ms(990)), vec!["doc"]);
        assert!(!scheduler.is_pending(&"doc"));
        assert!(scheduler.poll_due(t0 + ms(5000)).is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(500));

        scheduler.on_document_changed(1, t0);
        scheduler.on_document_changed(2, t0 + ms(300));

        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(500)));
        assert_eq!(scheduler.poll_due(t0 + ms(600)), vec![1]);
        assert_eq!(scheduler.poll_due(t0 + ms(800)), vec![2]);
    }

    #[test]
    fn test_due_keys_come_out_earliest_first() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(100));

        scheduler.on_document_changed('c', t0 + ms(20));
        scheduler.on_document_changed('a', t0);
        scheduler.on_document_changed('b', t0 + ms(10));

        assert_eq!(scheduler.poll_due(t0 + ms(1000)), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel_on_teardown() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(500));

        scheduler.on_document_changed("doc", t0);
        assert!(scheduler.cancel(&"doc"));
        assert!(!scheduler.cancel(&"doc"));
        assert!(scheduler.poll_due(t0 + ms(1000)).is_empty());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_cancel_where() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(500));
        scheduler.on_document_changed((1, 10), t0);
        scheduler.on_document_changed((1, 11), t0);
        scheduler.on_document_changed((2, 20), t0);

        assert_eq!(scheduler.cancel_where(|(window, _)| *window == 1), 2);
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.is_pending(&(2, 20)));
    }

    #[test]
    fn test_set_delay_applies_to_new_events() {
        let t0 = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(500));
        scheduler.on_document_changed("a", t0);
        scheduler.set_delay(ms(50));
        scheduler.on_document_changed("b", t0);

        assert_eq!(scheduler.deadline(&"a"), Some(t0 + ms(500)));
        assert_eq!(scheduler.deadline(&"b"), Some(t0 + ms(50)));
    }
}
