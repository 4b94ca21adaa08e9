//! Timestamp Window Implementation

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default window bound (frames)
pub const DEFAULT_CAPACITY: usize = 8;

/// Bounded window of millisecond timestamps, ordered newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampWindow {
    /// Timestamps, front = newest
    entries: VecDeque<i64>,
    /// Window bound
    capacity: usize,
    /// Total timestamps pushed (for statistics)
    total_pushed: u64,
}

impl TimestampWindow {
    /// Create a new window with the given bound.
    ///
    /// A bound below 2 would evict every timestamp on push.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "Window capacity must be >= 2");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_pushed: 0,
        }
    }

    /// Create a window with the default bound (8 timestamps)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a timestamp as the newest entry.
    ///
    /// Entries are evicted from the back while the window holds `capacity` or
    /// more timestamps, so after a push the window holds at most
    /// `capacity - 1` entries. Returns the number of evicted timestamps.
    pub fn push(&mut self, timestamp_ms: i64) -> usize {
        self.entries.push_front(timestamp_ms);
        self.total_pushed += 1;

        let mut evicted = 0;
        while self.entries.len() >= self.capacity {
            self.entries.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Most recent timestamp
    pub fn newest(&self) -> Option<i64> {
        self.entries.front().copied()
    }

    /// Oldest retained timestamp
    pub fn oldest(&self) -> Option<i64> {
        self.entries.back().copied()
    }

    /// Time covered by the window (newest - oldest), in milliseconds
    pub fn span_ms(&self) -> Option<i64> {
        Some(self.newest()? - self.oldest()?)
    }

    /// Number of timestamps currently retained
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Window bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().copied()
    }

    /// Total timestamps ever pushed
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Clear the window
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TimestampWindow {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_newest_first() {
        let mut window = TimestampWindow::new(8);

        for ts in [100, 200, 300] {
            window.push(ts);
        }

        assert_eq!(window.len(), 3);
        assert_eq!(window.newest(), Some(300));
        assert_eq!(window.oldest(), Some(100));
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![300, 200, 100]);
    }

    #[test]
    fn test_evicts_at_bound() {
        let mut window = TimestampWindow::new(8);

        for i in 0..7 {
            assert_eq!(window.push(i * 10), 0);
        }
        assert_eq!(window.len(), 7);

        // Eighth push reaches the bound and drops the oldest
        assert_eq!(window.push(70), 1);
        assert_eq!(window.len(), 7);
        assert_eq!(window.oldest(), Some(10));
        assert_eq!(window.span_ms(), Some(60));
    }

    #[test]
    fn test_empty_window() {
        let window = TimestampWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.span_ms(), None);
        assert_eq!(window.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_clear_keeps_statistics() {
        let mut window = TimestampWindow::new(4);
        window.push(1);
        window.push(2);
        window.clear();

        assert!(window.is_empty());
        assert_eq!(window.total_pushed(), 2);
    }

    proptest! {
        #[test]
        fn prop_window_bounded_and_ordered(
            capacity in 2usize..32,
            deltas in proptest::collection::vec(0i64..500, 0..200),
        ) {
            let mut window = TimestampWindow::new(capacity);
            let mut now = 0i64;
            let mut pushed = Vec::new();

            for delta in deltas {
                now += delta;
                window.push(now);
                pushed.push(now);

                prop_assert!(window.len() <= capacity);
                prop_assert_eq!(window.newest(), Some(now));

                // Retained entries are exactly the most recent pushes, newest first
                let expected: Vec<i64> = pushed.iter().rev().take(window.len()).copied().collect();
                prop_assert_eq!(window.iter().collect::<Vec<_>>(), expected);
            }
        }
    }
}
