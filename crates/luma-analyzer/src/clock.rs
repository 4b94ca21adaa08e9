//! Millisecond clocks used to timestamp frame arrival

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of frame arrival timestamps (milliseconds)
pub trait Clock: Send {
    fn now_ms(&self) -> i64;
}

/// Wall clock (milliseconds since the Unix epoch)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Clock that advances a fixed step on every reading.
///
/// Used to replay recorded or synthetic frames at a nominal rate without
/// depending on how fast they are actually delivered.
#[derive(Debug)]
pub struct SteppedClock {
    next: AtomicI64,
    step_ms: i64,
}

impl SteppedClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            next: AtomicI64::new(start_ms),
            step_ms,
        }
    }

    /// Clock stepping at the frame period of `fps`
    pub fn at_fps(start_ms: i64, fps: f64) -> Self {
        let step = if fps > 0.0 { (1000.0 / fps).round() as i64 } else { 0 };
        Self::new(start_ms, step.max(1))
    }
}

impl Clock for SteppedClock {
    fn now_ms(&self) -> i64 {
        self.next.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(100);
        let other = clock.clone();

        other.advance(50);
        assert_eq!(clock.now_ms(), 150);

        clock.set(10);
        assert_eq!(other.now_ms(), 10);
    }

    #[test]
    fn test_stepped_clock() {
        let clock = SteppedClock::new(1000, 33);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(clock.now_ms(), 1033);
        assert_eq!(clock.now_ms(), 1066);
    }

    #[test]
    fn test_stepped_clock_at_fps() {
        let clock = SteppedClock::at_fps(0, 30.0);
        clock.now_ms();
        assert_eq!(clock.now_ms(), 33);
    }

    #[test]
    fn test_system_clock_is_positive() {
        assert!(SystemClock.now_ms() > 0);
    }
}
