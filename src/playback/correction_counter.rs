//! Audio resync counting
//!
//! Counts drift corrections inside a rolling window to detect a correction
//! feedback loop (audio repeatedly resynced without ever settling).

use std::time::{Duration, Instant};

/// Window after which a correction starts a fresh count
pub const CORRECTION_WINDOW: Duration = Duration::from_millis(1000);

/// Corrections tolerated inside one window
pub const CORRECTION_LIMIT: u32 = 10;

/// Rolling counter of drift corrections
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectionCounter {
    /// Corrections in the current window
    count: u32,
    /// Time of the last counted correction
    last: Option<Instant>,
}

impl CorrectionCounter {
    /// Create an empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a correction made at `now`.
    ///
    /// Starts over if the previous one is older than [`CORRECTION_WINDOW`].
    /// Returns the count including this correction.
    pub fn record(&mut self, now: Instant) -> u32 {
        let stale = self
            .last
            .map_or(true, |last| now.saturating_duration_since(last) > CORRECTION_WINDOW);
        if stale {
            self.count = 0;
        }
        self.count += 1;
        self.last = Some(now);
        self.count
    }

    /// Whether the count went past [`CORRECTION_LIMIT`]
    pub fn exceeded(&self) -> bool {
        self.count > CORRECTION_LIMIT
    }

    /// Current count
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Reset the count, keeping the last correction time
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_within_window() {
        let t0 = Instant::now();
        let mut counter = CorrectionCounter::new();
        assert_eq!(counter.count(), 0);

        for i in 0..5 {
            counter.record(t0 + Duration::from_millis(i * 100));
        }
        assert_eq!(counter.count(), 5);
        assert!(!counter.exceeded());
    }

    #[test]
    fn test_gap_restarts_count() {
        let t0 = Instant::now();
        let mut counter = CorrectionCounter::new();
        counter.record(t0);
        counter.record(t0 + Duration::from_millis(500));

        assert_eq!(counter.record(t0 + Duration::from_millis(1600)), 1);
    }

    #[test]
    fn test_limit() {
        let t0 = Instant::now();
        let mut counter = CorrectionCounter::new();
        for i in 0..=CORRECTION_LIMIT {
            counter.record(t0 + Duration::from_millis(u64::from(i) * 16));
        }
        assert!(counter.exceeded());

        counter.reset();
        assert_eq!(counter.count(), 0);
    }
}
