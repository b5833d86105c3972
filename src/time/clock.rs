//! # Drift-corrected clock.
//!
//! [`DriftClock`] pairs the last successfully fetched reference instant with
//! the local monotonic reading taken at fetch time. Corrected "now" is the
//! reference plus the monotonic delta since the fetch — no network traffic,
//! no blocking.
//!
//! ## Rules
//! - The pair is replaced in a **single assignment** under the write lock;
//!   readers can never observe a reference matched with a stale local
//!   reading.
//! - Before the first successful fetch, corrected time is undefined
//!   ([`DriftClock::corrected_now`] returns `None`) and the run loop must
//!   calibrate before any delay decision.
//! - One clock may be shared by many runs; readers only take the read lock.

use std::sync::RwLock;
use std::time::Instant;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// The atomic calibration pair.
#[derive(Clone, Copy, Debug)]
pub struct TimeEstimate {
    /// Last successfully fetched reference instant.
    pub reference: DateTime<Utc>,
    /// Local monotonic reading paired with it.
    pub at: Instant,
}

impl TimeEstimate {
    /// Reference instant advanced by the monotonic delta since the fetch.
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = ChronoDuration::from_std(self.at.elapsed())
            .unwrap_or_else(|_| ChronoDuration::zero());
        self.reference + elapsed
    }
}

/// Shared, torn-read-free holder of the current [`TimeEstimate`].
#[derive(Debug, Default)]
pub struct DriftClock {
    estimate: RwLock<Option<TimeEstimate>>,
}

impl DriftClock {
    /// Creates an uncalibrated clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the calibration pair in one assignment.
    pub fn calibrate(&self, reference: DateTime<Utc>, at: Instant) {
        let mut guard = self.estimate.write().expect("drift clock poisoned");
        *guard = Some(TimeEstimate { reference, at });
    }

    /// Pure, non-blocking corrected time; `None` before the first fetch.
    pub fn corrected_now(&self) -> Option<DateTime<Utc>> {
        self.estimate
            .read()
            .expect("drift clock poisoned")
            .map(|e| e.now())
    }

    /// True once at least one fetch has succeeded.
    pub fn is_calibrated(&self) -> bool {
        self.estimate
            .read()
            .expect("drift clock poisoned")
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_uncalibrated_clock_has_no_now() {
        let clock = DriftClock::new();
        assert!(!clock.is_calibrated());
        assert!(clock.corrected_now().is_none());
    }

    #[test]
    fn test_corrected_now_tracks_reference() {
        let clock = DriftClock::new();
        let reference = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 10).unwrap();
        clock.calibrate(reference, Instant::now());

        let now = clock.corrected_now().unwrap();
        let drift = (now - reference).num_milliseconds();
        // Immediately after calibration the correction is the reference
        // itself, within scheduling noise.
        assert!((0..100).contains(&drift), "drift was {drift}ms");
    }

    #[test]
    fn test_recalibration_replaces_pair() {
        let clock = DriftClock::new();
        let first = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap();
        clock.calibrate(first, Instant::now());
        clock.calibrate(second, Instant::now());

        let now = clock.corrected_now().unwrap();
        assert!((now - second).num_seconds() < 2);
    }
}
