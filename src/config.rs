//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`]: every timing constant of the runtime lives
//! here instead of being scattered across the state machine.
//!
//! ## Tier scheme
//! The distance to the target instant selects how the Waiting phase behaves:
//!
//! ```text
//! delay ≤ fire_threshold   → sleep the remainder (minus safety margin), fire
//! delay ≤ tier2_max        → re-check corrected time every tier2_interval
//! delay ≤ tier3_max        → recalibrate every tier3_interval
//! delay >  tier3_max       → recalibrate every tier4_interval
//! ```
//!
//! Tighter intervals near the target bound the local-clock drift that can
//! accumulate before the burst fires; looser intervals far from it keep the
//! time authority from being hammered over a multi-hour wait.

use std::time::Duration;

use chrono::FixedOffset;

/// What the Waiting phase should do next, given the remaining delay.
///
/// Produced by [`SchedulerConfig::wait_tier`]; consumed by the run loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitTier {
    /// Inside the fire window: sleep the remaining delay and dispatch.
    Fire,
    /// Close to the target: sleep the interval, re-check the corrected clock.
    Recheck(Duration),
    /// Far from the target: sleep the interval, then refetch reference time.
    Recalibrate(Duration),
}

/// Timing configuration for the scheduler runtime.
///
/// ## Field semantics
/// - `fire_threshold`: remaining delay at which the run commits to firing
/// - `tier2_max` / `tier2_interval`: re-check band (no network traffic)
/// - `tier3_max` / `tier3_interval`: near recalibration band
/// - `tier4_interval`: recalibration cadence beyond `tier3_max`
/// - `calibration_backoff`: retry interval while the initial fetch fails
/// - `fire_safety_margin`: subtracted from the final sleep so the burst lands
///   at-or-after the target, never before
/// - `fetch_timeout`: bound on one time-authority round trip
/// - `attempt_timeout`: bound on one claim attempt
/// - `default_count`: burst size used when a task record omits `count`
/// - `reference_offset`: fixed zone the target-time strings are expressed in
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Remaining delay at which the run stops recalibrating and fires.
    pub fire_threshold: Duration,
    /// Upper bound of the re-check band.
    pub tier2_max: Duration,
    /// Sleep granularity inside the re-check band.
    pub tier2_interval: Duration,
    /// Upper bound of the near recalibration band.
    pub tier3_max: Duration,
    /// Recalibration cadence inside the near band.
    pub tier3_interval: Duration,
    /// Recalibration cadence beyond `tier3_max`.
    pub tier4_interval: Duration,
    /// Fixed backoff between initial calibration retries.
    pub calibration_backoff: Duration,
    /// Scheduling-jitter compensation subtracted from the final sleep.
    pub fire_safety_margin: Duration,
    /// Timeout for one time-authority round trip.
    pub fetch_timeout: Duration,
    /// Timeout for one claim attempt.
    pub attempt_timeout: Duration,
    /// Burst size when a task record omits or mangles `count`.
    pub default_count: u32,
    /// Fixed zone of target-time strings in task records.
    pub reference_offset: FixedOffset,
    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl SchedulerConfig {
    /// Selects the Waiting-phase behavior for the given remaining delay.
    ///
    /// Zero or negative remaining delay maps to [`WaitTier::Fire`] (the run
    /// loop treats an already-passed target as "fire immediately").
    pub fn wait_tier(&self, delay: Duration) -> WaitTier {
        if delay <= self.fire_threshold {
            WaitTier::Fire
        } else if delay <= self.tier2_max {
            WaitTier::Recheck(self.tier2_interval)
        } else if delay <= self.tier3_max {
            WaitTier::Recalibrate(self.tier3_interval)
        } else {
            WaitTier::Recalibrate(self.tier4_interval)
        }
    }

    /// Final sleep before dispatch: remaining delay minus the safety margin.
    pub fn fire_sleep(&self, delay: Duration) -> Duration {
        delay.saturating_sub(self.fire_safety_margin)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `fire_threshold = 5s`, `tier2 = ≤60s @ 1s`, `tier3 = ≤300s @ 5s`,
    ///   `tier4 = @ 30s`
    /// - `calibration_backoff = 1s`, `fire_safety_margin = 50ms`
    /// - `fetch_timeout = 5s`, `attempt_timeout = 10s`
    /// - `default_count = 5`
    /// - `reference_offset = UTC+8` (the zone the original target times use)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            fire_threshold: Duration::from_secs(5),
            tier2_max: Duration::from_secs(60),
            tier2_interval: Duration::from_secs(1),
            tier3_max: Duration::from_secs(300),
            tier3_interval: Duration::from_secs(5),
            tier4_interval: Duration::from_secs(30),
            calibration_backoff: Duration::from_secs(1),
            fire_safety_margin: Duration::from_millis(50),
            fetch_timeout: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
            default_count: 5,
            reference_offset: FixedOffset::east_opt(8 * 3600)
                .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap()),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SchedulerConfig {
        SchedulerConfig::default()
    }

    #[test]
    fn test_zero_delay_is_fire() {
        assert_eq!(cfg().wait_tier(Duration::ZERO), WaitTier::Fire);
    }

    #[test]
    fn test_fire_threshold_boundary() {
        let c = cfg();
        assert_eq!(c.wait_tier(Duration::from_secs(5)), WaitTier::Fire);
        assert_eq!(
            c.wait_tier(Duration::from_millis(5001)),
            WaitTier::Recheck(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_recheck_band_boundary() {
        let c = cfg();
        assert_eq!(
            c.wait_tier(Duration::from_secs(60)),
            WaitTier::Recheck(Duration::from_secs(1))
        );
        assert_eq!(
            c.wait_tier(Duration::from_secs(61)),
            WaitTier::Recalibrate(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_far_band_uses_coarse_interval() {
        let c = cfg();
        assert_eq!(
            c.wait_tier(Duration::from_secs(301)),
            WaitTier::Recalibrate(Duration::from_secs(30))
        );
        assert_eq!(
            c.wait_tier(Duration::from_secs(3600)),
            WaitTier::Recalibrate(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_fire_sleep_subtracts_margin() {
        let c = cfg();
        assert_eq!(
            c.fire_sleep(Duration::from_secs(3)),
            Duration::from_secs(3) - Duration::from_millis(50)
        );
    }

    #[test]
    fn test_fire_sleep_saturates() {
        assert_eq!(cfg().fire_sleep(Duration::from_millis(10)), Duration::ZERO);
    }
}
