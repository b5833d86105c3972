//! # Run status.
//!
//! One value per run, published through a `watch` channel so `status()` reads
//! are non-blocking snapshots. This replaces the process-wide "is task
//! running" boolean the problem domain tends to grow: every run owns its own
//! status and runs never contend.

/// Externally observable state of one scheduler run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// No run with this name is known.
    NotRunning,
    /// Fetching the first reference time; no delay decision yet.
    Calibrating,
    /// Approaching the target instant.
    Waiting {
        /// Seconds until the target, per the last corrected-time reading.
        eta_secs: u64,
    },
    /// The burst is in flight; cancellation is no longer observed.
    Firing,
    /// Every attempt resolved. Terminal.
    Completed,
    /// Cancellation observed while calibrating or waiting. Terminal.
    Cancelled,
}

impl RunStatus {
    /// True once the run has released its resources.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(!RunStatus::Firing.is_terminal());
        assert!(!RunStatus::Waiting { eta_secs: 3 }.is_terminal());
        assert!(!RunStatus::NotRunning.is_terminal());
    }
}
