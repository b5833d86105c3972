//! Error types used by the zerohour runtime.
//!
//! This module defines two error enums:
//!
//! - [`StartError`] — synchronous rejections raised by [`Scheduler::start`](crate::Scheduler::start)
//!   before any run state is created.
//! - [`TimeError`] — failures of one time-authority round trip.
//!
//! Attempt failures are deliberately **not** an error type: the executor
//! captures them into [`AttemptOutcome::Failed`](crate::AttemptOutcome) so a
//! hung or refused attempt can never abort its siblings.

use std::time::Duration;
use thiserror::Error;

/// # Rejections raised at `start()` time.
///
/// These are the only failures a caller sees synchronously; everything that
/// happens after a run is admitted is narrated through the event stream.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StartError {
    /// The task asked for a zero-attempt burst.
    #[error("task '{name}' has repeat count 0; a burst needs at least one attempt")]
    InvalidCount {
        /// Name of the rejected task.
        name: String,
    },

    /// The task's target-time string did not parse in the reference zone.
    #[error("task '{name}' has malformed target time '{value}' (expected YYYY-MM-DD HH:MM:SS)")]
    InvalidTime {
        /// Name of the rejected task.
        name: String,
        /// The offending time string.
        value: String,
    },

    /// A run with the same name is still live (not in a terminal state).
    #[error("task '{name}' is already running")]
    AlreadyRunning {
        /// Name of the rejected task.
        name: String,
    },
}

impl StartError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StartError::InvalidCount { .. } => "start_invalid_count",
            StartError::InvalidTime { .. } => "start_invalid_time",
            StartError::AlreadyRunning { .. } => "start_already_running",
        }
    }
}

/// # Failures of one time-authority round trip.
///
/// Recovered locally by the calibration loop (fixed backoff, indefinite
/// retry); never fatal to a run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TimeError {
    /// The authority did not answer within the configured fetch timeout.
    #[error("time authority did not answer within {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Socket-level failure (resolve, bind, send, receive).
    #[error("time authority transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The authority answered, but the reply could not be trusted.
    #[error("malformed time authority reply: {reason}")]
    Malformed {
        /// What made the reply untrustworthy.
        reason: &'static str,
    },
}

impl TimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TimeError::Timeout { .. } => "time_fetch_timeout",
            TimeError::Io(_) => "time_fetch_io",
            TimeError::Malformed { .. } => "time_fetch_malformed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_error_labels() {
        let e = StartError::InvalidCount { name: "t1".into() };
        assert_eq!(e.as_label(), "start_invalid_count");
        let e = StartError::AlreadyRunning { name: "t1".into() };
        assert_eq!(e.as_label(), "start_already_running");
    }

    #[test]
    fn test_time_error_display_mentions_timeout() {
        let e = TimeError::Timeout {
            timeout: Duration::from_secs(5),
        };
        assert!(e.to_string().contains("5s"));
        assert_eq!(e.as_label(), "time_fetch_timeout");
    }
}
