//! # Runtime events emitted by scheduler runs.
//!
//! The [`EventKind`] enum classifies event types across the run lifecycle:
//! - **Calibration events**: reference-time fetches (succeeded, unavailable)
//! - **Waiting events**: progress narration while approaching the target
//! - **Firing events**: burst dispatch and per-attempt resolutions
//! - **Terminal events**: run completed or cancelled
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! name, attempt index, remaining delay, and verbatim response text.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Concurrent attempts during Firing may interleave, but `seq`
//! restores the order in which their resolutions were published.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run lifecycle ===
    /// Run admitted; calibration is about to begin.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: formatted target instant
    RunStarting,

    /// Run finished: every attempt of the burst has resolved.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `attempt`: burst size
    RunCompleted,

    /// Run observed cancellation while calibrating or waiting.
    ///
    /// Sets:
    /// - `task`: task name
    RunCancelled,

    // === Calibration ===
    /// A reference-time fetch succeeded and the clock pair was replaced.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: formatted reference instant
    Calibrated,

    /// A reference-time fetch failed; the run keeps its last good estimate
    /// (or, before the first success, retries after the fixed backoff).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: failure description
    /// - `delay_ms`: retry backoff (initial calibration only)
    CalibrationFailed,

    // === Waiting ===
    /// Periodic narration of the remaining delay.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `delay_ms`: remaining delay until the target instant
    WaitProgress,

    // === Firing ===
    /// The burst is being dispatched.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `attempt`: burst size
    FiringStarted,

    /// One attempt of the burst resolved (delivered or failed).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `attempt`: 1-based attempt index
    /// - `reason`: verbatim response text or failure description
    AttemptResolved,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Attempt index or burst size, depending on the kind.
    pub attempt: Option<u32>,
    /// Remaining delay or retry backoff in milliseconds.
    pub delay_ms: Option<u64>,
    /// Human-readable detail (response text, failure description, instants).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt index or burst size.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u64::MAX)) as u64;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable detail string.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True if this event ends a run (completed or cancelled).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::RunCompleted | EventKind::RunCancelled)
    }

    /// Renders the event as one human-readable line for the message log.
    pub fn render(&self) -> String {
        let task = self.task.as_deref().unwrap_or("?");
        match self.kind {
            EventKind::RunStarting => {
                format!(
                    "[{task}] run started, target {}",
                    self.reason.as_deref().unwrap_or("?")
                )
            }
            EventKind::RunCompleted => {
                format!(
                    "[{task}] run completed, all {} attempts resolved",
                    self.attempt.unwrap_or(0)
                )
            }
            EventKind::RunCancelled => format!("[{task}] run cancelled"),
            EventKind::Calibrated => {
                format!(
                    "[{task}] calibrated, reference time {}",
                    self.reason.as_deref().unwrap_or("?")
                )
            }
            EventKind::CalibrationFailed => match self.delay_ms {
                Some(ms) => format!(
                    "[{task}] reference time unavailable ({}), retrying in {ms}ms",
                    self.reason.as_deref().unwrap_or("?")
                ),
                None => format!(
                    "[{task}] reference time unavailable ({}), keeping last estimate",
                    self.reason.as_deref().unwrap_or("?")
                ),
            },
            EventKind::WaitProgress => {
                format!(
                    "[{task}] {:.1}s remaining",
                    self.delay_ms.unwrap_or(0) as f64 / 1000.0
                )
            }
            EventKind::FiringStarted => {
                format!(
                    "[{task}] firing {} concurrent attempts",
                    self.attempt.unwrap_or(0)
                )
            }
            EventKind::AttemptResolved => {
                format!(
                    "[{task}] attempt {}: {}",
                    self.attempt.unwrap_or(0),
                    self.reason.as_deref().unwrap_or("?")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::WaitProgress);
        let b = Event::now(EventKind::WaitProgress);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_sets_fields() {
        let ev = Event::now(EventKind::AttemptResolved)
            .with_task("t1")
            .with_attempt(3)
            .with_reason("ok");
        assert_eq!(ev.task.as_deref(), Some("t1"));
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("ok"));
    }

    #[test]
    fn test_render_attempt_line_is_verbatim() {
        let ev = Event::now(EventKind::AttemptResolved)
            .with_task("t1")
            .with_attempt(2)
            .with_reason(r#"{"retcode":0}"#);
        assert_eq!(ev.render(), r#"[t1] attempt 2: {"retcode":0}"#);
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Event::now(EventKind::RunCompleted).is_terminal());
        assert!(Event::now(EventKind::RunCancelled).is_terminal());
        assert!(!Event::now(EventKind::FiringStarted).is_terminal());
    }
}
