//! # MessageLog: ordered, drainable log of human-readable status lines.
//!
//! UI layers poll this surface: read everything, render it, and the log is
//! clear until new events arrive. Structured consumers should subscribe to
//! the [`Bus`](crate::Bus) instead.
//!
//! ## Rules
//! - Appends are serialized by a mutex; lines appear in publish order.
//! - `drain()` returns all accumulated lines and clears the log; a second
//!   drain with no new events yields an empty vector.
//! - No replay: once drained, lines are gone.

use std::sync::Mutex;

/// Append-only, drain-to-clear log of rendered event lines.
#[derive(Debug, Default)]
pub struct MessageLog {
    lines: Mutex<Vec<String>>,
}

impl MessageLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line.
    pub fn push(&self, line: String) {
        self.lines.lock().expect("message log poisoned").push(line);
    }

    /// Returns all accumulated lines and clears the log.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().expect("message log poisoned"))
    }

    /// Number of lines currently buffered.
    pub fn len(&self) -> usize {
        self.lines.lock().expect("message log poisoned").len()
    }

    /// True if no lines are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
