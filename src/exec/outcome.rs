//! # Attempt results.
//!
//! One burst produces exactly `count` [`AttemptResult`]s, one per attempt,
//! regardless of how many failed. The remote's success/failure codes are
//! business-specific and opaque to the core, so "delivered" only means a
//! response arrived; the raw text is surfaced verbatim for the event stream.

/// Resolution of one claim attempt.
#[derive(Clone, Debug)]
pub struct AttemptResult {
    /// 1-based index within the burst.
    pub index: u32,
    /// What happened to the request.
    pub outcome: AttemptOutcome,
}

/// Transport-level classification of one attempt.
#[derive(Clone, Debug)]
pub enum AttemptOutcome {
    /// A response arrived; body text is carried verbatim.
    Delivered {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// No usable response (timeout, connect error, unreadable body).
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

impl AttemptResult {
    /// True if a response arrived, whatever it said.
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Delivered { .. })
    }

    /// The line published to the event stream: verbatim body on delivery,
    /// failure description otherwise.
    pub fn text(&self) -> &str {
        match &self.outcome {
            AttemptOutcome::Delivered { body, .. } => body,
            AttemptOutcome::Failed { reason } => reason,
        }
    }
}
