//! # Attempt executor seam.
//!
//! An [`Execute`] implementation performs one outbound request built from a
//! pre-serialized payload. It **never raises past its boundary**: every
//! failure mode is captured into the returned [`AttemptResult`], so one hung
//! or refused attempt can never poison its siblings in the burst.

use async_trait::async_trait;

use crate::exec::outcome::AttemptResult;
use crate::tasks::ClaimPayload;

/// Performs one claim attempt.
#[async_trait]
pub trait Execute: Send + Sync + 'static {
    /// Issues one request for the given payload.
    ///
    /// `index` is the attempt's 1-based position within the burst; it is
    /// carried through into the result for event attribution.
    async fn execute(&self, index: u32, payload: &ClaimPayload) -> AttemptResult;
}
