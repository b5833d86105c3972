//! # Time authority abstraction.
//!
//! A [`Authority`] performs one bounded round trip to an external source of
//! true time. The run loop never calls it on a hot path: fetches happen in
//! the calibration phase and at tier boundaries, and the result is folded
//! into the [`DriftClock`](crate::DriftClock) so that reading corrected time
//! stays pure and non-blocking.
//!
//! Tests inject fakes through this seam (fixed instants, scripted failures).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TimeError;

/// One bounded round trip to an external time source.
#[async_trait]
pub trait Authority: Send + Sync + 'static {
    /// Fetches the authority's current instant.
    ///
    /// Implementations must bound their own network wait; the caller treats
    /// any `Err` as "unavailable" and decides the retry cadence.
    async fn fetch(&self) -> Result<DateTime<Utc>, TimeError>;
}
