//! # HTTP attempt executor.
//!
//! [`HttpExecutor`] issues one POST per attempt: the payload's body bytes and
//! header set, applied verbatim. The client carries a per-request timeout so
//! a hung connection resolves as a failed attempt instead of blocking the
//! burst accounting.
//!
//! ## Rules
//! - Timeouts, connect errors, non-UTF8 bodies: all captured into
//!   [`AttemptOutcome::Failed`], never returned as `Err`.
//! - Non-2xx responses are still [`AttemptOutcome::Delivered`] — the core
//!   does not interpret remote status semantics beyond logging.
//! - Header pairs that are not valid HTTP header names/values are skipped
//!   with a warning rather than failing the attempt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::exec::executor::Execute;
use crate::exec::outcome::{AttemptOutcome, AttemptResult};
use crate::tasks::ClaimPayload;

/// Reqwest-backed executor with a bounded per-attempt timeout.
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    /// Creates an executor whose every attempt is bounded by `timeout`.
    ///
    /// Falls back to a default client if the builder rejects the
    /// configuration, which cannot happen for a plain timeout-only setup.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    fn header_map(payload: &ClaimPayload) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(payload.headers.len());
        for (name, value) in &payload.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => {
                    map.insert(n, v);
                }
                _ => warn!(header = %name, "skipping invalid header pair"),
            }
        }
        map
    }
}

#[async_trait]
impl Execute for HttpExecutor {
    async fn execute(&self, index: u32, payload: &ClaimPayload) -> AttemptResult {
        let outcome = match self
            .client
            .post(&payload.url)
            .headers(Self::header_map(payload))
            .body(payload.body.clone())
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => {
                        debug!(index, status, "attempt delivered");
                        AttemptOutcome::Delivered { status, body }
                    }
                    Err(e) => AttemptOutcome::Failed {
                        reason: format!("unreadable response body: {e}"),
                    },
                }
            }
            Err(e) => {
                debug!(index, error = %e, "attempt failed");
                AttemptOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        AttemptResult { index, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_header_pairs_are_skipped() {
        let payload = ClaimPayload::new("https://example.test/x", "{}")
            .with_header("x-rpc-device_id", "abc")
            .with_header("bad header name", "v")
            .with_header("cookie", "a=1");
        let map = HttpExecutor::header_map(&payload);
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("x-rpc-device_id"));
        assert!(map.contains_key("cookie"));
    }
}
