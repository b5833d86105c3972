//! # Opaque claim payload.
//!
//! [`ClaimPayload`] carries everything the Action Executor needs to issue one
//! outbound request: the endpoint, a pre-serialized body, and a header set.
//! The scheduler core forwards it verbatim and never inspects any of it, so
//! the state machine stays decoupled from whatever remote protocol the claim
//! speaks.

/// Pre-built request descriptor forwarded verbatim to the executor.
#[derive(Clone, Debug)]
pub struct ClaimPayload {
    /// Endpoint the attempt is issued against.
    pub url: String,
    /// Pre-serialized request body (sent as-is).
    pub body: String,
    /// Header name/value pairs (applied as-is; invalid pairs are skipped).
    pub headers: Vec<(String, String)>,
}

impl ClaimPayload {
    /// Creates a payload with no headers.
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Adds one header pair.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
