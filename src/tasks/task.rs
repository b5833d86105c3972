//! # Task descriptor and record parsing.
//!
//! [`ClaimTask`] is the immutable descriptor a run executes: a unique name,
//! an absolute target instant, a burst size, and an opaque payload. Task
//! registries hand these over whole; the scheduler never mutates one.
//!
//! [`TaskRecord`] is the external JSON shape (`name`, `time`, `count`,
//! `payload`) as produced by wishlist/task-list collaborators. `time` is a
//! wall-clock string in the fixed reference zone; `count` defaults when
//! absent or invalid.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::StartError;
use crate::tasks::payload::ClaimPayload;

/// Wall-clock format of the `time` field in task records.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// External JSON shape of one task-list entry.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskRecord {
    /// Unique task name.
    pub name: String,
    /// Target instant as `YYYY-MM-DD HH:MM:SS` in the reference zone.
    pub time: String,
    /// Burst size; absent or zero falls back to the configured default.
    #[serde(default)]
    pub count: Option<u32>,
    /// Opaque request descriptor, forwarded verbatim.
    pub payload: PayloadRecord,
}

/// External JSON shape of the opaque payload.
#[derive(Clone, Debug, Deserialize)]
pub struct PayloadRecord {
    /// Endpoint the attempts are issued against.
    pub url: String,
    /// Request body; re-serialized to text and sent as-is.
    pub body: serde_json::Value,
    /// Header set, applied as-is.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Immutable descriptor of one timed claim.
#[derive(Clone, Debug)]
pub struct ClaimTask {
    name: String,
    target: DateTime<Utc>,
    count: u32,
    payload: ClaimPayload,
}

impl ClaimTask {
    /// Creates a descriptor with explicit parameters.
    ///
    /// `count == 0` is not rejected here; [`Scheduler::start`](crate::Scheduler::start)
    /// rejects it synchronously before any run state exists.
    pub fn new(
        name: impl Into<String>,
        target: DateTime<Utc>,
        count: u32,
        payload: ClaimPayload,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            count,
            payload,
        }
    }

    /// Parses an external task record.
    ///
    /// - `time` is interpreted in `reference_offset` and converted to UTC;
    ///   a malformed string is rejected with [`StartError::InvalidTime`].
    /// - `count` absent or zero falls back to `default_count`.
    /// - `payload.body` is re-serialized to text and never inspected again.
    pub fn from_record(
        record: TaskRecord,
        reference_offset: FixedOffset,
        default_count: u32,
    ) -> Result<Self, StartError> {
        let naive = NaiveDateTime::parse_from_str(&record.time, TIME_FORMAT).map_err(|_| {
            StartError::InvalidTime {
                name: record.name.clone(),
                value: record.time.clone(),
            }
        })?;
        // A fixed offset maps every local time to exactly one instant.
        let target = naive
            .and_local_timezone(reference_offset)
            .single()
            .ok_or_else(|| StartError::InvalidTime {
                name: record.name.clone(),
                value: record.time.clone(),
            })?
            .with_timezone(&Utc);

        let count = record.count.filter(|c| *c > 0).unwrap_or(default_count);

        let mut payload = ClaimPayload::new(record.payload.url, record.payload.body.to_string());
        for (name, value) in record.payload.headers {
            payload = payload.with_header(name, value);
        }

        Ok(Self {
            name: record.name,
            target,
            count,
            payload,
        })
    }

    /// Unique task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute target instant (reference-clock domain, stored as UTC).
    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Number of concurrent attempts to fire.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The opaque request descriptor.
    pub fn payload(&self) -> &ClaimPayload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn record(json: &str) -> TaskRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parses_time_in_reference_zone() {
        let rec = record(
            r#"{"name":"t1","time":"2030-01-01 00:00:00","count":3,
                "payload":{"url":"https://example.test/x","body":{"goods_id":"1"}}}"#,
        );
        let task = ClaimTask::from_record(rec, offset(), 5).unwrap();
        // Midnight UTC+8 is 16:00 the previous day in UTC.
        let expected = Utc.with_ymd_and_hms(2029, 12, 31, 16, 0, 0).unwrap();
        assert_eq!(task.target(), expected);
        assert_eq!(task.count(), 3);
        assert_eq!(task.name(), "t1");
    }

    #[test]
    fn test_count_defaults_when_absent() {
        let rec = record(
            r#"{"name":"t1","time":"2030-01-01 00:00:00",
                "payload":{"url":"u","body":{}}}"#,
        );
        assert_eq!(ClaimTask::from_record(rec, offset(), 5).unwrap().count(), 5);
    }

    #[test]
    fn test_count_defaults_when_zero() {
        let rec = record(
            r#"{"name":"t1","time":"2030-01-01 00:00:00","count":0,
                "payload":{"url":"u","body":{}}}"#,
        );
        assert_eq!(ClaimTask::from_record(rec, offset(), 5).unwrap().count(), 5);
    }

    #[test]
    fn test_malformed_time_is_rejected() {
        let rec = record(
            r#"{"name":"t1","time":"tomorrow-ish",
                "payload":{"url":"u","body":{}}}"#,
        );
        let err = ClaimTask::from_record(rec, offset(), 5).unwrap_err();
        assert_eq!(err.as_label(), "start_invalid_time");
    }

    #[test]
    fn test_payload_body_forwarded_verbatim() {
        let rec = record(
            r#"{"name":"t1","time":"2030-01-01 00:00:00",
                "payload":{"url":"u","body":{"a":1},"headers":{"cookie":"c=1"}}}"#,
        );
        let task = ClaimTask::from_record(rec, offset(), 5).unwrap();
        assert_eq!(task.payload().body, r#"{"a":1}"#);
        assert_eq!(
            task.payload().headers,
            vec![("cookie".to_string(), "c=1".to_string())]
        );
    }
}
