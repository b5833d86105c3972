//! # SNTP time authority.
//!
//! [`SntpAuthority`] performs one SNTP v4 exchange over UDP: send a 48-byte
//! client request, read the server's transmit timestamp out of the reply.
//! The whole exchange is wrapped in one timeout so a silent server costs at
//! most the configured fetch bound.
//!
//! Reply validation before the timestamp is trusted:
//! - at least 48 bytes,
//! - mode bits say server (4) or broadcast (5),
//! - stratum is non-zero (zero is a kiss-of-death packet),
//! - the transmit timestamp itself is non-zero.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::net::UdpSocket;
use tokio::time;
use tracing::debug;

use crate::error::TimeError;
use crate::time::authority::Authority;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// SNTP packet size: 12 words, no extensions.
const PACKET_LEN: usize = 48;

/// Byte offset of the transmit timestamp in the reply.
const TRANSMIT_TS_OFFSET: usize = 40;

/// One-shot SNTP v4 client.
pub struct SntpAuthority {
    server: String,
    timeout: Duration,
}

impl SntpAuthority {
    /// Creates an authority against `server` (a `host:port` pair).
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            timeout,
        }
    }

    /// The public pool the original deployment calibrated against.
    pub fn aliyun(timeout: Duration) -> Self {
        Self::new("ntp.aliyun.com:123", timeout)
    }

    async fn exchange(&self) -> Result<DateTime<Utc>, TimeError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&self.server).await?;

        let mut request = [0u8; PACKET_LEN];
        request[0] = 0x23; // LI=0, VN=4, Mode=3 (client)
        socket.send(&request).await?;

        let mut reply = [0u8; PACKET_LEN];
        let n = socket.recv(&mut reply).await?;
        debug!(server = %self.server, bytes = n, "sntp reply received");
        parse_reply(&reply[..n])
    }
}

#[async_trait]
impl Authority for SntpAuthority {
    async fn fetch(&self) -> Result<DateTime<Utc>, TimeError> {
        match time::timeout(self.timeout, self.exchange()).await {
            Ok(res) => res,
            Err(_elapsed) => Err(TimeError::Timeout {
                timeout: self.timeout,
            }),
        }
    }
}

/// Extracts the transmit timestamp from a validated SNTP reply.
fn parse_reply(reply: &[u8]) -> Result<DateTime<Utc>, TimeError> {
    if reply.len() < PACKET_LEN {
        return Err(TimeError::Malformed {
            reason: "reply shorter than 48 bytes",
        });
    }
    let mode = reply[0] & 0x07;
    if mode != 4 && mode != 5 {
        return Err(TimeError::Malformed {
            reason: "mode bits are not a server reply",
        });
    }
    if reply[1] == 0 {
        return Err(TimeError::Malformed {
            reason: "stratum 0 (kiss-of-death)",
        });
    }

    let secs = u32::from_be_bytes(
        reply[TRANSMIT_TS_OFFSET..TRANSMIT_TS_OFFSET + 4]
            .try_into()
            .expect("slice is 4 bytes"),
    );
    let frac = u32::from_be_bytes(
        reply[TRANSMIT_TS_OFFSET + 4..TRANSMIT_TS_OFFSET + 8]
            .try_into()
            .expect("slice is 4 bytes"),
    );
    if secs == 0 {
        return Err(TimeError::Malformed {
            reason: "zero transmit timestamp",
        });
    }

    let unix_secs = i64::from(secs) - NTP_UNIX_OFFSET;
    let nanos = ((u64::from(frac) * 1_000_000_000) >> 32) as u32;
    DateTime::<Utc>::from_timestamp(unix_secs, nanos).ok_or(TimeError::Malformed {
        reason: "transmit timestamp out of range",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Builds a minimal valid server reply with the given transmit seconds.
    fn reply_with(secs: u32, frac: u32) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        buf[0] = 0x24; // VN=4, Mode=4 (server)
        buf[1] = 2; // stratum
        buf[40..44].copy_from_slice(&secs.to_be_bytes());
        buf[44..48].copy_from_slice(&frac.to_be_bytes());
        buf
    }

    #[test]
    fn test_parse_valid_reply() {
        // 2030-01-01 00:00:00 UTC in NTP seconds.
        let unix: i64 = Utc
            .with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
            .unwrap()
            .timestamp();
        let secs = (unix + NTP_UNIX_OFFSET) as u32;
        let got = parse_reply(&reply_with(secs, 0)).unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_fraction_maps_to_subsecond() {
        let unix: i64 = Utc
            .with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
            .unwrap()
            .timestamp();
        let secs = (unix + NTP_UNIX_OFFSET) as u32;
        // Half of the 32-bit fraction space is 500ms.
        let got = parse_reply(&reply_with(secs, 1 << 31)).unwrap();
        assert_eq!(got.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_short_reply_rejected() {
        let err = parse_reply(&[0u8; 20]).unwrap_err();
        assert_eq!(err.as_label(), "time_fetch_malformed");
    }

    #[test]
    fn test_client_mode_reply_rejected() {
        let mut buf = reply_with(1, 0);
        buf[0] = 0x23; // mode 3 = client, not a server answer
        assert!(parse_reply(&buf).is_err());
    }

    #[test]
    fn test_kiss_of_death_rejected() {
        let mut buf = reply_with(1, 0);
        buf[1] = 0;
        assert!(parse_reply(&buf).is_err());
    }

    #[test]
    fn test_zero_timestamp_rejected() {
        assert!(parse_reply(&reply_with(0, 0)).is_err());
    }
}
