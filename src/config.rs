//! Preflight configuration.
//!
//! Everything here is fixed when the bind is built and never changes after.

use crate::error::Result;
use crate::probe::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_PROBE_PORT, DEFAULT_WRITE_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum spacing between probes to the same destination.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Preflight settings, loadable from JSON.
///
/// Missing fields take their defaults, so `{"payload_hex": "0x01"}` is a
/// complete configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Probe payload as hex, optionally prefixed with `0x` / `0X`.
    pub payload_hex: String,
    /// Destination port of the probe datagram.
    pub port: u16,
    /// Minimum time between probes to the same destination IP.
    pub min_interval_ms: u64,
    /// Bound on opening the probe socket.
    pub connect_timeout_ms: u64,
    /// Bound on the probe write.
    pub write_timeout_ms: u64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            payload_hex: String::new(),
            port: DEFAULT_PROBE_PORT,
            min_interval_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl PreflightConfig {
    /// Config with the given payload and defaults for everything else.
    pub fn with_payload(payload_hex: impl Into<String>) -> Self {
        Self {
            payload_hex: payload_hex.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decoded probe payload.
    pub fn payload(&self) -> Result<Vec<u8>> {
        decode_payload(&self.payload_hex)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Decode a probe payload from hex. A leading `0x` or `0X` is stripped.
pub fn decode_payload(hex_payload: &str) -> Result<Vec<u8>> {
    let digits = hex_payload
        .strip_prefix("0x")
        .or_else(|| hex_payload.strip_prefix("0X"))
        .unwrap_or(hex_payload);
    Ok(hex::decode(digits)?)
}
