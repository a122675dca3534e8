// src/io/mod.rs
//
// IO drivers for the telemetry pipeline: the MQTT subscriber feeding the
// cluster, the MQTT publisher used by the bridge, and the TCP ingest server.

mod error;
pub mod mqtt;
pub mod tcp;

pub use error::IoError;

use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// Shared Types (used by multiple drivers)
// ============================================================================

/// One telemetry message as received from the broker.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryMessage {
    /// Topic the message arrived on.
    pub topic: String,
    /// Payload decoded as text (lossy UTF-8).
    pub payload: String,
    /// Host UNIX timestamp in microseconds.
    pub timestamp_us: u64,
}

/// Internal message from a stream task to its consumer.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceMessage {
    /// Broker accepted the connection (broker address).
    Connected(String),
    /// Subscription request acknowledged (number of topics granted).
    Subscribed(usize),
    /// One telemetry message.
    Telemetry(TelemetryMessage),
    /// Stream ended (reason: "stopped", "disconnected", "error").
    Ended(String),
    /// Stream error. The task ends after sending this.
    Error(String),
}

/// Current state of a broker link.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkState {
    Stopped,
    Starting,
    Running,
    Error(String),
}

/// Get current time in microseconds since UNIX epoch
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
