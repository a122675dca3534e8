// src/io/error.rs
//
// Typed errors for the IO layer. Binary entry points flatten these to
// String via `From`, keeping `Result<_, String>` at the CLI surface.

use std::fmt;

/// Error type shared by the IO drivers (MQTT, TCP ingest).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IoError {
    /// Failed to establish a connection to a device or broker.
    Connection { device: String, message: String },
    /// An operation did not complete within its deadline.
    Timeout { device: String, operation: String },
    /// The peer sent data that violates the wire protocol.
    Protocol { device: String, message: String },
    /// A read from an established connection failed.
    Read { device: String, message: String },
    /// Invalid or inconsistent configuration, detected before any IO.
    Configuration { message: String },
}

impl IoError {
    pub fn connection(device: impl Into<String>, message: impl Into<String>) -> Self {
        IoError::Connection {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn timeout(device: impl Into<String>, operation: impl Into<String>) -> Self {
        IoError::Timeout {
            device: device.into(),
            operation: operation.into(),
        }
    }

    pub fn protocol(device: impl Into<String>, message: impl Into<String>) -> Self {
        IoError::Protocol {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn read(device: impl Into<String>, message: impl Into<String>) -> Self {
        IoError::Read {
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        IoError::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Connection { device, message } => {
                write!(f, "Connection to {} failed: {}", device, message)
            }
            IoError::Timeout { device, operation } => {
                write!(f, "Timed out during {} on {}", operation, device)
            }
            IoError::Protocol { device, message } => {
                write!(f, "Protocol error on {}: {}", device, message)
            }
            IoError::Read { device, message } => {
                write!(f, "Read error on {}: {}", device, message)
            }
            IoError::Configuration { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for IoError {}

impl From<IoError> for String {
    fn from(e: IoError) -> String {
        e.to_string()
    }
}
