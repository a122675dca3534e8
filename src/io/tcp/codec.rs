// src/io/tcp/codec.rs
//
// Ingest frame codec.
//
// Wire format (big-endian):
//   [Identifier-1byte][Value-4bytes-f32]

use crate::io::error::IoError;

/// Ingest protocol constants
pub mod constants {
    /// Total frame length in bytes
    pub const FRAME_LEN: usize = 5;
}

/// One decoded ingest frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IngestFrame {
    /// Signal identifier (see `Channel::from_ingest_id` for assignments)
    pub identifier: u8,
    /// Signal value
    pub value: f32,
}

/// Ingest binary frame codec.
pub struct IngestCodec;

impl IngestCodec {
    /// Decode a single ingest frame from raw bytes.
    pub fn decode(raw: &[u8]) -> Result<IngestFrame, IoError> {
        use constants::*;

        if raw.len() < FRAME_LEN {
            return Err(IoError::protocol(
                "ingest",
                format!(
                    "frame too short: {} bytes, need {}",
                    raw.len(),
                    FRAME_LEN
                ),
            ));
        }

        let value = f32::from_be_bytes(raw[1..FRAME_LEN].try_into().unwrap_or([0; 4]));

        Ok(IngestFrame {
            identifier: raw[0],
            value,
        })
    }

    /// Encode an ingest frame for transmission.
    pub fn encode(frame: &IngestFrame) -> [u8; constants::FRAME_LEN] {
        let mut buf = [0u8; constants::FRAME_LEN];
        buf[0] = frame.identifier;
        buf[1..].copy_from_slice(&frame.value.to_be_bytes());
        buf
    }
}
