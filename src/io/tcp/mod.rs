// src/io/tcp/mod.rs
//
// TCP ingest: the 5-byte frame codec and the sequential accept server
// vehicle modules push telemetry to.

mod codec;
mod ingest;

// Re-export public items
pub use codec::{IngestCodec, IngestFrame};
pub use ingest::{run_ingest, IngestConfig};
