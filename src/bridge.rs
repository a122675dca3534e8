//! Ingest bridge. Accepts raw module frames over TCP, maps each
//! identifier to its telemetry channel and republishes the value on
//! the broker for dashboards to pick up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::Channel;
use crate::io::mqtt::{MqttConfig, MqttWriter};
use crate::io::tcp::{run_ingest, IngestConfig, IngestFrame};

/// Run the bridge until interrupted.
///
/// The ingest server and the broker connection run as background
/// tasks; this loop moves frames between them.
pub async fn run(broker: MqttConfig, ingest: IngestConfig) -> Result<(), String> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let writer = MqttWriter::connect(&broker);
    let (tx, mut rx) = mpsc::channel::<IngestFrame>(100);

    let server = tokio::spawn(run_ingest(ingest, stop_flag.clone(), tx));

    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Some(frame) => publish_frame(&writer, &frame).await,
                    // Sender dropped, the server ended on its own
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tlog!("[bridge] Shutdown requested");
                break;
            }
        }
    }

    stop_flag.store(true, Ordering::Relaxed);
    // Close the channel so a send parked on a full queue fails instead
    // of holding the server open.
    drop(rx);
    let server_result = server.await;
    writer.disconnect().await;

    match server_result {
        Ok(result) => result.map_err(String::from),
        Err(e) => Err(format!("Ingest server task failed: {}", e)),
    }
}

/// Publish one decoded frame to its channel topic.
///
/// Frames with an unassigned identifier are dropped.
async fn publish_frame(writer: &MqttWriter, frame: &IngestFrame) {
    let Some(channel) = Channel::from_ingest_id(frame.identifier) else {
        tlog!(
            "[bridge] Dropping frame with unknown identifier 0x{:02X}",
            frame.identifier
        );
        return;
    };

    let payload = format!("{}", frame.value);
    tlog!("[bridge] {} <- {}", channel.topic(), payload);

    if let Err(e) = writer.publish(channel.topic(), payload).await {
        tlog!("[bridge] Publish failed: {}", e);
    }
}
