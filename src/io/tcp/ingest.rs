// src/io/tcp/ingest.rs
//
// TCP ingest server. Vehicle modules connect and stream 5-byte ingest
// frames; decoded frames are forwarded to the bridge task. Clients are
// served one at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use super::codec::{constants::FRAME_LEN, IngestCodec, IngestFrame};
use crate::io::error::IoError;

/// Ingest server configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Bind address
    pub bind: String,
    /// Bind port
    pub port: u16,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 1048,
        }
    }
}

/// Run the ingest accept loop until the stop flag is set.
///
/// A peer disconnect or read error ends that connection only; the
/// listener keeps accepting. Binding failures are returned to the
/// caller.
pub async fn run_ingest(
    config: IngestConfig,
    stop_flag: Arc<AtomicBool>,
    tx: mpsc::Sender<IngestFrame>,
) -> Result<(), IoError> {
    let device = format!("ingest({}:{})", config.bind, config.port);

    let listener = TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .map_err(|e| IoError::connection(&device, e.to_string()))?;

    tlog!(
        "[ingest] Listening on {}:{} for module connections",
        config.bind,
        config.port
    );

    while !stop_flag.load(Ordering::Relaxed) {
        // Accept with timeout so the stop flag stays responsive
        let (stream, addr) =
            match tokio::time::timeout(Duration::from_millis(100), listener.accept()).await {
                Ok(Ok(pair)) => pair,
                Ok(Err(e)) => {
                    tlog!("[ingest] Accept failed: {}", e);
                    continue;
                }
                Err(_) => continue,
            };

        tlog!("[ingest] Connection established with {}", addr);
        if let Err(e) = serve_connection(&device, stream, &stop_flag, &tx).await {
            tlog!("[ingest] {}", e);
        }
    }

    tlog!("[ingest] Server stopped");
    Ok(())
}

/// Read ingest frames from one client until it disconnects.
async fn serve_connection(
    device: &str,
    mut stream: TcpStream,
    stop_flag: &Arc<AtomicBool>,
    tx: &mpsc::Sender<IngestFrame>,
) -> Result<(), IoError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(256);
    let mut read_buf = [0u8; 256];

    while !stop_flag.load(Ordering::Relaxed) {
        match tokio::time::timeout(Duration::from_millis(100), stream.read(&mut read_buf)).await {
            Ok(Ok(0)) => {
                tlog!("[ingest] Client disconnected");
                return Ok(());
            }
            Ok(Ok(n)) => {
                buffer.extend_from_slice(&read_buf[..n]);

                // Drain complete frames; a trailing partial frame waits
                // for the next read.
                while buffer.len() >= FRAME_LEN {
                    let frame_bytes: Vec<u8> = buffer.drain(..FRAME_LEN).collect();
                    match IngestCodec::decode(&frame_bytes) {
                        Ok(frame) => {
                            if tx.send(frame).await.is_err() {
                                // Bridge task gone, nothing left to feed
                                return Ok(());
                            }
                        }
                        Err(e) => tlog!("[ingest] {}", e),
                    }
                }
            }
            Ok(Err(e)) => return Err(IoError::read(device, e.to_string())),
            Err(_) => {
                // Timeout, check stop flag and keep reading
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_receiver_drop_unblocks_full_channel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let mut client = TcpStream::connect(addr).await.expect("connect");
        let (stream, _) = listener.accept().await.expect("accept");

        let stop_flag = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<IngestFrame>(1);
        let task = tokio::spawn({
            let stop_flag = stop_flag.clone();
            async move { serve_connection("ingest(test)", stream, &stop_flag, &tx).await }
        });

        // More frames than the channel holds; with nothing draining,
        // the forward parks on the full channel.
        let raw = IngestCodec::encode(&IngestFrame {
            identifier: 0x01,
            value: 73.0,
        });
        for _ in 0..10 {
            client.write_all(&raw).await.expect("write");
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The bridge's shutdown order: set the flag and close the
        // channel before joining.
        stop_flag.store(true, Ordering::Relaxed);
        drop(rx);

        let joined = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("connection task still parked after shutdown");
        assert_eq!(joined.expect("join"), Ok(()));
    }
}
