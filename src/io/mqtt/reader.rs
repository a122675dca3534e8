// src/io/mqtt/reader.rs
//
// MQTT subscriber task feeding the cluster. Opens one connection to the
// broker, issues one subscription request for the channel catalog when
// the broker acknowledges the connection, and forwards each message over
// an mpsc channel. Payloads are treated as text.

use rumqttc::{AsyncClient, Event, Packet, QoS, SubscribeFilter, SubscribeReasonCode};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use tokio::time::Duration;

use super::{mqtt_options, uuid_simple, MqttConfig};
use crate::catalog::Channel;
use crate::io::{now_us, SourceMessage, TelemetryMessage};

/// Spawn the subscriber stream task.
///
/// The task runs until the cancel flag is set or the connection fails,
/// then reports why through [`SourceMessage::Ended`]. Connection errors
/// end the stream; there is no reconnection.
pub fn spawn_reader(
    config: MqttConfig,
    cancel_flag: Arc<AtomicBool>,
    tx: mpsc::Sender<SourceMessage>,
) -> tokio::task::JoinHandle<()> {
    let broker = format!("{}:{}", config.host, config.port);

    tokio::spawn(async move {
        #[allow(unused_assignments)]
        let mut stream_reason = "disconnected";

        // Generate client ID if not provided
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| format!("clusterdeck-{}", uuid_simple()));

        let options = mqtt_options(&config, &client_id);
        let (client, mut eventloop) = AsyncClient::new(options, 100);

        loop {
            if cancel_flag.load(Ordering::Relaxed) {
                stream_reason = "stopped";
                break;
            }

            // Poll with timeout to check cancel flag periodically
            match tokio::time::timeout(Duration::from_millis(100), eventloop.poll()).await {
                Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                    tlog!(
                        "[mqtt] Connected to {}, subscribing to {} topics",
                        broker,
                        Channel::all().len()
                    );

                    let filters: Vec<SubscribeFilter> = Channel::all()
                        .iter()
                        .map(|c| SubscribeFilter::new(c.topic().to_string(), QoS::AtMostOnce))
                        .collect();

                    // A failed request is logged only; the link stays up
                    // without subscriptions.
                    if let Err(e) = client.subscribe_many(filters).await {
                        tlog!("[mqtt] Failed to subscribe: {}", e);
                    }

                    let _ = tx.send(SourceMessage::Connected(broker.clone())).await;
                }
                Ok(Ok(Event::Incoming(Packet::SubAck(suback)))) => {
                    let granted = suback
                        .return_codes
                        .iter()
                        .filter(|code| matches!(code, SubscribeReasonCode::Success(_)))
                        .count();
                    let rejected = suback.return_codes.len() - granted;

                    if rejected > 0 {
                        tlog!(
                            "[mqtt] Broker rejected {} of {} subscriptions",
                            rejected,
                            suback.return_codes.len()
                        );
                    } else {
                        tlog!("[mqtt] Subscribed to {} topics", granted);
                    }

                    let _ = tx.send(SourceMessage::Subscribed(granted)).await;
                }
                Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                    let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                    let message = TelemetryMessage {
                        topic: publish.topic,
                        payload,
                        timestamp_us: now_us(),
                    };
                    let _ = tx.send(SourceMessage::Telemetry(message)).await;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    // Connection error: report it and end the stream.
                    tlog!("[mqtt] Connection error: {}", e);
                    let _ = tx
                        .send(SourceMessage::Error(format!("MQTT error: {}", e)))
                        .await;
                    stream_reason = "error";
                    break;
                }
                Err(_) => {
                    // Timeout - continue loop to check cancel flag
                }
            }
        }

        // Disconnect cleanly
        let _ = client.disconnect().await;

        tlog!("[mqtt] Stream ended: {}", stream_reason);
        let _ = tx.send(SourceMessage::Ended(stream_reason.to_string())).await;
    })
}
