// src/io/mqtt/writer.rs
//
// MQTT publisher used by the ingest bridge. Owns the client handle and a
// background task that drives the event loop. Unlike the cluster's
// subscriber, the publisher keeps polling through connection errors so a
// broker restart does not take the bridge down with it.

use rumqttc::{AsyncClient, Event, Packet, QoS};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::time::Duration;

use super::{mqtt_options, uuid_simple, MqttConfig};
use crate::io::IoError;

/// Publisher handle. Cheap to share by reference; one per bridge process.
pub struct MqttWriter {
    client: AsyncClient,
    device: String,
    cancel_flag: Arc<AtomicBool>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl MqttWriter {
    /// Connect a publisher to the broker. The event loop runs on a
    /// background task until [`MqttWriter::disconnect`].
    pub fn connect(config: &MqttConfig) -> MqttWriter {
        let device = format!("mqtt({}:{})", config.host, config.port);
        let broker = format!("{}:{}", config.host, config.port);

        // Generate client ID if not provided
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| format!("cluster-bridge-{}", uuid_simple()));

        let options = mqtt_options(config, &client_id);
        let (client, mut eventloop) = AsyncClient::new(options, 100);

        let cancel_flag = Arc::new(AtomicBool::new(false));
        let poll_flag = cancel_flag.clone();

        let task_handle = tokio::spawn(async move {
            while !poll_flag.load(Ordering::Relaxed) {
                // Poll with timeout to check cancel flag periodically
                match tokio::time::timeout(Duration::from_millis(100), eventloop.poll()).await {
                    Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                        tlog!("[mqtt] Publisher connected to {}", broker);
                    }
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => {
                        tlog!("[mqtt] Publisher connection error: {}", e);
                        // Back off before rumqttc retries the connection
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                    Err(_) => {
                        // Timeout - continue loop to check cancel flag
                    }
                }
            }
        });

        MqttWriter {
            client,
            device,
            cancel_flag,
            task_handle,
        }
    }

    /// Publish one payload at QoS 0, not retained.
    pub async fn publish(&self, topic: &str, payload: String) -> Result<(), IoError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|e| IoError::connection(&self.device, e.to_string()))
    }

    /// Stop the event loop and disconnect from the broker.
    pub async fn disconnect(self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
        let _ = self.client.disconnect().await;
        let _ = self.task_handle.await;
    }
}
