// src/io/mqtt/mod.rs
//
// MQTT drivers: the subscriber task feeding the cluster and the
// publisher handle used by the ingest bridge.

mod reader;
mod writer;

// Re-export public items
pub use reader::spawn_reader;
pub use writer::MqttWriter;

use rumqttc::{MqttOptions, Transport};
use tokio::time::Duration;

/// Broker connection configuration shared by reader and writer.
#[derive(Clone, Debug)]
pub struct MqttConfig {
    /// Broker hostname
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Connect to the broker's WebSocket listener instead of plain TCP
    pub websocket: bool,
    /// Username for authentication (optional)
    pub username: Option<String>,
    /// Password for authentication (optional)
    pub password: Option<String>,
    /// Client ID (auto-generated if None)
    pub client_id: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9001,
            websocket: true,
            username: None,
            password: None,
            client_id: None,
        }
    }
}

/// Build rumqttc options for this config. For WebSocket transport the
/// broker address must carry the full URL; rumqttc ignores the port
/// argument in that case.
fn mqtt_options(config: &MqttConfig, client_id: &str) -> MqttOptions {
    let mut options = if config.websocket {
        let url = format!("ws://{}:{}", config.host, config.port);
        let mut options = MqttOptions::new(client_id, url, config.port);
        options.set_transport(Transport::Ws);
        options
    } else {
        MqttOptions::new(client_id, &config.host, config.port)
    };

    options.set_keep_alive(Duration::from_secs(30));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username, password);
    }

    options
}

/// Generate a simple UUID-like string for client IDs
pub(crate) fn uuid_simple() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:x}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_broker_address_is_a_url() {
        let config = MqttConfig::default();
        let options = mqtt_options(&config, "test-client");
        assert_eq!(options.broker_address().0, "ws://localhost:9001");
        assert!(matches!(options.transport(), Transport::Ws));
    }

    #[test]
    fn test_tcp_broker_address_is_plain() {
        let config = MqttConfig {
            websocket: false,
            port: 1883,
            ..MqttConfig::default()
        };
        let options = mqtt_options(&config, "test-client");
        assert_eq!(
            options.broker_address(),
            ("localhost".to_string(), 1883)
        );
    }
}
