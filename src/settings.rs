use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::io::mqtt::MqttConfig;
use crate::io::tcp::IngestConfig;
use crate::io::IoError;

/// Broker connection settings for the dashboard.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrokerSettings {
    #[serde(default = "default_broker_host")]
    pub host: String,
    #[serde(default = "default_broker_port")]
    pub port: u16,
    /// Connect to the broker's WebSocket listener instead of plain TCP
    #[serde(default = "default_broker_websocket")]
    pub websocket: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Ingest server settings for the bridge, plus the broker it
/// republishes to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IngestSettings {
    #[serde(default = "default_ingest_bind")]
    pub bind: String,
    #[serde(default = "default_ingest_port")]
    pub port: u16,
    #[serde(default = "default_broker_host")]
    pub broker_host: String,
    #[serde(default = "default_ingest_broker_port")]
    pub broker_port: u16,
}

/// Dashboard display settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DisplaySettings {
    /// Redraw interval in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppSettings {
    /// Directory for log files (no file logging when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_broker_host() -> String {
    "localhost".to_string()
}
fn default_broker_port() -> u16 {
    9001 // WebSocket listener
}
fn default_broker_websocket() -> bool {
    true
}
fn default_ingest_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_ingest_port() -> u16 {
    1048
}
fn default_ingest_broker_port() -> u16 {
    1883 // plain TCP listener
}
fn default_refresh_ms() -> u64 {
    100
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            host: default_broker_host(),
            port: default_broker_port(),
            websocket: default_broker_websocket(),
            username: None,
            password: None,
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            bind: default_ingest_bind(),
            port: default_ingest_port(),
            broker_host: default_broker_host(),
            broker_port: default_ingest_broker_port(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_dir: None,
            broker: BrokerSettings::default(),
            ingest: IngestSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl BrokerSettings {
    /// Broker config for the dashboard reader.
    pub fn to_mqtt_config(&self) -> MqttConfig {
        MqttConfig {
            host: self.host.clone(),
            port: self.port,
            websocket: self.websocket,
            username: self.username.clone(),
            password: self.password.clone(),
            client_id: None,
        }
    }
}

impl IngestSettings {
    /// Bind config for the ingest server.
    pub fn to_ingest_config(&self) -> IngestConfig {
        IngestConfig {
            bind: self.bind.clone(),
            port: self.port,
        }
    }

    /// Broker config for the bridge publisher. Always plain TCP.
    pub fn to_broker_config(&self) -> MqttConfig {
        MqttConfig {
            host: self.broker_host.clone(),
            port: self.broker_port,
            websocket: false,
            username: None,
            password: None,
            client_id: None,
        }
    }
}

/// Default config path under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clusterdeck").join("config.toml"))
}

/// Load settings.
///
/// An explicit path must exist and parse. Without one, the platform
/// default location is read when present, otherwise defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<AppSettings, String> {
    if let Some(path) = explicit {
        return read_file(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read_file(&path),
        _ => Ok(AppSettings::default()),
    }
}

fn read_file(path: &Path) -> Result<AppSettings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| {
        IoError::configuration(format!("settings {}: {}", path.display(), e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();

        assert_eq!(settings.broker.host, "localhost");
        assert_eq!(settings.broker.port, 9001);
        assert!(settings.broker.websocket);
        assert_eq!(settings.ingest.port, 1048);
        assert_eq!(settings.ingest.broker_port, 1883);
        assert_eq!(settings.display.refresh_ms, 100);
        assert!(settings.log_dir.is_none());
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let settings: AppSettings = toml::from_str("").unwrap();
        assert_eq!(settings.broker.port, 9001);
        assert_eq!(settings.ingest.bind, "0.0.0.0");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let settings: AppSettings = toml::from_str(
            r#"
            log_dir = "/var/log/clusterdeck"

            [broker]
            host = "10.0.0.7"

            [display]
            refresh_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.log_dir.as_deref(),
            Some(Path::new("/var/log/clusterdeck"))
        );
        assert_eq!(settings.broker.host, "10.0.0.7");
        assert_eq!(settings.broker.port, 9001);
        assert!(settings.broker.websocket);
        assert_eq!(settings.display.refresh_ms, 250);
        assert_eq!(settings.ingest.port, 1048);
    }

    #[test]
    fn test_broker_to_mqtt_config() {
        let settings = AppSettings::default();
        let config = settings.broker.to_mqtt_config();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9001);
        assert!(config.websocket);
    }

    #[test]
    fn test_ingest_to_broker_config_is_plain_tcp() {
        let settings = AppSettings::default();
        let config = settings.ingest.to_broker_config();

        assert_eq!(config.port, 1883);
        assert!(!config.websocket);
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let result: Result<AppSettings, _> = toml::from_str("[broker]\nport = \"nine\"");
        assert!(result.is_err());
    }
}
