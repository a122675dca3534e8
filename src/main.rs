use std::path::PathBuf;

use clap::Parser;

use clusterdeck_lib::{init_file_logging, settings, stop_file_logging, tui};

#[derive(Parser, Debug)]
#[command(
    name = "clusterdeck",
    about = "Terminal instrument cluster for MQTT vehicle telemetry"
)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker hostname
    #[arg(long)]
    host: Option<String>,

    /// Broker port
    #[arg(short, long)]
    port: Option<u16>,

    /// Connect over plain TCP instead of WebSocket
    #[arg(long)]
    tcp: bool,

    /// Redraw interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let mut settings = settings::load(args.config.as_deref())?;

    // Flags override the config file
    if let Some(host) = args.host {
        settings.broker.host = host;
    }
    if let Some(port) = args.port {
        settings.broker.port = port;
    }
    if args.tcp {
        settings.broker.websocket = false;
    }
    if let Some(refresh_ms) = args.refresh_ms {
        settings.display.refresh_ms = refresh_ms;
    }
    if let Some(log_dir) = args.log_dir {
        settings.log_dir = Some(log_dir);
    }

    if let Some(log_dir) = &settings.log_dir {
        init_file_logging(log_dir)?;
    }

    let result = tui::app::run(
        settings.broker.to_mqtt_config(),
        settings.display.refresh_ms,
    )
    .await;

    stop_file_logging();
    result
}
