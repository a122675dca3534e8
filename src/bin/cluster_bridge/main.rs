use std::path::PathBuf;

use clap::Parser;

use clusterdeck_lib::{bridge, init_file_logging, settings, stop_file_logging};

#[derive(Parser, Debug)]
#[command(
    name = "cluster-bridge",
    about = "TCP ingest bridge republishing vehicle module frames over MQTT"
)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ingest bind address
    #[arg(long)]
    bind: Option<String>,

    /// Ingest port
    #[arg(short, long)]
    port: Option<u16>,

    /// Broker hostname
    #[arg(long)]
    broker_host: Option<String>,

    /// Broker port
    #[arg(long)]
    broker_port: Option<u16>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let mut settings = settings::load(args.config.as_deref())?;

    // Flags override the config file
    if let Some(bind) = args.bind {
        settings.ingest.bind = bind;
    }
    if let Some(port) = args.port {
        settings.ingest.port = port;
    }
    if let Some(host) = args.broker_host {
        settings.ingest.broker_host = host;
    }
    if let Some(port) = args.broker_port {
        settings.ingest.broker_port = port;
    }
    if let Some(log_dir) = args.log_dir {
        settings.log_dir = Some(log_dir);
    }

    if let Some(log_dir) = &settings.log_dir {
        init_file_logging(log_dir)?;
    }

    let result = bridge::run(
        settings.ingest.to_broker_config(),
        settings.ingest.to_ingest_config(),
    )
    .await;

    stop_file_logging();
    result
}
