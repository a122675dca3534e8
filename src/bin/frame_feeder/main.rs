use clap::Parser;

use clusterdeck_lib::feeder::{self, parse_identifier};
use clusterdeck_lib::io::tcp::IngestFrame;

#[derive(Parser, Debug)]
#[command(
    name = "frame-feeder",
    about = "Send hand-built ingest frames to the bridge"
)]
struct Args {
    /// Ingest server address
    #[arg(short, long, default_value = "127.0.0.1:1048")]
    addr: String,

    /// Identifier for one-shot mode (hex or decimal)
    #[arg(short, long)]
    id: Option<String>,

    /// Value for one-shot mode
    #[arg(short, long, requires = "id")]
    value: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let frame = match (args.id, args.value) {
        (Some(id), Some(value)) => {
            let identifier =
                parse_identifier(&id).ok_or_else(|| format!("Invalid identifier '{}'", id))?;
            Some(IngestFrame { identifier, value })
        }
        (Some(_), None) => return Err("--id requires --value".to_string()),
        _ => None,
    };

    feeder::run(&args.addr, frame).await
}
