//! Interactive frame feeder for exercising the ingest bridge without
//! vehicle hardware. Sends hand-typed 5-byte frames to the ingest port.

use std::io::Write as _;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::io::tcp::{IngestCodec, IngestFrame};
use crate::io::IoError;

/// Parse a module identifier, hex first (with or without 0x prefix),
/// falling back to decimal.
pub fn parse_identifier(input: &str) -> Option<u8> {
    let trimmed = input.trim();
    let s = trimmed.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(s, 16)
        .or_else(|_| trimmed.parse::<u8>())
        .ok()
}

/// Connect to the ingest port and send frames.
///
/// With `frame` set, sends it and exits. Otherwise prompts for
/// identifier/value pairs until EOF or `q`.
pub async fn run(addr: &str, frame: Option<IngestFrame>) -> Result<(), String> {
    let device = format!("ingest({})", addr);

    let mut stream = match tokio::time::timeout(Duration::from_secs(5), TcpStream::connect(addr))
        .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(IoError::connection(&device, e.to_string()).into()),
        Err(_) => return Err(IoError::timeout(&device, "connect").into()),
    };

    println!("Connected to {}", addr);

    if let Some(frame) = frame {
        send_frame(&mut stream, &frame).await?;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt("Identifier (hex, q to quit): ")?;
        let Some(id_line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            break;
        };
        let id_input = id_line.trim();
        if id_input.eq_ignore_ascii_case("q") {
            break;
        }
        let Some(identifier) = parse_identifier(id_input) else {
            println!("Invalid input, try again.");
            continue;
        };

        prompt("Value: ")?;
        let Some(value_line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            break;
        };
        let Ok(value) = value_line.trim().parse::<f32>() else {
            println!("Invalid input, try again.");
            continue;
        };

        send_frame(&mut stream, &IngestFrame { identifier, value }).await?;
    }

    Ok(())
}

fn prompt(text: &str) -> Result<(), String> {
    print!("{}", text);
    std::io::stdout().flush().map_err(|e| e.to_string())
}

async fn send_frame(stream: &mut TcpStream, frame: &IngestFrame) -> Result<(), String> {
    stream
        .write_all(&IngestCodec::encode(frame))
        .await
        .map_err(|e| format!("Send failed: {}", e))?;
    println!("Sent 0x{:02X} = {}", frame.identifier, frame.value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier_hex_prefix() {
        assert_eq!(parse_identifier("0x01"), Some(1));
        assert_eq!(parse_identifier("0X1F"), Some(31));
    }

    #[test]
    fn test_parse_identifier_bare_hex() {
        // Unprefixed digits read as hex first
        assert_eq!(parse_identifier("1"), Some(1));
        assert_eq!(parse_identifier("10"), Some(16));
        assert_eq!(parse_identifier("ff"), Some(255));
    }

    #[test]
    fn test_parse_identifier_rejects_garbage() {
        assert_eq!(parse_identifier(""), None);
        assert_eq!(parse_identifier("wheel"), None);
        assert_eq!(parse_identifier("0x100"), None);
    }

    #[test]
    fn test_parse_identifier_trims_whitespace() {
        assert_eq!(parse_identifier(" 0x05 "), Some(5));
    }
}
