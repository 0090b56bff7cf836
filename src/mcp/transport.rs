use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::io::BufReader;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, error};

use super::types::{McpMessage, McpNotification, McpRequest, McpResponse};

/// A line that could not be turned into a JSON-RPC message.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Invalid JSON-RPC message structure")]
    NotAnObject,

    #[error("Invalid JSON-RPC request: {0}")]
    Request(#[source] serde_json::Error),

    #[error("Invalid JSON-RPC notification: {0}")]
    Notification(#[source] serde_json::Error),
}

/// One line read from the client.
#[derive(Debug)]
pub enum Inbound {
    Message(McpMessage),
    Invalid(ParseError),
}

/// Requests carry an `id`; everything else is a notification.
pub fn parse_message(line: &str) -> Result<McpMessage, ParseError> {
    let value: Value = serde_json::from_str(line).map_err(ParseError::Json)?;
    let is_request = value
        .as_object()
        .ok_or(ParseError::NotAnObject)?
        .contains_key("id");

    if is_request {
        serde_json::from_value::<McpRequest>(value)
            .map(McpMessage::Request)
            .map_err(ParseError::Request)
    } else {
        serde_json::from_value::<McpNotification>(value)
            .map(McpMessage::Notification)
            .map_err(ParseError::Notification)
    }
}

pub struct StdioTransport {
    reader: FramedRead<BufReader<tokio::io::Stdin>, LinesCodec>,
    writer: FramedWrite<tokio::io::Stdout, LinesCodec>,
}

impl StdioTransport {
    pub fn new() -> Self {
        let reader = FramedRead::new(BufReader::new(tokio::io::stdin()), LinesCodec::new());
        let writer = FramedWrite::new(tokio::io::stdout(), LinesCodec::new());
        Self { reader, writer }
    }

    /// Reads the next non-blank line. `None` means the client closed stdin.
    pub async fn read_message(&mut self) -> Result<Option<Inbound>> {
        loop {
            match self.reader.next().await {
                Some(Ok(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    debug!("Received: {}", line);
                    let inbound = match parse_message(&line) {
                        Ok(message) => Inbound::Message(message),
                        Err(e) => {
                            error!("Failed to parse message: {}", e);
                            Inbound::Invalid(e)
                        }
                    };
                    return Ok(Some(inbound));
                }
                Some(Err(e)) => {
                    error!("Error reading from stdin: {}", e);
                    return Err(anyhow::anyhow!("Transport error: {}", e));
                }
                None => {
                    debug!("EOF reached");
                    return Ok(None);
                }
            }
        }
    }

    pub async fn write_response(&mut self, response: McpResponse) -> Result<()> {
        let json = serde_json::to_string(&response)?;
        debug!("Sending: {}", json);
        self.writer.send(json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_and_notification() {
        let request = parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert!(matches!(request, McpMessage::Request(r) if r.method == "ping"));

        let notification =
            parse_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(matches!(notification, McpMessage::Notification(_)));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(parse_message("{not json"), Err(ParseError::Json(_))));
        assert!(matches!(parse_message("[1, 2]"), Err(ParseError::NotAnObject)));
        assert!(matches!(
            parse_message(r#"{"jsonrpc":"2.0","id":1}"#),
            Err(ParseError::Request(_))
        ));
    }
}
