use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};

use super::ClientError;
use crate::websocket::messages::{ClientMessage, ServerMessage};

/// A spectator connection to one campaign's live feed
pub struct LiveFeed {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// Turn the server root into the feed URL, e.g.
/// `http://host:3001` into `ws://host:3001/ws/campaigns/ABCD`
pub fn feed_url(base_url: &str, campaign_code: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws/campaigns/{}", base, campaign_code)
}

impl LiveFeed {
    pub async fn connect(base_url: &str, campaign_code: &str) -> Result<Self, ClientError> {
        let url = feed_url(base_url, campaign_code);
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::LiveFeed(format!("Failed to connect to {}: {}", url, e)))?;
        tracing::debug!("Connected to live feed {}", url);
        Ok(Self { stream })
    }

    /// Wait for the next event. `None` once the server closed the feed.
    pub async fn next_event(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(|e| ClientError::LiveFeed(e.to_string()))? {
                Message::Text(text) => {
                    return serde_json::from_str(text.as_str())
                        .map(Some)
                        .map_err(|e| ClientError::LiveFeed(format!("Malformed event: {}", e)));
                }
                Message::Close(_) => return Ok(None),
                _ => continue,
            }
        }
        Ok(None)
    }

    pub async fn ping(&mut self) -> Result<(), ClientError> {
        let json = serde_json::to_string(&ClientMessage::Ping)
            .map_err(|e| ClientError::LiveFeed(e.to_string()))?;
        self.stream
            .send(Message::text(json))
            .await
            .map_err(|e| ClientError::LiveFeed(e.to_string()))
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| ClientError::LiveFeed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url_switches_scheme() {
        assert_eq!(
            feed_url("http://localhost:3001/", "ABCD"),
            "ws://localhost:3001/ws/campaigns/ABCD"
        );
        assert_eq!(
            feed_url("https://bongii.example", "ABCD"),
            "wss://bongii.example/ws/campaigns/ABCD"
        );
    }
}
