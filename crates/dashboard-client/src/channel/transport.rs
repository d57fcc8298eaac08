//! Channel transport seam and its WebSocket implementation

use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};
use url::Url;

/// An open channel connection
#[async_trait]
pub trait ChannelTransport: Send {
    /// Next text frame, or `None` once the peer closed the connection
    async fn recv(&mut self) -> Option<Result<String>>;

    async fn send_text(&mut self, text: &str) -> Result<()>;
}

/// Opens channel connections
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn ChannelTransport>>;
}

/// Connects with `tokio-tungstenite`
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl ChannelConnector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn ChannelTransport>> {
        debug!(%url, "opening channel");
        let (stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| DashboardError::Transport(format!("connect to {url} timed out")))??;
        Ok(Box::new(WsTransport { stream }))
    }
}

/// WebSocket connection produced by [`WsConnector`]
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl ChannelTransport for WsTransport {
    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(e) => warn!(error = %e, "skipping non-UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "channel closed by peer");
                    return None;
                }
                // Ping replies are queued by tungstenite itself
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }
}
