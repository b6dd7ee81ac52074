//! WebSocket Transport
//!
//! tokio-tungstenite implementation of the transport seam. Frames travel as
//! JSON text messages; WebSocket control frames (ping/pong/close) are handled
//! here and never reach the correlator.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{io_error_is_unresolvable, Connector, Transport, TransportError};
use crate::protocol::{InboundFrame, OutboundFrame};

/// Connector opening WebSocket connections to the relay endpoint
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Create a new WebSocket connector
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, endpoint: &str) -> Result<WebSocketTransport, TransportError> {
        let (socket, _response) = connect_async(endpoint)
            .await
            .map_err(classify_connect_error)?;
        tracing::debug!(endpoint = %endpoint, "WebSocket connection established");
        Ok(WebSocketTransport { socket })
    }
}

/// One established WebSocket connection
pub struct WebSocketTransport {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, frame: &OutboundFrame) -> Result<(), TransportError> {
        let text = serde_json::to_string(frame)
            .map_err(|e| TransportError::InvalidFrame(e.to_string()))?;
        self.socket
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str(&text)
                            .map_err(|e| TransportError::ReceiveFailed(e.to_string())),
                    );
                }
                // Control traffic and non-text payloads carry no frames
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_)) => {}
                Ok(Message::Close(_)) => {}
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
                Err(err) => return Some(Err(classify_stream_error(err))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}

fn classify_connect_error(err: WsError) -> TransportError {
    match err {
        WsError::Io(io) if io_error_is_unresolvable(&io) => {
            TransportError::Unresolvable(io.to_string())
        }
        WsError::Io(io) => TransportError::Io(io),
        WsError::Url(url) => TransportError::ConnectionFailed(url.to_string()),
        other => TransportError::ConnectionFailed(other.to_string()),
    }
}

fn classify_stream_error(err: WsError) -> TransportError {
    match err {
        WsError::Io(io) if io_error_is_unresolvable(&io) => {
            TransportError::Unresolvable(io.to_string())
        }
        WsError::Io(io) => TransportError::Io(io),
        other => TransportError::ReceiveFailed(other.to_string()),
    }
}
