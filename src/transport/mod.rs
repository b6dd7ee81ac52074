//! Transport Seam
//!
//! Trait definitions for the single logical connection the relay owns, plus
//! the error type used to classify why a connection failed or closed.
//!
//! Two traits define the seam:
//! - [`Connector`]: opens a fresh transport to an endpoint
//! - [`Transport`]: one established bidirectional connection
//!
//! The relay client is generic over the connector, so tests drive the full
//! lifecycle state machine with in-memory transports while production uses
//! the WebSocket implementation in [`websocket`].

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{InboundFrame, OutboundFrame};

#[cfg(feature = "websocket")]
pub mod websocket;

/// Errors that can occur on the transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the endpoint failed to establish
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The endpoint address could not be resolved
    #[error("endpoint could not be resolved: {0}")]
    Unresolvable(String),
    /// Failed to send a frame
    #[error("send failed: {0}")]
    SendFailed(String),
    /// Failed to receive or parse a frame
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
    /// A frame could not be serialized
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    /// IO error from the underlying socket
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether this error means the endpoint address is unresolvable
    ///
    /// An unresolvable endpoint is terminal: reconnecting cannot help. The
    /// check sniffs resolver failure text out of IO errors because the
    /// platform reports DNS failures as uncategorized IO errors.
    #[must_use]
    pub fn is_unresolvable(&self) -> bool {
        match self {
            Self::Unresolvable(_) => true,
            Self::Io(err) => io_error_is_unresolvable(err),
            Self::ConnectionFailed(msg) | Self::SendFailed(msg) | Self::ReceiveFailed(msg) => {
                message_is_unresolvable(msg)
            }
            Self::InvalidFrame(_) => false,
        }
    }
}

/// Resolver failure heuristics for raw IO errors
pub(crate) fn io_error_is_unresolvable(err: &std::io::Error) -> bool {
    message_is_unresolvable(&err.to_string())
}

fn message_is_unresolvable(msg: &str) -> bool {
    msg.contains("failed to lookup address")
        || msg.contains("Name or service not known")
        || msg.contains("nodename nor servname")
        || msg.contains("getaddrinfo")
        || msg.contains("ENOTFOUND")
}

/// One established bidirectional connection
#[async_trait]
pub trait Transport: Send {
    /// Send a frame to the runner
    async fn send(&mut self, frame: &OutboundFrame) -> Result<(), TransportError>;

    /// Receive the next event from the connection
    ///
    /// `Some(Ok(frame))` is an inbound frame, `Some(Err(_))` a transport
    /// error observed while the connection is still nominally open, and
    /// `None` means the connection has closed. After `None` the transport
    /// yields nothing further.
    async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>>;

    /// Close the connection; best-effort, errors are ignored
    async fn close(&mut self);
}

/// Factory opening fresh transports to an endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    /// The transport type this connector produces
    type Transport: Transport;

    /// Open a new connection to `endpoint`
    async fn connect(&self, endpoint: &str) -> Result<Self::Transport, TransportError>;
}
