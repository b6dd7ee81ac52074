//! Offload Relay
//!
//! Client library for delegating invocation workloads from a short-lived
//! handler to a long-running remote runner over a persistent WebSocket
//! connection.
//!
//! The handler process is ephemeral and frozen between invocations; the
//! runner is durable and holds state the handler cannot. This crate bridges
//! the two: each invocation is forwarded as a correlated request frame, the
//! response (or the remote error) is relayed back, and the connection itself
//! survives across invocations so warm calls skip the connect handshake.
//!
//! # Architecture
//!
//! ```text
//!   invocation handler
//!         |
//!         v
//!   +-----------------------------------------+
//!   | RelayClient                             |
//!   |   lifecycle: connect / reuse / rotate   |
//!   |   dispatch:  request + keep-alive       |
//!   |   correlate: match response by id       |
//!   +-----------------------------------------+
//!         |            ^
//!         v            |
//!   Transport (WebSocket) ... unreliable, 30 min lifespan
//!         |            ^
//!         v            |
//!   +-----------------------------------------+
//!   | runner (remote, long-running)           |
//!   +-----------------------------------------+
//! ```
//!
//! # Failure model
//!
//! The connection is assumed unreliable. A close or send failure while a
//! request is pending triggers an immediate reconnect and a transparent
//! resend of the same frame under the same correlation id; the caller never
//! sees transient failures. The single terminal transport outcome is an
//! unresolvable endpoint, which fails the invocation without a reconnect
//! attempt. Errors thrown by the delegated work come back decoded as
//! [`codec::RemoteError`].
//!
//! # Example
//!
//! ```no_run
//! use offload_relay::{InvocationRequest, RelayClient, RelayConfig};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), offload_relay::RelayError> {
//! let config = RelayConfig::from_env().with_endpoint("wss://relay.internal:8443");
//! let mut client = RelayClient::websocket(config);
//!
//! let request = InvocationRequest::new("inv-42", json!({"order": 7}), 25_000);
//! let result = client.invoke(request).await?;
//! println!("runner answered: {result}");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod env_snapshot;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod transport;

pub use codec::{RemoteError, ThrownError};
pub use config::{RelayConfig, CONNECTION_LIFESPAN, KEEP_ALIVE_MARGIN};
pub use error::RelayError;
pub use protocol::{CorrelationId, InboundFrame, OutboundFrame, RequestContext};
pub use relay::{InvocationRequest, RelayClient};
pub use transport::{Connector, Transport, TransportError};

#[cfg(feature = "websocket")]
pub use transport::websocket::{WebSocketConnector, WebSocketTransport};
