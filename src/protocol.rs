//! Wire Protocol
//!
//! Frame definitions for the relay <-> runner conversation. Frames are JSON
//! objects tagged by an `action` field, with camelCase keys on the wire.
//!
//! # Frame Flow
//!
//! 1. Relay sends `relay.request` with a freshly generated correlation id
//! 2. While the response is pending, the relay may send one `relay.keepAlive`
//! 3. Runner answers with `runner.response` carrying the same correlation id,
//!    with either `responseData` or `responseError` set
//! 4. Runner may instead report a delivery failure
//!    (`runner.sendFailedNotConnected` / `runner.sendFailedUnknown`)
//!
//! The correlation id is what lets the relay match a response to its request
//! and discard frames left over from retired connections.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique identifier correlating a request with its response
///
/// Generated once per invocation and reused verbatim across reconnects and
/// rotations, which is what makes transparent resend possible.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Generate a new unique correlation id from a random 128-bit value
    #[must_use]
    pub fn new() -> Self {
        use rand::Rng;
        let bytes: [u8; 16] = rand::thread_rng().gen();
        Self(format!("req_{}", hex::encode(bytes)))
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invocation context forwarded to the runner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Name the delegated function reports itself as
    pub function_name: String,
    /// Memory limit of the invoking host, in MB
    pub memory_limit_mb: u32,
    /// Identifier of this specific invocation
    pub invocation_id: String,
}

/// Frames sent from the relay to the runner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum OutboundFrame {
    /// A delegated invocation request
    #[serde(rename = "relay.request", rename_all = "camelCase")]
    Request {
        /// Correlation id echoed back by the runner's response
        correlation_id: CorrelationId,
        /// Time budget the invocation has left, in milliseconds
        remaining_time_budget_ms: u64,
        /// Path of the source file holding the delegated handler
        target_source_path: String,
        /// Exported name of the delegated handler
        target_handler_name: String,
        /// The invocation payload, forwarded as-is
        payload: Value,
        /// Invocation context metadata
        context: RequestContext,
        /// Filtered snapshot of the process environment
        env: BTreeMap<String, String>,
    },

    /// No-op traffic to reset the infrastructure idle-close window
    #[serde(rename = "relay.keepAlive")]
    KeepAlive,
}

impl OutboundFrame {
    /// Correlation id of this frame, if it carries one
    #[must_use]
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        match self {
            Self::Request { correlation_id, .. } => Some(correlation_id),
            Self::KeepAlive => None,
        }
    }
}

/// Frames received from the runner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum InboundFrame {
    /// Result of a delegated invocation
    #[serde(rename = "runner.response", rename_all = "camelCase")]
    Response {
        /// Correlation id of the request this answers
        correlation_id: CorrelationId,
        /// Successful result payload
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_data: Option<Value>,
        /// Encoded error thrown by the delegated work
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_error: Option<Value>,
    },

    /// The runner could not deliver the request: target not connected
    #[serde(rename = "runner.sendFailedNotConnected")]
    SendFailedNotConnected,

    /// The runner could not deliver the request for an unknown reason
    #[serde(rename = "runner.sendFailedUnknown")]
    SendFailedUnknown,

    /// Any action this relay does not understand; always discarded
    #[serde(other)]
    Unknown,
}
