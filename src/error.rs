//! Relay Errors
//!
//! The four user-visible failure outcomes of an invocation, plus nothing
//! else. Transport-transient failures are recovered internally and never
//! appear here.

use thiserror::Error;

use crate::codec::RemoteError;
use crate::transport::TransportError;

/// Errors surfaced to the invocation handler
#[derive(Debug, Error)]
pub enum RelayError {
    /// The runner reported it has no connection to the delegated target
    ///
    /// Reported by the remote side; not a reconnect trigger and not retried.
    #[error("runner is not connected to the delegated target")]
    RunnerNotConnected,

    /// The runner could not deliver the request for an unknown reason
    #[error("runner could not deliver the request")]
    DeliveryFailed,

    /// The relay endpoint address could not be resolved
    ///
    /// Terminal: no reconnect is attempted for this invocation.
    #[error("relay endpoint could not be resolved")]
    EndpointUnresolvable(#[source] TransportError),

    /// The delegated work itself threw an error
    ///
    /// Decoded from the wire with name, message, stack and code preserved.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
