//! Relay Client
//!
//! The long-lived service object that owns the single logical connection to
//! the runner and carries one invocation at a time across it.
//!
//! # Lifecycle
//!
//! Per invocation the client decides between three transport actions:
//!
//! 1. No connection -> open one, then deliver the request
//! 2. Connection older than the lifespan -> retire it (close and drop it
//!    *before* the replacement is opened, so its frames can never reach the
//!    correlator), open a new one, then deliver
//! 3. Connection within lifespan -> deliver directly
//!
//! While a response is pending, a single keep-alive frame is sent after the
//! idle margin to hold off infrastructure idle-close. If the connection
//! closes before a matching response arrives, the closure is classified: an
//! unresolvable endpoint is terminal, anything else triggers an immediate
//! reconnect and a transparent resend of the same frame with the same
//! correlation id. There is no cap on resends.
//!
//! # Single flight
//!
//! At most one request is in flight, by design: `invoke` takes `&mut self`,
//! so the exclusive borrow is the single-flight invariant. This is what keeps
//! the reconnect/resend logic simple and correct; do not generalize to a
//! request map unless the one-at-a-time model changes.

use serde_json::Value;
use tokio::time::Instant;

use crate::codec;
use crate::config::RelayConfig;
use crate::env_snapshot;
use crate::error::RelayError;
use crate::protocol::{CorrelationId, InboundFrame, OutboundFrame, RequestContext};
use crate::transport::{Connector, Transport, TransportError};

/// One unit of delegated work
#[derive(Clone, Debug)]
pub struct InvocationRequest {
    /// Identifier of this invocation, forwarded in the request context
    pub invocation_id: String,
    /// Payload handed to the delegated handler
    pub payload: Value,
    /// Time budget the invocation has left, in milliseconds
    ///
    /// Enforced by the invoking host, not by the relay; it is forwarded so
    /// the runner can bound its own work.
    pub remaining_time_ms: u64,
}

impl InvocationRequest {
    /// Create a new invocation request
    #[must_use]
    pub fn new(invocation_id: impl Into<String>, payload: Value, remaining_time_ms: u64) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            payload,
            remaining_time_ms,
        }
    }
}

/// The live transport plus the bookkeeping needed to retire it
struct Connection<T> {
    transport: T,
    opened_at: Instant,
    /// Most recent transport-level error; consulted only when the transport
    /// closes, to classify the closure
    last_error: Option<TransportError>,
}

/// How a wait on the correlator ended
enum WaitOutcome {
    /// The invocation resolved on a still-open connection
    Completed(Result<Value, RelayError>),
    /// The invocation failed and the connection is dead; drop the handle
    Fatal(RelayError),
    /// Transient close; reconnect and resend the same frame
    Reconnect,
}

/// Client relaying invocations to the runner over a persistent connection
///
/// Create one per process and reuse it: the connection survives across
/// invocations and is only replaced on failure or lifespan rotation.
pub struct RelayClient<C: Connector> {
    config: RelayConfig,
    connector: C,
    connection: Option<Connection<C::Transport>>,
}

impl<C: Connector> RelayClient<C> {
    /// Create a new relay client; no connection is opened until the first
    /// invocation
    #[must_use]
    pub fn new(config: RelayConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            connection: None,
        }
    }

    /// Whether a connection is currently held
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Age of the current connection, if one is held
    #[must_use]
    pub fn connection_age(&self) -> Option<std::time::Duration> {
        self.connection
            .as_ref()
            .map(|conn| conn.opened_at.elapsed())
    }

    /// The configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Delegate one invocation to the runner and wait for its result
    ///
    /// Exactly one of success or error resolves each call. Transient
    /// transport failures are recovered internally by reconnecting and
    /// resending the same frame under the same correlation id; they are
    /// never surfaced.
    ///
    /// # Errors
    ///
    /// See [`RelayError`] for the four fatal outcomes.
    pub async fn invoke(&mut self, request: InvocationRequest) -> Result<Value, RelayError> {
        let correlation_id = CorrelationId::new();
        let frame = OutboundFrame::Request {
            correlation_id: correlation_id.clone(),
            remaining_time_budget_ms: request.remaining_time_ms,
            target_source_path: self.config.source_path.clone(),
            target_handler_name: self.config.handler_name.clone(),
            payload: request.payload,
            context: RequestContext {
                function_name: self.config.function_name.clone(),
                memory_limit_mb: self.config.memory_limit_mb,
                invocation_id: request.invocation_id,
            },
            env: env_snapshot::capture(),
        };

        tracing::debug!(
            correlation_id = %correlation_id,
            remaining_ms = request.remaining_time_ms,
            "Dispatching invocation"
        );

        loop {
            let mut conn = self.checkout_connection().await?;

            if let Err(err) = conn.transport.send(&frame).await {
                if err.is_unresolvable() {
                    return Err(RelayError::EndpointUnresolvable(err));
                }
                tracing::warn!(
                    correlation_id = %correlation_id,
                    error = %err,
                    "Send failed; reconnecting"
                );
                conn.transport.close().await;
                continue;
            }

            match self.await_response(&mut conn, &correlation_id).await {
                WaitOutcome::Completed(result) => {
                    // The connection outlives the invocation
                    self.connection = Some(conn);
                    return result;
                }
                WaitOutcome::Fatal(err) => return Err(err),
                WaitOutcome::Reconnect => {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        "Connection closed while pending; reconnecting and resending"
                    );
                }
            }
        }
    }

    /// Take ownership of a usable connection, rotating or opening as needed
    async fn checkout_connection(&mut self) -> Result<Connection<C::Transport>, RelayError> {
        if let Some(conn) = self.connection.take() {
            if conn.opened_at.elapsed() < self.config.lifespan {
                return Ok(conn);
            }

            tracing::info!(
                age_secs = conn.opened_at.elapsed().as_secs(),
                "Connection exceeded lifespan; rotating"
            );
            let mut retiring = conn;
            retiring.transport.close().await;
            // Dropped before the replacement opens; frames from the retired
            // socket can no longer reach the correlator.
        }

        loop {
            match self.connector.connect(&self.config.endpoint).await {
                Ok(transport) => {
                    tracing::info!(endpoint = %self.config.endpoint, "Connection opened");
                    return Ok(Connection {
                        transport,
                        opened_at: Instant::now(),
                        last_error: None,
                    });
                }
                Err(err) if err.is_unresolvable() => {
                    tracing::warn!(
                        endpoint = %self.config.endpoint,
                        error = %err,
                        "Endpoint unresolvable; giving up"
                    );
                    return Err(RelayError::EndpointUnresolvable(err));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Connect failed; retrying");
                }
            }
        }
    }

    /// Wait on the correlator until the pending invocation resolves or the
    /// connection dies
    async fn await_response(
        &mut self,
        conn: &mut Connection<C::Transport>,
        correlation_id: &CorrelationId,
    ) -> WaitOutcome {
        let keep_alive = tokio::time::sleep(self.config.idle_margin);
        tokio::pin!(keep_alive);
        // One keep-alive per dispatch: the infrastructure idle window resets
        // on any traffic, and a true timeout is bounded by the invocation's
        // own remaining-time budget.
        let mut keep_alive_armed = true;

        loop {
            tokio::select! {
                () = keep_alive.as_mut(), if keep_alive_armed => {
                    keep_alive_armed = false;
                    tracing::debug!(
                        correlation_id = %correlation_id,
                        "Idle margin reached; sending keep-alive"
                    );
                    if let Err(err) = conn.transport.send(&OutboundFrame::KeepAlive).await {
                        if err.is_unresolvable() {
                            return WaitOutcome::Fatal(RelayError::EndpointUnresolvable(err));
                        }
                        tracing::warn!(error = %err, "Keep-alive send failed");
                        return WaitOutcome::Reconnect;
                    }
                }

                event = conn.transport.recv() => match event {
                    Some(Ok(frame)) => match frame {
                        InboundFrame::Response { correlation_id: id, response_data, response_error } => {
                            if id != *correlation_id {
                                tracing::trace!(
                                    expected = %correlation_id,
                                    received = %id,
                                    "Discarding response with stale correlation id"
                                );
                                continue;
                            }
                            if let Some(encoded) = response_error {
                                return WaitOutcome::Completed(Err(RelayError::Remote(
                                    codec::decode(&encoded),
                                )));
                            }
                            return WaitOutcome::Completed(Ok(response_data.unwrap_or(Value::Null)));
                        }
                        InboundFrame::SendFailedNotConnected => {
                            return WaitOutcome::Completed(Err(RelayError::RunnerNotConnected));
                        }
                        InboundFrame::SendFailedUnknown => {
                            return WaitOutcome::Completed(Err(RelayError::DeliveryFailed));
                        }
                        InboundFrame::Unknown => {
                            tracing::trace!("Discarding frame with unknown action");
                        }
                    },
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "Transport error recorded");
                        conn.last_error = Some(err);
                    }
                    None => {
                        // The transport is gone either way; never restore it
                        match conn.last_error.take() {
                            Some(err) if err.is_unresolvable() => {
                                return WaitOutcome::Fatal(RelayError::EndpointUnresolvable(err));
                            }
                            _ => return WaitOutcome::Reconnect,
                        }
                    }
                }
            }
        }
    }
}

#[cfg(feature = "websocket")]
impl RelayClient<crate::transport::websocket::WebSocketConnector> {
    /// Create a client using the WebSocket transport
    #[must_use]
    pub fn websocket(config: RelayConfig) -> Self {
        Self::new(config, crate::transport::websocket::WebSocketConnector::new())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc;
    use tokio::time::advance;

    use super::*;

    // ========================================================================
    // Scripted transport
    // ========================================================================

    struct ScriptedTransport {
        inbound: mpsc::UnboundedReceiver<Result<InboundFrame, TransportError>>,
        outbound: mpsc::UnboundedSender<OutboundFrame>,
        closed: Arc<AtomicBool>,
        fail_sends: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&mut self, frame: &OutboundFrame) -> Result<(), TransportError> {
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(TransportError::SendFailed("broken pipe".to_string()));
            }
            let _ = self.outbound.send(frame.clone());
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>> {
            self.inbound.recv().await
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    /// Test-side handle to one scripted connection
    struct TransportHandle {
        inject: mpsc::UnboundedSender<Result<InboundFrame, TransportError>>,
        sent: mpsc::UnboundedReceiver<OutboundFrame>,
        closed: Arc<AtomicBool>,
    }

    impl TransportHandle {
        async fn expect_request(&mut self) -> OutboundFrame {
            let frame = self.sent.recv().await.expect("expected a frame");
            assert!(
                matches!(frame, OutboundFrame::Request { .. }),
                "expected a request frame, got {frame:?}"
            );
            frame
        }

        fn respond_to(&self, request: &OutboundFrame, data: Value) {
            let id = request.correlation_id().expect("request has id").clone();
            let _ = self.inject.send(Ok(InboundFrame::Response {
                correlation_id: id,
                response_data: Some(data),
                response_error: None,
            }));
        }
    }

    #[derive(Clone)]
    struct ScriptedConnector {
        queue: Arc<Mutex<VecDeque<Result<ScriptedTransport, TransportError>>>>,
        connects: Arc<AtomicUsize>,
    }

    impl ScriptedConnector {
        fn new() -> Self {
            Self {
                queue: Arc::new(Mutex::new(VecDeque::new())),
                connects: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn push_transport(&self) -> TransportHandle {
            self.push_transport_with(false)
        }

        fn push_transport_with(&self, fail_sends: bool) -> TransportHandle {
            let (inject, inbound) = mpsc::unbounded_channel();
            let (outbound, sent) = mpsc::unbounded_channel();
            let closed = Arc::new(AtomicBool::new(false));
            let transport = ScriptedTransport {
                inbound,
                outbound,
                closed: Arc::clone(&closed),
                fail_sends: Arc::new(AtomicBool::new(fail_sends)),
            };
            self.queue.lock().unwrap().push_back(Ok(transport));
            TransportHandle {
                inject,
                sent,
                closed,
            }
        }

        fn push_failure(&self, err: TransportError) {
            self.queue.lock().unwrap().push_back(Err(err));
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Transport = ScriptedTransport;

        async fn connect(&self, _endpoint: &str) -> Result<ScriptedTransport, TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.queue
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted connection left for connect()")
        }
    }

    fn test_client(connector: &ScriptedConnector) -> RelayClient<ScriptedConnector> {
        let config = RelayConfig::new()
            .with_source_path("dist/app.js")
            .with_handler_name("run")
            .with_function_name("orders")
            .with_memory_limit_mb(256);
        RelayClient::new(config, connector.clone())
    }

    fn request(payload: Value) -> InvocationRequest {
        InvocationRequest::new("inv-1", payload, 25_000)
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_fresh_process_round_trip() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = handle.expect_request().await;
            if let OutboundFrame::Request {
                payload,
                target_source_path,
                context,
                env,
                ..
            } = &req
            {
                assert_eq!(payload, &json!({"x": 1}));
                assert_eq!(target_source_path, "dist/app.js");
                assert_eq!(context.function_name, "orders");
                assert_eq!(context.invocation_id, "inv-1");
                // relay config must never leak through the env snapshot
                assert!(!env.contains_key("PATH"));
            }
            handle.respond_to(&req, json!({"y": 2}));
        });

        let result = client.invoke(request(json!({"x": 1}))).await.unwrap();
        assert_eq!(result, json!({"y": 2}));
        assert_eq!(connector.connects(), 1);
        assert!(client.is_connected());
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_invocation_reuses_connection() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let first = handle.expect_request().await;
            handle.respond_to(&first, json!(1));
            let second = handle.expect_request().await;
            // a fresh correlation id per invocation
            assert_ne!(first.correlation_id(), second.correlation_id());
            handle.respond_to(&second, json!(2));
        });

        assert_eq!(client.invoke(request(json!("a"))).await.unwrap(), json!(1));
        advance(Duration::from_secs(5)).await;
        assert_eq!(client.invoke(request(json!("b"))).await.unwrap(), json!(2));
        assert_eq!(connector.connects(), 1, "no unnecessary rotation");
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invocation_past_lifespan_rotates_once() {
        let connector = ScriptedConnector::new();
        let mut first = connector.push_transport();
        let mut second = connector.push_transport();
        let first_closed = Arc::clone(&first.closed);
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = first.expect_request().await;
            first.respond_to(&req, json!(1));
            let req = second.expect_request().await;
            second.respond_to(&req, json!(2));
        });

        client.invoke(request(json!("a"))).await.unwrap();
        advance(Duration::from_secs(31 * 60)).await;
        client.invoke(request(json!("b"))).await.unwrap();

        assert!(first_closed.load(Ordering::SeqCst), "old connection closed");
        assert_eq!(connector.connects(), 2, "exactly one rotation");
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_close_reconnects_and_resends_same_id() {
        let connector = ScriptedConnector::new();
        let mut first = connector.push_transport();
        let mut second = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let original = first.expect_request().await;
            let _ = first
                .inject
                .send(Err(TransportError::ReceiveFailed("ECONNRESET".to_string())));
            drop(first); // unsolicited close

            let resent = second.expect_request().await;
            assert_eq!(resent, original, "same payload and correlation id");
            second.respond_to(&resent, json!({"ok": true}));
        });

        let result = client.invoke(request(json!({"x": 1}))).await.unwrap();
        assert_eq!(result, json!({"ok": true}));
        assert_eq!(connector.connects(), 2, "exactly one reconnect per close");
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_close_stops_reconnecting() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let _ = handle.expect_request().await;
            let _ = handle.inject.send(Err(TransportError::Unresolvable(
                "getaddrinfo ENOTFOUND relay.internal".to_string(),
            )));
            drop(handle);
        });

        let err = client.invoke(request(json!(1))).await.unwrap_err();
        assert!(matches!(err, RelayError::EndpointUnresolvable(_)));
        assert_eq!(connector.connects(), 1, "zero reconnect attempts");
        assert!(!client.is_connected());
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_connect_fails_fast() {
        let connector = ScriptedConnector::new();
        connector.push_failure(TransportError::Unresolvable(
            "failed to lookup address information".to_string(),
        ));
        let mut client = test_client(&connector);

        let err = client.invoke(request(json!(1))).await.unwrap_err();
        assert!(matches!(err, RelayError::EndpointUnresolvable(_)));
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_connect_failure_retries_immediately() {
        let connector = ScriptedConnector::new();
        connector.push_failure(TransportError::ConnectionFailed(
            "connection refused".to_string(),
        ));
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = handle.expect_request().await;
            handle.respond_to(&req, json!("up"));
        });

        assert_eq!(client.invoke(request(json!(1))).await.unwrap(), json!("up"));
        assert_eq!(connector.connects(), 2);
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_not_connected_is_fatal_without_retry() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let _ = handle.expect_request().await;
            let _ = handle.inject.send(Ok(InboundFrame::SendFailedNotConnected));
            handle
        });

        let err = client.invoke(request(json!(1))).await.unwrap_err();
        assert!(matches!(err, RelayError::RunnerNotConnected));
        assert_eq!(connector.connects(), 1, "no retry attempted");
        // the socket itself stays usable for the next invocation
        assert!(client.is_connected());
        drop(script.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failed_unknown_is_fatal() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let _ = handle.expect_request().await;
            let _ = handle.inject.send(Ok(InboundFrame::SendFailedUnknown));
            handle
        });

        let err = client.invoke(request(json!(1))).await.unwrap_err();
        assert!(matches!(err, RelayError::DeliveryFailed));
        drop(script.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_and_unknown_frames_are_discarded() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = handle.expect_request().await;
            // response for a retired invocation
            let _ = handle.inject.send(Ok(InboundFrame::Response {
                correlation_id: CorrelationId("req_stale".to_string()),
                response_data: Some(json!("stale")),
                response_error: None,
            }));
            // frame with an action this relay does not know
            let _ = handle.inject.send(Ok(InboundFrame::Unknown));
            handle.respond_to(&req, json!("fresh"));
        });

        let result = client.invoke(request(json!(1))).await.unwrap();
        assert_eq!(result, json!("fresh"), "stale frames must not complete the invocation");
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_error_is_decoded() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = handle.expect_request().await;
            let id = req.correlation_id().unwrap().clone();
            let _ = handle.inject.send(Ok(InboundFrame::Response {
                correlation_id: id,
                response_data: None,
                response_error: Some(json!({
                    "name": "TypeError",
                    "message": "x is not a function",
                    "code": "ERR_NOT_FN",
                    "requestId": "abc-123",
                })),
            }));
        });

        let err = client.invoke(request(json!(1))).await.unwrap_err();
        match err {
            RelayError::Remote(remote) => {
                assert_eq!(remote.name, "TypeError");
                assert_eq!(remote.message, "x is not a function");
                assert_eq!(remote.code.as_deref(), Some("ERR_NOT_FN"));
                assert_eq!(remote.properties["requestId"], "abc-123");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_keep_alive_per_pending_request() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = handle.expect_request().await;

            // idle past the 9 minute margin: exactly one keep-alive arrives
            let keep_alive = handle.sent.recv().await.unwrap();
            assert_eq!(keep_alive, OutboundFrame::KeepAlive);

            // idle much longer: the timer must not rearm
            tokio::time::sleep(Duration::from_secs(20 * 60)).await;
            assert!(
                handle.sent.try_recv().is_err(),
                "keep-alive fired more than once"
            );

            handle.respond_to(&req, json!("late"));
        });

        let result = client.invoke(request(json!(1))).await.unwrap();
        assert_eq!(result, json!("late"));
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_on_open_socket_is_transient() {
        let connector = ScriptedConnector::new();
        let broken = connector.push_transport_with(true);
        let broken_closed = Arc::clone(&broken.closed);
        let mut replacement = connector.push_transport();
        let mut client = test_client(&connector);

        let script = tokio::spawn(async move {
            let req = replacement.expect_request().await;
            replacement.respond_to(&req, json!("recovered"));
            drop(broken);
        });

        let result = client.invoke(request(json!(1))).await.unwrap();
        assert_eq!(result, json!("recovered"));
        assert!(broken_closed.load(Ordering::SeqCst));
        assert_eq!(connector.connects(), 2);
        script.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_age_accessor() {
        let connector = ScriptedConnector::new();
        let mut handle = connector.push_transport();
        let mut client = test_client(&connector);
        assert!(client.connection_age().is_none());

        let script = tokio::spawn(async move {
            let req = handle.expect_request().await;
            handle.respond_to(&req, json!(1));
            handle
        });

        client.invoke(request(json!(1))).await.unwrap();
        advance(Duration::from_secs(60)).await;
        assert_eq!(client.connection_age(), Some(Duration::from_secs(60)));
        drop(script.await.unwrap());
    }
}
