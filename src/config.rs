//! Relay Configuration
//!
//! Configuration for the relay client: where to connect, what to report as
//! the delegated work's location, and the two timing knobs that drive the
//! connection lifecycle.
//!
//! # Timing
//!
//! - `lifespan`: maximum age of a connection before it is proactively rotated
//!   (default 30 minutes, an externally imposed cap on connection lifetime)
//! - `idle_margin`: how long to wait on a pending response before sending a
//!   keep-alive frame (default 9 minutes, chosen below the 10-minute
//!   idle-close window enforced by intermediate infrastructure)

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum connection age before rotation
pub const CONNECTION_LIFESPAN: Duration = Duration::from_secs(30 * 60);

/// Delay before a single keep-alive is sent on a pending request
///
/// Kept below the 10-minute idle-close threshold of intermediate
/// infrastructure; any traffic resets that window, so one frame is enough.
pub const KEEP_ALIVE_MARGIN: Duration = Duration::from_secs(9 * 60);

/// Configuration for a [`RelayClient`](crate::RelayClient)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Endpoint the relay connects to (e.g. "wss://relay.internal:8443")
    pub endpoint: String,
    /// Source path reported as the delegated work's location
    pub source_path: String,
    /// Handler name reported as the delegated work's entry point
    pub handler_name: String,
    /// Function name forwarded in the request context
    pub function_name: String,
    /// Memory limit (MB) forwarded in the request context
    pub memory_limit_mb: u32,
    /// Maximum connection age before proactive rotation
    pub lifespan: Duration,
    /// Idle margin before the keep-alive frame is sent
    pub idle_margin: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:8765".to_string(),
            source_path: String::new(),
            handler_name: "handler".to_string(),
            function_name: String::new(),
            memory_limit_mb: 128,
            lifespan: CONNECTION_LIFESPAN,
            idle_margin: KEEP_ALIVE_MARGIN,
        }
    }
}

impl RelayConfig {
    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from `RELAY_*` environment variables
    ///
    /// Unset variables fall back to defaults. The same variable names are on
    /// the environment-snapshot exclusion list, so relay configuration never
    /// leaks into forwarded requests.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("RELAY_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(source_path) = std::env::var("RELAY_SOURCE_PATH") {
            config.source_path = source_path;
        }
        if let Ok(handler_name) = std::env::var("RELAY_HANDLER_NAME") {
            config.handler_name = handler_name;
        }
        if let Ok(function_name) = std::env::var("RELAY_FUNCTION_NAME") {
            config.function_name = function_name;
        }
        if let Ok(memory) = std::env::var("RELAY_MEMORY_LIMIT_MB") {
            if let Ok(memory) = memory.parse() {
                config.memory_limit_mb = memory;
            }
        }
        config
    }

    /// Set the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the reported source path
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<String>) -> Self {
        self.source_path = source_path.into();
        self
    }

    /// Set the reported handler name
    #[must_use]
    pub fn with_handler_name(mut self, handler_name: impl Into<String>) -> Self {
        self.handler_name = handler_name.into();
        self
    }

    /// Set the function name forwarded in the request context
    #[must_use]
    pub fn with_function_name(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = function_name.into();
        self
    }

    /// Set the memory limit forwarded in the request context
    #[must_use]
    pub fn with_memory_limit_mb(mut self, memory_limit_mb: u32) -> Self {
        self.memory_limit_mb = memory_limit_mb;
        self
    }

    /// Set the connection lifespan
    #[must_use]
    pub fn with_lifespan(mut self, lifespan: Duration) -> Self {
        self.lifespan = lifespan;
        self
    }

    /// Set the keep-alive idle margin
    #[must_use]
    pub fn with_idle_margin(mut self, idle_margin: Duration) -> Self {
        self.idle_margin = idle_margin;
        self
    }

    /// Create a config suitable for testing (shorter timing windows)
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            lifespan: Duration::from_millis(500),
            idle_margin: Duration::from_millis(100),
            ..Default::default()
        }
    }
}
