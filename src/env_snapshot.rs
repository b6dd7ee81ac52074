//! Environment Snapshot
//!
//! Builds the environment map forwarded with each request. Every process
//! environment variable is forwarded verbatim except an enumerated list of
//! runtime-internal names: relay configuration, host bookkeeping, and
//! shell/session variables that would be wrong or meaningless on the runner.

use std::collections::BTreeMap;

/// Variables never forwarded to the runner
///
/// Relay configuration first, then host-runtime bookkeeping, then
/// shell/session state.
const EXCLUDED_VARS: &[&str] = &[
    "RELAY_ENDPOINT",
    "RELAY_SOURCE_PATH",
    "RELAY_HANDLER_NAME",
    "RELAY_FUNCTION_NAME",
    "RELAY_MEMORY_LIMIT_MB",
    "LOG_GROUP_NAME",
    "LOG_STREAM_NAME",
    "LD_LIBRARY_PATH",
    "TASK_ROOT",
    "RUNTIME_API_ENDPOINT",
    "EXECUTION_ENV",
    "TRACE_COLLECTOR_ADDR",
    "TRACE_ID",
    "PATH",
    "PWD",
    "LANG",
    "TZ",
    "SHLVL",
];

/// Filter an environment map down to the forwardable variables
pub fn filtered<I, K, V>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    vars.into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, _)| !EXCLUDED_VARS.contains(&k.as_str()))
        .collect()
}

/// Snapshot the live process environment, filtered for forwarding
#[must_use]
pub fn capture() -> BTreeMap<String, String> {
    filtered(std::env::vars())
}
