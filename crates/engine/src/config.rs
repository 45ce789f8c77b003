//! Engine configuration.

use roomsense_link::RetryPolicy;
use roomsense_protocol::constants::DEFAULT_ENDPOINT;
use roomsense_telemetry::DEFAULT_CAPACITY;

/// Configuration for a [`TelemetryEngine`](crate::TelemetryEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Device WebSocket endpoint.
    pub endpoint: String,
    /// Samples kept per channel window.
    pub capacity: usize,
    /// Reconnection backoff policy for the link.
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            capacity: DEFAULT_CAPACITY,
            retry: RetryPolicy::default(),
        }
    }
}
