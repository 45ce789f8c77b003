//! Public types for the device link.

use std::time::Duration;

use roomsense_protocol::SensorFrame;

/// Connection lifecycle for the device link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started.
    Idle,
    /// WebSocket dial + handshake in progress.
    Connecting,
    /// Live — frames flowing, commands allowed.
    Open,
    /// Local close requested, socket winding down.
    Closing,
    /// Link is down.
    Closed,
    /// The last connect attempt failed; a retry may follow.
    Failed(FailReason),
}

/// Why a connect attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// TCP or DNS failure — device off, asleep, or misaddressed.
    Unreachable,
    /// The handshake did not finish within the deadline.
    Timeout,
    /// The endpoint answered, but not with a WebSocket.
    Protocol,
}

/// Connection status as shown to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Connected,
    Error(FailReason),
    Disconnected,
}

impl From<ConnectionState> for LinkStatus {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Connecting => LinkStatus::Connecting,
            ConnectionState::Open => LinkStatus::Connected,
            ConnectionState::Failed(reason) => LinkStatus::Error(reason),
            ConnectionState::Idle | ConnectionState::Closing | ConnectionState::Closed => {
                LinkStatus::Disconnected
            }
        }
    }
}

/// Everything the link reports upward, drained from a single channel.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// Connection status changed.
    Status(LinkStatus),
    /// A decoded sensor frame.
    Frame(SensorFrame),
    /// An inbound frame that did not parse. The session stays open.
    DecodeError { detail: String },
}

/// Backoff configuration for automatic reconnection.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the delay between attempts.
    pub max_delay: Duration,
    /// Multiplier for each subsequent attempt.
    pub backoff_factor: f64,
    /// Consecutive failed attempts before the link parks itself.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(15),
            backoff_factor: 2.0,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Calculates the delay for a given attempt number (1-based),
    /// with ±25% jitter to avoid reconnect bursts.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        let capped = secs.min(self.max_delay.as_secs_f64());
        let jitter = capped * 0.25;
        let offset = (std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos() as f64
            / u32::MAX as f64)
            * 2.0
            - 1.0; // [-1.0, 1.0)
        let with_jitter = (capped + jitter * offset).max(0.05);
        Duration::from_secs_f64(with_jitter)
    }

    /// Whether another attempt is allowed after `failures` consecutive
    /// failed connects.
    pub fn allows(&self, failures: u32) -> bool {
        self.max_attempts.is_none_or(|max| failures < max)
    }
}
