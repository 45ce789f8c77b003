//! Protocol-wide constants.

use std::time::Duration;

/// Default device endpoint. The firmware serves WebSocket on port 81.
pub const DEFAULT_ENDPOINT: &str = "ws://esp.local:81";

/// Upper bound for one inbound text frame. Sensor frames are tens of
/// bytes; anything larger is not ours and gets dropped unparsed.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Bound on the WebSocket dial + handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Keepalive ping interval while the link is open.
pub const PING_PERIOD: Duration = Duration::from_secs(5);

/// If nothing arrives for this long the link is considered dead.
/// Must exceed [`PING_PERIOD`] with margin.
pub const PONG_WAIT: Duration = Duration::from_secs(60);
