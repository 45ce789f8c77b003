//! Device link: one WebSocket to the sensor board.
//!
//! [`LinkSession`] owns a single live connection and its pump tasks; the
//! [`supervisor`] retry loop recreates sessions across failures with capped
//! exponential backoff. Everything the link has to say — status changes,
//! decoded frames, decode errors — flows through one [`LinkEvent`] channel
//! that the engine drains.

pub(crate) mod pumps;
pub mod session;
pub mod supervisor;
pub mod types;

pub use session::{LinkError, LinkSession};
pub use supervisor::{LinkHandle, run_link};
pub use types::{ConnectionState, FailReason, LinkEvent, LinkStatus, RetryPolicy};
