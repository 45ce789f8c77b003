//! Wire protocol for the sensor device link.
//!
//! Inbound traffic is small JSON text frames carrying whichever readings
//! the firmware has; outbound traffic is plain `key:level` command text.
//! Metric and actuator names are validated once at this boundary and are
//! typed enums everywhere else.

pub mod command;
pub mod constants;
pub mod frame;
pub mod keys;

pub use command::Command;
pub use frame::{FrameError, SensorFrame};
pub use keys::{Actuator, Metric};
