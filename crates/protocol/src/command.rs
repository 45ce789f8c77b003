//! Outbound actuator commands.

use crate::keys::Actuator;

/// An actuator command. Levels are clamped into 0–100 at construction, so
/// a `Command` is always sendable as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    actuator: Actuator,
    level: u8,
}

impl Command {
    /// Highest accepted level.
    pub const MAX_LEVEL: u8 = 100;

    /// Builds a command, clamping `level` into 0–100.
    pub fn new(actuator: Actuator, level: i32) -> Self {
        let level = level.clamp(0, i32::from(Self::MAX_LEVEL)) as u8;
        Self { actuator, level }
    }

    pub fn actuator(self) -> Actuator {
        self.actuator
    }

    pub fn level(self) -> u8 {
        self.level
    }

    /// Wire encoding: plain `key:level` text, e.g. `led:75`.
    pub fn encode(self) -> String {
        format!("{}:{}", self.actuator.wire_key(), self.level)
    }
}
