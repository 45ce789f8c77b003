//! Typed metric and actuator keys.

use serde::{Deserialize, Serialize};

/// Metrics the device reports.
///
/// The set is closed: firmware fields outside this list are dropped at the
/// decode boundary and never reach a channel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    AirQuality,
}

impl Metric {
    /// All metrics, in display order.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::AirQuality];

    /// Canonical name used in logs and snapshots.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::AirQuality => "air_quality",
        }
    }

    /// JSON field the firmware uses for this metric.
    pub fn wire_field(self) -> &'static str {
        match self {
            Metric::Temperature => "temp",
            Metric::Humidity => "humidity",
            Metric::AirQuality => "co2_ppm",
        }
    }

    /// Display unit.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::AirQuality => "ppm",
        }
    }
}

/// Controllable outputs accepting a 0–100 level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actuator {
    Light,
    Fan,
}

impl Actuator {
    /// All actuators, in display order.
    pub const ALL: [Actuator; 2] = [Actuator::Light, Actuator::Fan];

    /// Key used on the wire. The firmware calls its light channel `led`.
    pub fn wire_key(self) -> &'static str {
        match self {
            Actuator::Light => "led",
            Actuator::Fan => "fan",
        }
    }
}
