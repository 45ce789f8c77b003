//! Read-only views handed to the presentation layer.

use roomsense_link::LinkStatus;
use roomsense_protocol::{Actuator, Metric};
use roomsense_telemetry::Sample;

/// Everything a render pass needs: connection status plus every channel's
/// current value and window. All data is copied out of the engine — holding
/// a snapshot never blocks a writer.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub status: LinkStatus,
    pub channels: Vec<ChannelSnapshot>,
    pub actuators: Vec<ActuatorSnapshot>,
}

/// One metric's view.
#[derive(Debug, Clone)]
pub struct ChannelSnapshot {
    pub metric: Metric,
    /// Latest value, or 0.0 before any reading.
    pub current: f64,
    /// Window contents, oldest first.
    pub window: Vec<Sample>,
}

/// One actuator's view.
#[derive(Debug, Clone)]
pub struct ActuatorSnapshot {
    pub actuator: Actuator,
    /// Last requested level. Optimistic — reflects intent even while the
    /// link is down.
    pub level: u8,
}

impl EngineSnapshot {
    /// Looks up one channel by metric.
    pub fn channel(&self, metric: Metric) -> Option<&ChannelSnapshot> {
        self.channels.iter().find(|c| c.metric == metric)
    }

    /// Looks up one actuator.
    pub fn actuator(&self, actuator: Actuator) -> Option<&ActuatorSnapshot> {
        self.actuators.iter().find(|a| a.actuator == actuator)
    }
}
