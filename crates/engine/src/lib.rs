//! Telemetry engine — the component the rest of the application talks to.
//!
//! Wires the device link's event channel into the channel store, seeds
//! synthetic warm-up samples so charts render before the first real frame,
//! and translates actuator intents into wire commands. The presentation
//! layer only ever sees [`EngineSnapshot`] copies.

pub mod config;
pub mod engine;
pub mod snapshot;

pub use config::EngineConfig;
pub use engine::TelemetryEngine;
pub use snapshot::{ActuatorSnapshot, ChannelSnapshot, EngineSnapshot};
