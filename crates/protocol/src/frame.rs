//! Inbound frame decoding.

use serde::Deserialize;

use crate::constants::MAX_FRAME_BYTES;
use crate::keys::Metric;

/// One decoded inbound frame.
///
/// The device sends small JSON objects with whichever readings it has,
/// e.g. `{"temp":25.3,"humidity":48.0}`. Unknown fields are ignored, so a
/// frame may carry zero, one, or all readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct SensorFrame {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub co2_ppm: Option<f64>,
}

/// Errors from frame decoding. Always local to one frame — the link stays
/// up and later frames are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame too large ({0} bytes)")]
    TooLarge(usize),

    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl SensorFrame {
    /// Parses one text frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        if text.len() > MAX_FRAME_BYTES {
            return Err(FrameError::TooLarge(text.len()));
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Readings present in this frame, in [`Metric::ALL`] order.
    pub fn readings(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        [
            (Metric::Temperature, self.temp),
            (Metric::Humidity, self.humidity),
            (Metric::AirQuality, self.co2_ppm),
        ]
        .into_iter()
        .filter_map(|(metric, value)| value.map(|v| (metric, v)))
    }

    /// Whether the frame carried no known readings.
    pub fn is_empty(&self) -> bool {
        self.temp.is_none() && self.humidity.is_none() && self.co2_ppm.is_none()
    }
}
