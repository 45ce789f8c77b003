use chrono::{DateTime, Utc};
use serde::Serialize;

/// One timestamped reading. Immutable once created.
///
/// Within a buffer, timestamps are non-decreasing in insertion order.
/// Insertion order is authoritative — a jittering source clock does not
/// reorder the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub at: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(at: DateTime<Utc>, value: f64) -> Self {
        Self { at, value }
    }
}
