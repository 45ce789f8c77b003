use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use roomsense_protocol::{Metric, SensorFrame};

use crate::buffer::RingBuffer;
use crate::sample::Sample;

/// Default window length per channel. Matches the dashboard chart width:
/// ten points, one per minute of warm-up history.
pub const DEFAULT_CAPACITY: usize = 10;

/// Spacing between synthetic warm-up samples.
const SEED_SPACING_SECS: i64 = 60;

/// Named collection of per-metric sample windows.
///
/// The channel set is fixed at construction — one buffer per [`Metric`] —
/// and never grows. Unknown metric names cannot reach the store: they are
/// dropped during frame decoding, so every recorded reading already has a
/// typed key.
#[derive(Debug, Clone)]
pub struct ChannelStore {
    channels: HashMap<Metric, RingBuffer>,
}

impl ChannelStore {
    /// Creates a store with one empty buffer of `capacity` per metric.
    pub fn new(capacity: usize) -> Self {
        let channels = Metric::ALL
            .iter()
            .map(|&metric| (metric, RingBuffer::new(capacity)))
            .collect();
        Self { channels }
    }

    /// Appends one reading to its channel.
    pub fn record(&mut self, metric: Metric, value: f64, at: DateTime<Utc>) {
        if let Some(buf) = self.channels.get_mut(&metric) {
            buf.push(Sample::new(at, value));
        }
    }

    /// Applies every reading of one frame under a single timestamp, so a
    /// multi-metric frame lands in the store as one step.
    pub fn apply(&mut self, frame: &SensorFrame, at: DateTime<Utc>) {
        for (metric, value) in frame.readings() {
            self.record(metric, value, at);
        }
    }

    /// Latest value for a channel, or 0.0 if nothing was ever recorded.
    pub fn current_value(&self, metric: Metric) -> f64 {
        self.latest(metric).map_or(0.0, |s| s.value)
    }

    /// The most recent sample for a channel, if any.
    pub fn latest(&self, metric: Metric) -> Option<Sample> {
        self.channels.get(&metric).and_then(RingBuffer::latest)
    }

    /// Copied-out window for charting, oldest first.
    pub fn window(&self, metric: Metric) -> Vec<Sample> {
        self.channels
            .get(&metric)
            .map(RingBuffer::snapshot)
            .unwrap_or_default()
    }

    /// Fills every channel to capacity with synthetic samples around its
    /// baseline, spaced one minute apart and ending just before `now`.
    /// Charts have something to draw before the first real frame arrives.
    pub fn seed(&mut self, now: DateTime<Utc>) {
        for metric in Metric::ALL {
            let (baseline, amplitude) = seed_profile(metric);
            let Some(buf) = self.channels.get_mut(&metric) else {
                continue;
            };
            let count = buf.capacity();
            for i in 0..count {
                let at = now - Duration::seconds(SEED_SPACING_SECS * (count - i) as i64);
                let value = (baseline + amplitude * jitter_unit(i as u64)).max(0.0);
                buf.push(Sample::new(at, value));
            }
        }
    }
}

/// Chart-seed baseline and maximum deviation per metric: 24±2 °C,
/// 60±10 %, 800±200 ppm.
fn seed_profile(metric: Metric) -> (f64, f64) {
    match metric {
        Metric::Temperature => (24.0, 2.0),
        Metric::Humidity => (60.0, 10.0),
        Metric::AirQuality => (800.0, 200.0),
    }
}

/// Pseudo-random value in [-1.0, 1.0), mixed from the clock's sub-second
/// nanos and the sample index. Spread only has to look plausible on a
/// chart, which does not justify an RNG dependency.
fn jitter_unit(i: u64) -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    let mixed = (nanos ^ i.wrapping_mul(0x9E37_79B9_7F4A_7C15)).wrapping_mul(0x2545_F491_4F6C_DD1D);
    ((mixed >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn record_appends_to_the_right_channel() {
        let mut store = ChannelStore::new(5);
        store.record(Metric::Temperature, 21.5, now());

        assert_eq!(store.current_value(Metric::Temperature), 21.5);
        assert_eq!(store.window(Metric::Temperature).len(), 1);
        assert!(store.window(Metric::Humidity).is_empty());
        assert!(store.window(Metric::AirQuality).is_empty());
    }

    #[test]
    fn current_value_defaults_to_zero_when_empty() {
        let store = ChannelStore::new(5);
        assert_eq!(store.current_value(Metric::Humidity), 0.0);
        assert_eq!(store.latest(Metric::Humidity), None);
    }

    #[test]
    fn unknown_frame_fields_touch_nothing() {
        let mut store = ChannelStore::new(5);
        store.record(Metric::Temperature, 21.5, now());

        let frame = SensorFrame::parse(r#"{"pressure":1013.2,"voltage":3.3}"#).unwrap();
        store.apply(&frame, now());

        assert_eq!(store.window(Metric::Temperature).len(), 1);
        assert!(store.window(Metric::Humidity).is_empty());
        assert!(store.window(Metric::AirQuality).is_empty());
    }

    #[test]
    fn multi_metric_frame_updates_exactly_those_channels() {
        let mut store = ChannelStore::new(5);
        let at = now();
        let frame = SensorFrame::parse(r#"{"temp":22.0,"co2_ppm":710.0}"#).unwrap();

        store.apply(&frame, at);

        assert_eq!(store.current_value(Metric::Temperature), 22.0);
        assert_eq!(store.current_value(Metric::AirQuality), 710.0);
        assert!(store.window(Metric::Humidity).is_empty());
        // Both updates share the frame timestamp.
        assert_eq!(store.latest(Metric::Temperature).unwrap().at, at);
        assert_eq!(store.latest(Metric::AirQuality).unwrap().at, at);
    }

    #[test]
    fn full_channel_evicts_on_new_reading() {
        let mut store = ChannelStore::new(3);
        for i in 0..3 {
            store.record(Metric::Temperature, f64::from(i), now());
        }
        assert_eq!(store.window(Metric::Temperature).len(), 3);

        store.record(Metric::Temperature, 25.3, now());

        let window = store.window(Metric::Temperature);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].value, 1.0);
        assert_eq!(window[2].value, 25.3);
    }

    #[test]
    fn seed_fills_every_channel_to_capacity() {
        let mut store = ChannelStore::new(10);
        store.seed(now());

        for metric in Metric::ALL {
            assert_eq!(store.window(metric).len(), 10, "{}", metric.name());
        }
    }

    #[test]
    fn seeded_values_stay_near_the_baseline() {
        let mut store = ChannelStore::new(10);
        store.seed(now());

        for metric in Metric::ALL {
            let (baseline, amplitude) = seed_profile(metric);
            for sample in store.window(metric) {
                assert!(
                    (sample.value - baseline).abs() <= amplitude,
                    "{} sample {} outside {baseline}±{amplitude}",
                    metric.name(),
                    sample.value
                );
                assert!(sample.value >= 0.0);
            }
        }
    }

    #[test]
    fn seeded_timestamps_are_non_decreasing_and_before_now() {
        let at = now();
        let mut store = ChannelStore::new(10);
        store.seed(at);

        let window = store.window(Metric::Temperature);
        for pair in window.windows(2) {
            assert!(pair[0].at <= pair[1].at);
        }
        assert!(window.last().unwrap().at < at);
    }

    #[test]
    fn seeded_store_evicts_oldest_on_first_real_frame() {
        let at = now();
        let mut store = ChannelStore::new(10);
        store.seed(at);
        let oldest = store.window(Metric::Temperature)[0];

        let frame = SensorFrame::parse(r#"{"temp":25.3}"#).unwrap();
        store.apply(&frame, at);

        let window = store.window(Metric::Temperature);
        assert_eq!(window.len(), 10);
        assert_eq!(store.current_value(Metric::Temperature), 25.3);
        assert!(!window.contains(&oldest));
    }

    #[test]
    fn jitter_unit_stays_in_range() {
        for i in 0..1000 {
            let v = jitter_unit(i);
            assert!((-1.0..1.0).contains(&v), "{v}");
        }
    }
}
