use std::collections::VecDeque;

use crate::sample::Sample;

/// Fixed-capacity window of samples with overwrite-oldest eviction.
///
/// Backed by a `VecDeque`; pushing at capacity drops the oldest sample
/// first. Order is oldest → newest. Each buffer is owned by exactly one
/// channel — never shared.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl RingBuffer {
    /// Creates an empty buffer holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest when full. Never fails.
    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Independent oldest-first copy of the current window.
    ///
    /// The returned vector never aliases internal storage; callers can
    /// mutate it without corrupting the buffer.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// The most recently pushed sample, or `None` if nothing was ever
    /// pushed.
    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer is at full capacity.
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn sample(value: f64) -> Sample {
        Sample::new(Utc::now(), value)
    }

    #[test]
    fn push_under_capacity() {
        let mut buf = RingBuffer::new(5);
        buf.push(sample(1.0));
        buf.push(sample(2.0));
        buf.push(sample(3.0));

        assert_eq!(buf.len(), 3);
        assert!(!buf.is_full());
        let values: Vec<f64> = buf.snapshot().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn push_over_capacity_evicts_oldest() {
        let mut buf = RingBuffer::new(3);
        for i in 1..=5 {
            buf.push(sample(f64::from(i)));
        }

        assert_eq!(buf.len(), 3);
        assert!(buf.is_full());
        let values: Vec<f64> = buf.snapshot().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn window_length_is_min_of_pushes_and_capacity() {
        let mut buf = RingBuffer::new(4);
        for i in 0..10 {
            buf.push(sample(f64::from(i)));
            assert_eq!(buf.snapshot().len(), usize::min(i as usize + 1, 4));
        }
    }

    #[test]
    fn empty_buffer() {
        let buf = RingBuffer::new(10);
        assert!(buf.is_empty());
        assert_eq!(buf.latest(), None);
        assert!(buf.snapshot().is_empty());
    }

    #[test]
    fn latest_returns_newest() {
        let mut buf = RingBuffer::new(3);
        buf.push(sample(1.0));
        buf.push(sample(2.0));
        buf.push(sample(3.0));
        buf.push(sample(4.0)); // evicts 1.0

        assert_eq!(buf.latest().map(|s| s.value), Some(4.0));
    }

    #[test]
    fn snapshot_is_independent_of_storage() {
        let mut buf = RingBuffer::new(3);
        buf.push(sample(1.0));

        let mut snap = buf.snapshot();
        snap[0].value = 99.0;
        snap.clear();

        assert_eq!(buf.len(), 1);
        assert_eq!(buf.latest().map(|s| s.value), Some(1.0));
    }

    #[test]
    fn timestamps_keep_insertion_order() {
        let base = Utc::now();
        let mut buf = RingBuffer::new(3);
        // Out-of-order wall-clock times — insertion order wins.
        buf.push(Sample::new(base, 1.0));
        buf.push(Sample::new(base - Duration::seconds(5), 2.0));

        let snap = buf.snapshot();
        assert_eq!(snap[0].value, 1.0);
        assert_eq!(snap[1].value, 2.0);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = RingBuffer::new(0);
    }
}
