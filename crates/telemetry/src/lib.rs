//! Rolling-window telemetry state.
//!
//! One fixed-capacity ring buffer per metric. The engine's event loop is
//! the only writer; the presentation layer reads copied-out snapshots and
//! never holds a reference into the buffers.

pub mod buffer;
pub mod sample;
pub mod store;

pub use buffer::RingBuffer;
pub use sample::Sample;
pub use store::{ChannelStore, DEFAULT_CAPACITY};
