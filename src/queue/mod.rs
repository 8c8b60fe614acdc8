//! Monitored Bounded Queue Component
//!
//! A fixed-capacity multi-producer/multi-consumer FIFO wrapped with
//! watermark-based load tracking. This is the central backpressure primitive
//! of the tool: producers block (or fail fast) when the queue is full, and a
//! pluggable event sink receives a notification each time the fill level
//! crosses one of three thresholds.
//!
//! # Overview
//!
//! - **Multiple Producers / Consumers**: any number of threads may push and
//!   pop concurrently; blocking, non-blocking and timed variants are provided
//! - **Watermark States**: `Normal`, `HighWatermark`, `HighWatermark2` and
//!   `Filled`, derived from the fill level against configurable thresholds
//! - **Exactly-Once Signalling**: each threshold crossing, in each direction,
//!   produces exactly one event regardless of producer/consumer interleaving
//! - **Ownership Transfer**: elements are moved into the queue on push and
//!   moved back out on pop; the queue never inspects element contents
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ Producer A │   │ Producer B │   │ Producer C │
//! └─────┬──────┘   └─────┬──────┘   └─────┬──────┘
//!       │ push           │ push           │ push
//!       ▼                ▼                ▼
//! ┌─────────────────────────────────────────────────┐
//! │              MonitoredQueue<T>                  │
//! │  ┌───────────────────┐  ┌────────────────────┐  │
//! │  │   BoundedFifo<T>  │  │  WatermarkMonitor  │  │
//! │  │ ┌──┬──┬──┬──┬──┐  │  │  low / high/high2  ├──┼──▶ QueueEventSink
//! │  │ │  │  │  │  │  │  │  │  (size, state)     │  │    (old, new, size)
//! │  │ └──┴──┴──┴──┴──┘  │  └────────────────────┘  │
//! │  └───────────────────┘                          │
//! └───────┬───────────────────┬─────────────────────┘
//!         │ pop               │ pop
//! ┌───────┴────┐      ┌───────┴────┐
//! │ Consumer A │      │ Consumer B │
//! └────────────┘      └────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use mqpost::queue::{MonitoredQueue, QueueState};
//!
//! let queue = MonitoredQueue::new(10);
//! queue.set_watermarks(2, 5, 8);
//! queue.set_event_sink(|old: QueueState, new: QueueState, size: usize| {
//!     eprintln!("load changed {old} -> {new} at {size} elements");
//! });
//!
//! queue.push_back("job").unwrap();
//! assert_eq!(queue.num_elements(), 1);
//! assert_eq!(queue.pop_front(), "job");
//! assert!(queue.is_empty());
//! ```

mod config;
mod error;
mod fifo;
mod monitored;
mod state;
mod traits;

pub use config::{QueueConfig, QueueConfigError};
pub use error::{PushError, TimedPopError, TryPopError, TryPushError};
pub use fifo::BoundedFifo;
pub use monitored::MonitoredQueue;
pub use state::{QueueState, Watermarks};
pub use traits::QueueEventSink;

#[cfg(test)]
mod tests;
