//! MonitoredQueue façade combining the FIFO and the watermark monitor
//!
//! Every successful push or pop updates the watermark monitor on the calling
//! thread, after the FIFO mutation and before the operation returns. The
//! monitor receives the fill level observed inside the FIFO's critical
//! section, and the monitor and the installed event sink live behind one
//! mutex: the state transition and its notification form a single
//! linearization point, so concurrent callers observe a consistent state
//! sequence and each threshold crossing is reported exactly once. Two racing
//! callers may reach the monitor in an order that differs from the order of
//! their FIFO mutations; the state machine is edge-triggered on real
//! observations, so this reordering never doubles or drops an event.

use crate::queue::config::QueueConfig;
use crate::queue::error::{PushError, TimedPopError, TryPopError, TryPushError};
use crate::queue::fifo::BoundedFifo;
use crate::queue::state::{QueueState, WatermarkMonitor, Watermarks};
use crate::queue::traits::QueueEventSink;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[cfg(debug_assertions)]
thread_local! {
    static IN_SINK: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

/// Panics in debug builds when a queue mutator runs from inside an event
/// sink callback on the same thread.
fn assert_not_reentrant() {
    #[cfg(debug_assertions)]
    IN_SINK.with(|flag| {
        assert!(
            !flag.get(),
            "event sink must not call back into the monitored queue"
        );
    });
}

struct MonitorSlot {
    monitor: WatermarkMonitor,
    sink: Option<Box<dyn QueueEventSink>>,
}

/// Bounded FIFO augmented with watermark tracking.
///
/// The queue is safe to share across threads behind an `Arc`; any thread may
/// push, pop, reset, or reconfigure watermarks. See the module docs for the
/// event-ordering guarantees.
pub struct MonitoredQueue<T> {
    fifo: BoundedFifo<T>,
    slot: Mutex<MonitorSlot>,
    // Lock-free mirror of the monitor's state for the observers.
    state: AtomicU8,
    timed_pops: bool,
}

impl<T> MonitoredQueue<T> {
    /// Create a queue without timed-pop support.
    ///
    /// Watermarks default to `(0, capacity, capacity)` until
    /// [`set_watermarks`](Self::set_watermarks) is called.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, false)
    }

    /// Create a queue supporting [`timed_pop_front`](Self::timed_pop_front).
    pub fn with_timed_pops(capacity: usize) -> Self {
        Self::build(capacity, true)
    }

    /// Build a queue from a configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration violates the capacity or watermark
    /// invariants; call [`QueueConfig::validate`] first to report those as
    /// errors instead.
    pub fn from_config(config: &QueueConfig) -> Self {
        let queue = Self::build(config.capacity, config.timed_pops);
        let watermarks = config.watermarks();
        queue.set_watermarks(watermarks.low, watermarks.high, watermarks.high2);
        queue
    }

    fn build(capacity: usize, timed_pops: bool) -> Self {
        Self {
            fifo: BoundedFifo::new(capacity),
            slot: Mutex::new(MonitorSlot {
                monitor: WatermarkMonitor::new(capacity),
                sink: None,
            }),
            state: AtomicU8::new(QueueState::Normal.as_u8()),
            timed_pops,
        }
    }

    /// Install the event sink receiving `(old_state, new_state, size)` on
    /// every transition. At most one sink is active; installing a new one
    /// replaces the previous.
    pub fn set_event_sink(&self, sink: impl QueueEventSink + 'static) {
        assert_not_reentrant();
        let mut slot = self.slot.lock().unwrap();
        slot.sink = Some(Box::new(sink));
    }

    /// Remove the installed event sink, if any.
    pub fn clear_event_sink(&self) {
        assert_not_reentrant();
        let mut slot = self.slot.lock().unwrap();
        slot.sink = None;
    }

    /// Append an element, blocking while the queue is full.
    pub fn push_back(&self, value: T) -> Result<(), PushError<T>> {
        assert_not_reentrant();
        let size = self.fifo.push_back_counted(value)?;
        self.after_push(size);
        Ok(())
    }

    /// Append an element without blocking.
    pub fn try_push_back(&self, value: T) -> Result<(), TryPushError<T>> {
        assert_not_reentrant();
        let size = self.fifo.try_push_back_counted(value)?;
        self.after_push(size);
        Ok(())
    }

    /// Remove the front element, blocking until one is available.
    pub fn pop_front(&self) -> T {
        assert_not_reentrant();
        let (value, size) = self.fifo.pop_front_counted();
        self.after_pop(size);
        value
    }

    /// Remove the front element without blocking.
    pub fn try_pop_front(&self) -> Result<T, TryPopError> {
        assert_not_reentrant();
        let (value, size) = self.fifo.try_pop_front_counted()?;
        self.after_pop(size);
        Ok(value)
    }

    /// Remove the front element, waiting up to `timeout` for one to arrive.
    ///
    /// # Panics
    ///
    /// Panics unless the queue was constructed with timed-pop support
    /// ([`with_timed_pops`](Self::with_timed_pops) or a configuration with
    /// `timed_pops = true`).
    pub fn timed_pop_front(&self, timeout: Duration) -> Result<T, TimedPopError> {
        assert!(
            self.timed_pops,
            "timed_pop_front requires a queue constructed with timed-pop support"
        );
        assert_not_reentrant();
        let (value, size) = self.fifo.timed_pop_front_counted(timeout)?;
        self.after_pop(size);
        Ok(value)
    }

    /// Drop all elements and return the state to normal.
    ///
    /// The drain is silent: no transition events are emitted for the dropped
    /// elements. Must not run concurrently with pushers or poppers.
    pub fn reset(&self) {
        assert_not_reentrant();
        self.fifo.reset();
        let mut slot = self.slot.lock().unwrap();
        slot.monitor.reset();
        self.state
            .store(QueueState::Normal.as_u8(), Ordering::Release);
    }

    /// Replace the watermark thresholds.
    ///
    /// No events are emitted and the current state is left untouched, even
    /// when the fill level would map to a different state under the new
    /// thresholds; the state catches up on the next push or pop.
    ///
    /// # Panics
    ///
    /// Panics unless `low < high <= high2 <= capacity`.
    pub fn set_watermarks(&self, low: usize, high: usize, high2: usize) {
        assert_not_reentrant();
        let mut slot = self.slot.lock().unwrap();
        slot.monitor.set_watermarks(Watermarks::new(low, high, high2));
    }

    /// Fail pending and future pushes; consumers keep draining.
    pub fn disable(&self) {
        self.fifo.disable();
    }

    /// Allow pushes again after a [`disable`](Self::disable).
    pub fn enable(&self) {
        self.fifo.enable();
    }

    /// Current load state. Never blocks.
    pub fn state(&self) -> QueueState {
        QueueState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current element count. Never blocks; may be momentarily stale under
    /// concurrent mutation.
    pub fn num_elements(&self) -> usize {
        self.fifo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    pub fn capacity(&self) -> usize {
        self.fifo.capacity()
    }

    pub fn supports_timed_pops(&self) -> bool {
        self.timed_pops
    }

    pub fn low_watermark(&self) -> usize {
        assert_not_reentrant();
        self.slot.lock().unwrap().monitor.watermarks().low
    }

    pub fn high_watermark(&self) -> usize {
        assert_not_reentrant();
        self.slot.lock().unwrap().monitor.watermarks().high
    }

    pub fn high_watermark2(&self) -> usize {
        assert_not_reentrant();
        self.slot.lock().unwrap().monitor.watermarks().high2
    }

    fn after_push(&self, size: usize) {
        let mut slot = self.slot.lock().unwrap();
        let MonitorSlot { monitor, sink } = &mut *slot;
        monitor.record_push(size, |old, new, size| Self::dispatch(sink, old, new, size));
        self.state.store(monitor.state().as_u8(), Ordering::Release);
    }

    fn after_pop(&self, size: usize) {
        let mut slot = self.slot.lock().unwrap();
        let MonitorSlot { monitor, sink } = &mut *slot;
        monitor.record_pop(size, |old, new, size| Self::dispatch(sink, old, new, size));
        self.state.store(monitor.state().as_u8(), Ordering::Release);
    }

    fn dispatch(
        sink: &mut Option<Box<dyn QueueEventSink>>,
        old: QueueState,
        new: QueueState,
        size: usize,
    ) {
        if let Some(sink) = sink {
            #[cfg(debug_assertions)]
            IN_SINK.with(|flag| flag.set(true));

            sink.on_state_change(old, new, size);

            #[cfg(debug_assertions)]
            IN_SINK.with(|flag| flag.set(false));
        }
    }
}

impl<T> std::fmt::Debug for MonitoredQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoredQueue")
            .field("capacity", &self.capacity())
            .field("size", &self.num_elements())
            .field("state", &self.state())
            .field("timed_pops", &self.timed_pops)
            .finish()
    }
}
