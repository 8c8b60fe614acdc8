//! Watermark state tracking for the monitored queue
//!
//! The monitor follows the queue's fill level against three thresholds and
//! reports each threshold crossing exactly once per direction. Upward
//! crossings step through every intermediate state so that a single push can
//! produce several transitions; the downward path collapses to `Normal` in
//! one transition when the fill level drops to the low watermark.
//!
//! The monitor does not count elements itself: callers hand it the fill
//! level observed inside the FIFO's critical section. Under concurrency
//! those observations may arrive slightly out of order; every observation is
//! a size the queue really had, and the state machine is edge-triggered, so
//! each crossing still emits exactly once in the serialized monitor order.

use std::fmt;

/// Load state of a monitored queue, derived from its fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Fill level below the high watermark (or not yet recovered past low).
    Normal,
    /// Fill level reached the high watermark.
    HighWatermark,
    /// Fill level reached the second high watermark.
    HighWatermark2,
    /// Queue is at capacity.
    Filled,
}

impl QueueState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            QueueState::Normal => 0,
            QueueState::HighWatermark => 1,
            QueueState::HighWatermark2 => 2,
            QueueState::Filled => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> QueueState {
        match value {
            0 => QueueState::Normal,
            1 => QueueState::HighWatermark,
            2 => QueueState::HighWatermark2,
            _ => QueueState::Filled,
        }
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueueState::Normal => "normal",
            QueueState::HighWatermark => "high-watermark",
            QueueState::HighWatermark2 => "high-watermark-2",
            QueueState::Filled => "filled",
        };
        f.write_str(label)
    }
}

/// Size thresholds that trigger state transitions.
///
/// Invariant: `low < high <= high2 <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermarks {
    pub low: usize,
    pub high: usize,
    pub high2: usize,
}

impl Watermarks {
    pub fn new(low: usize, high: usize, high2: usize) -> Self {
        Self { low, high, high2 }
    }

    /// Thresholds that keep the queue in `Normal` until it is completely
    /// full: `(0, capacity, capacity)`.
    pub fn disarmed(capacity: usize) -> Self {
        Self {
            low: 0,
            high: capacity,
            high2: capacity,
        }
    }

    /// Panics unless `low < high <= high2 <= capacity`.
    pub(crate) fn assert_valid(&self, capacity: usize) {
        assert!(
            self.low < self.high,
            "low watermark ({}) must be below high watermark ({})",
            self.low,
            self.high
        );
        assert!(
            self.high <= self.high2,
            "high watermark ({}) must not exceed high watermark 2 ({})",
            self.high,
            self.high2
        );
        assert!(
            self.high2 <= capacity,
            "high watermark 2 ({}) must not exceed capacity ({})",
            self.high2,
            capacity
        );
    }
}

/// Computes state transitions from fill-level observations.
///
/// All methods are called with the owning queue's monitor lock held, which
/// serializes transitions and makes each crossing emit exactly once.
#[derive(Debug)]
pub(crate) struct WatermarkMonitor {
    capacity: usize,
    watermarks: Watermarks,
    state: QueueState,
}

impl WatermarkMonitor {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            watermarks: Watermarks::disarmed(capacity),
            state: QueueState::Normal,
        }
    }

    pub(crate) fn state(&self) -> QueueState {
        self.state
    }

    pub(crate) fn watermarks(&self) -> Watermarks {
        self.watermarks
    }

    /// Replaces the thresholds without touching `state` and without emitting
    /// transitions, even when the current fill level would map to a
    /// different state under the new thresholds. The state catches up on the
    /// next push or pop.
    pub(crate) fn set_watermarks(&mut self, watermarks: Watermarks) {
        watermarks.assert_valid(self.capacity);
        self.watermarks = watermarks;
    }

    /// Records a successful push that left the queue holding `size`
    /// elements; emits one `(old, new, size)` per upward transition,
    /// stepping through intermediate states in order.
    pub(crate) fn record_push(
        &mut self,
        size: usize,
        mut emit: impl FnMut(QueueState, QueueState, usize),
    ) {
        loop {
            let next = match self.state {
                QueueState::Normal if size >= self.watermarks.high => QueueState::HighWatermark,
                QueueState::HighWatermark if size >= self.watermarks.high2 => {
                    QueueState::HighWatermark2
                }
                QueueState::HighWatermark2 if size >= self.capacity => QueueState::Filled,
                _ => break,
            };
            let old = self.state;
            self.state = next;
            emit(old, next, size);
        }
    }

    /// Records a successful pop that left the queue holding `size` elements;
    /// emits the single downward transition when the fill level reaches the
    /// low watermark.
    pub(crate) fn record_pop(
        &mut self,
        size: usize,
        mut emit: impl FnMut(QueueState, QueueState, usize),
    ) {
        if self.state != QueueState::Normal && size <= self.watermarks.low {
            let old = self.state;
            self.state = QueueState::Normal;
            emit(old, QueueState::Normal, size);
        }
    }

    /// Silent drain: state back to `Normal`, no transitions.
    pub(crate) fn reset(&mut self) {
        self.state = QueueState::Normal;
    }
}
