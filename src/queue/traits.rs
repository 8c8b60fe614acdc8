//! Traits for the queue system

use crate::queue::state::QueueState;

/// Observer for watermark state transitions.
///
/// The sink is invoked synchronously on the thread whose push or pop caused
/// the transition, while the queue's monitor lock is held. Implementations
/// must therefore return promptly and must never call back into the queue;
/// long-running work belongs on another thread. Re-entry is a contract
/// violation and is detected in debug builds.
///
/// A plain closure works as a sink:
///
/// ```rust
/// use mqpost::queue::{MonitoredQueue, QueueState};
///
/// let queue: MonitoredQueue<u32> = MonitoredQueue::new(16);
/// queue.set_event_sink(|old: QueueState, new: QueueState, size: usize| {
///     log::warn!("queue load {} -> {} at {} elements", old, new, size);
/// });
/// ```
pub trait QueueEventSink: Send {
    /// Called once per state transition with the state before and after the
    /// crossing and the fill level that triggered it.
    fn on_state_change(&self, old_state: QueueState, new_state: QueueState, size: usize);
}

impl<F> QueueEventSink for F
where
    F: Fn(QueueState, QueueState, usize) + Send,
{
    fn on_state_change(&self, old_state: QueueState, new_state: QueueState, size: usize) {
        self(old_state, new_state, size)
    }
}
