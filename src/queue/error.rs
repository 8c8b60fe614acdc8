//! Queue Error Types
//!
//! Per-operation error enums in the style of `std::sync::mpsc`: push errors
//! carry the rejected element back to the caller so no value is ever lost on
//! a failed enqueue.

/// Error returned by a blocking push.
///
/// A blocking push only fails when the queue has been disabled; the rejected
/// element is handed back inside the error.
#[derive(Debug, thiserror::Error)]
pub enum PushError<T> {
    #[error("queue is disabled")]
    Disabled(T),
}

impl<T> PushError<T> {
    /// Recover the element that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Disabled(value) => value,
        }
    }
}

/// Error returned by a non-blocking push.
#[derive(Debug, thiserror::Error)]
pub enum TryPushError<T> {
    #[error("queue is full")]
    Full(T),

    #[error("queue is disabled")]
    Disabled(T),
}

impl<T> TryPushError<T> {
    /// Recover the element that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            TryPushError::Full(value) | TryPushError::Disabled(value) => value,
        }
    }

    /// True if the push failed because the queue was at capacity.
    pub fn is_full(&self) -> bool {
        matches!(self, TryPushError::Full(_))
    }
}

/// Error returned by a non-blocking pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryPopError {
    #[error("queue is empty")]
    Empty,
}

/// Error returned by a timed pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimedPopError {
    #[error("timed out waiting for an element")]
    Timeout,
}
