//! Posting statistics
//!
//! Lock-free counters shared between the posting loop, the queue event sink
//! and the consumer side. A snapshot freezes the counters for reporting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters for a posting run.
#[derive(Debug, Default)]
pub struct StatContext {
    messages_posted: AtomicU64,
    bytes_posted: AtomicU64,
    messages_delivered: AtomicU64,
    state_transitions: AtomicU64,
}

impl StatContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one posted message of `bytes` total size.
    pub fn record_post(&self, bytes: usize) {
        self.messages_posted.fetch_add(1, Ordering::Relaxed);
        self.bytes_posted.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record one message drained by a consumer.
    pub fn record_delivery(&self) {
        self.messages_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one queue load-state transition.
    pub fn record_state_transition(&self) {
        self.state_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            messages_posted: self.messages_posted.load(Ordering::Relaxed),
            bytes_posted: self.bytes_posted.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            state_transitions: self.state_transitions.load(Ordering::Relaxed),
        }
    }
}

/// Frozen view of a [`StatContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSnapshot {
    pub messages_posted: u64,
    pub bytes_posted: u64,
    pub messages_delivered: u64,
    pub state_transitions: u64,
}

impl fmt::Display for StatSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "posted {} messages ({} bytes), delivered {}, {} load transitions",
            self.messages_posted, self.bytes_posted, self.messages_delivered, self.state_transitions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = StatContext::new();

        stats.record_post(100);
        stats.record_post(28);
        stats.record_delivery();
        stats.record_state_transition();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.messages_posted, 2);
        assert_eq!(snapshot.bytes_posted, 128);
        assert_eq!(snapshot.messages_delivered, 1);
        assert_eq!(snapshot.state_transitions, 1);
    }

    #[test]
    fn test_snapshot_display() {
        let stats = StatContext::new();
        stats.record_post(64);

        let rendered = stats.snapshot().to_string();
        assert!(rendered.contains("posted 1 messages (64 bytes)"));
    }
}
