//! Test modules for the monitored queue
//!
//! Suites are organized by functional area: basic operation, watermark
//! signalling, concurrent behavior, and edge cases.

use crate::queue::{QueueEventSink, QueueState};
use std::sync::{Arc, Mutex};

mod concurrent;

/// One recorded state transition: `(old, new, size)`.
type Transition = (QueueState, QueueState, usize);

/// Sink that appends every transition to a shared vector.
struct RecordingSink {
    events: Arc<Mutex<Vec<Transition>>>,
}

impl RecordingSink {
    fn new() -> (Self, Arc<Mutex<Vec<Transition>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

impl QueueEventSink for RecordingSink {
    fn on_state_change(&self, old_state: QueueState, new_state: QueueState, size: usize) {
        self.events.lock().unwrap().push((old_state, new_state, size));
    }
}

/// Asserts that a recorded event sequence is a valid transition chain: the
/// first transition leaves `Normal` and every later transition starts from
/// the state the previous one reached. Any double emission or missed
/// crossing breaks the chain.
fn assert_valid_transition_chain(events: &[Transition]) {
    let mut expected = QueueState::Normal;
    for (index, (old, new, _size)) in events.iter().enumerate() {
        assert_eq!(
            *old, expected,
            "transition {} starts from {:?} but the previous one ended at {:?}",
            index, old, expected
        );
        assert_ne!(old, new, "transition {} does not change state", index);
        expected = *new;
    }
}
