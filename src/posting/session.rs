//! Broker session abstraction
//!
//! The posting pipeline talks to the broker through the [`Session`] trait:
//! open a queue once, then post messages against the returned [`QueueId`].
//! The only implementation shipped here is [`InProcessSession`], which
//! buffers outbound messages in a monitored queue. Producers see the same
//! backpressure and load-state signalling a remote broker client would
//! apply, without any network I/O.

use crate::core::error_handling::ContextualError;
use crate::posting::message::OutboundMessage;
use crate::queue::{MonitoredQueue, PushError, QueueConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle to a queue opened on a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueId {
    id: u64,
    uri: String,
}

impl QueueId {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("queue id {id} was not opened on this session")]
    UnknownQueue { id: u64 },

    #[error("session is closed")]
    Closed,
}

impl ContextualError for SessionError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// A connection to the broker, able to open queues and post messages.
pub trait Session: Send + Sync {
    /// Open `uri` for posting and return a handle for subsequent posts.
    fn open_queue(&self, uri: &str) -> Result<QueueId, SessionError>;

    /// Post one message to a previously opened queue. Blocks while the
    /// outbound buffer is full.
    fn post(&self, queue: &QueueId, message: OutboundMessage) -> Result<(), SessionError>;
}

/// Session backed by an in-process monitored queue.
pub struct InProcessSession {
    queue: Arc<MonitoredQueue<OutboundMessage>>,
    open_queues: Mutex<HashMap<u64, String>>,
    next_queue_id: AtomicU64,
}

impl InProcessSession {
    /// Build a session whose outbound buffer follows `config`.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration; validate first to report errors.
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            queue: Arc::new(MonitoredQueue::from_config(config)),
            open_queues: Mutex::new(HashMap::new()),
            next_queue_id: AtomicU64::new(1),
        }
    }

    /// The outbound buffer. Consumers drain it; callers may install an event
    /// sink or watermarks through it.
    pub fn queue(&self) -> &Arc<MonitoredQueue<OutboundMessage>> {
        &self.queue
    }

    /// Stop accepting posts. Messages already buffered remain drainable.
    pub fn close(&self) {
        self.queue.disable();
    }
}

impl Session for InProcessSession {
    fn open_queue(&self, uri: &str) -> Result<QueueId, SessionError> {
        let id = self.next_queue_id.fetch_add(1, Ordering::SeqCst);
        self.open_queues.lock().unwrap().insert(id, uri.to_string());

        Ok(QueueId {
            id,
            uri: uri.to_string(),
        })
    }

    fn post(&self, queue: &QueueId, message: OutboundMessage) -> Result<(), SessionError> {
        if !self.open_queues.lock().unwrap().contains_key(&queue.id) {
            return Err(SessionError::UnknownQueue { id: queue.id });
        }

        self.queue
            .push_back(message)
            .map_err(|PushError::Disabled(_)| SessionError::Closed)
    }
}
