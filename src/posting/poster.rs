//! Poster and PostingContext
//!
//! `Poster` is a factory holding the shared pieces of the posting machinery:
//! the payload and timestamp-prefix buffer factories, the optional message
//! log, and the stat context. `PostingContext` holds the state of one series
//! of messages being posted to one queue over one session.

use crate::posting::buffers::PooledBufferFactory;
use crate::posting::error::PostingError;
use crate::posting::logger::FileLogger;
use crate::posting::message::{self, OutboundMessage, TIMESTAMP_PREFIX_LEN};
use crate::posting::params::PostingParameters;
use crate::posting::session::{QueueId, Session};
use crate::posting::stats::StatContext;
use std::sync::Arc;

/// Capacity of the pooled payload buffers.
const PAYLOAD_BUFFER_SIZE: usize = 4096;

/// Factory for posting contexts, owning the resources shared between them.
pub struct Poster {
    payload_factory: PooledBufferFactory,
    prefix_factory: PooledBufferFactory,
    logger: Option<Arc<FileLogger>>,
    stats: Arc<StatContext>,
}

impl Poster {
    pub fn new(logger: Option<Arc<FileLogger>>, stats: Arc<StatContext>) -> Self {
        Self {
            payload_factory: PooledBufferFactory::new(PAYLOAD_BUFFER_SIZE),
            prefix_factory: PooledBufferFactory::new(TIMESTAMP_PREFIX_LEN),
            logger,
            stats,
        }
    }

    /// Open the configured queue on `session` and bind a posting context to
    /// it.
    pub fn create_posting_context(
        &self,
        session: Arc<dyn Session>,
        parameters: PostingParameters,
    ) -> Result<PostingContext, PostingError> {
        let queue_id = session.open_queue(&parameters.queue_uri)?;
        log::debug!(
            "opened queue '{}' (id {}) for posting {} messages",
            queue_id.uri(),
            queue_id.id(),
            parameters.event_count
        );

        Ok(PostingContext {
            session,
            queue_id,
            remaining_events: parameters.event_count,
            messages_posted: 0,
            next_sequence_value: 0,
            parameters,
            payload_factory: self.payload_factory.clone(),
            prefix_factory: self.prefix_factory.clone(),
            logger: self.logger.clone(),
            stats: Arc::clone(&self.stats),
        })
    }

    pub fn stats(&self) -> &Arc<StatContext> {
        &self.stats
    }
}

/// State of one series of messages being posted.
pub struct PostingContext {
    session: Arc<dyn Session>,
    queue_id: QueueId,
    parameters: PostingParameters,
    payload_factory: PooledBufferFactory,
    prefix_factory: PooledBufferFactory,
    logger: Option<Arc<FileLogger>>,
    stats: Arc<StatContext>,
    remaining_events: u64,
    messages_posted: u64,
    next_sequence_value: u64,
}

impl PostingContext {
    /// True while at least one message remains to be posted.
    pub fn pending_post(&self) -> bool {
        self.remaining_events > 0
    }

    /// Number of messages posted so far.
    pub fn messages_posted(&self) -> u64 {
        self.messages_posted
    }

    /// Post the next message of the series.
    ///
    /// # Panics
    ///
    /// Panics unless [`pending_post`](Self::pending_post) is true.
    pub fn post_next(&mut self) -> Result<(), PostingError> {
        assert!(
            self.pending_post(),
            "post_next called with no messages left to post"
        );

        let message = self.build_message();
        let total_bytes = message.len();
        let payload_bytes = message.payload.len();
        let property_count = message.properties.len();

        self.session.post(&self.queue_id, message)?;

        let sequence = self.next_sequence_value;
        self.next_sequence_value += 1;
        self.remaining_events -= 1;
        self.messages_posted += 1;
        self.stats.record_post(total_bytes);

        if let Some(logger) = &self.logger {
            logger.log_posted(self.queue_id.uri(), sequence, payload_bytes, property_count)?;
        }

        Ok(())
    }

    fn build_message(&self) -> OutboundMessage {
        let prefix = message::build_timestamp_prefix(&self.prefix_factory);
        let payload = message::build_payload(
            &self.payload_factory,
            self.parameters.message_size,
            self.next_sequence_value,
        );

        let mut properties: Vec<(String, String)> = self
            .parameters
            .properties
            .iter()
            .map(|property| (property.name.clone(), property.value.clone()))
            .collect();
        if let Some(name) = &self.parameters.sequence_property {
            properties.push((name.clone(), self.next_sequence_value.to_string()));
        }

        OutboundMessage {
            prefix,
            payload,
            properties,
        }
    }
}
