//! Posting Pipeline Component
//!
//! Helper classes for posting series of messages to a broker queue.
//!
//! A [`Poster`] is a factory holding everything shared across posting runs:
//! the pooled buffer factories for payloads and timestamp prefixes, the
//! optional message log, and the stat context. It manufactures
//! [`PostingContext`]s, each bound to a session, a queue and a set of
//! posting parameters. A context posts one message per
//! [`post_next`](PostingContext::post_next) call while
//! [`pending_post`](PostingContext::pending_post) reports whether messages
//! remain.
//!
//! The broker session is abstracted behind the [`Session`] trait; the
//! in-process implementation buffers outbound messages in a monitored queue
//! so that producers experience real backpressure and load-state signalling
//! without any network plumbing.

mod buffers;
mod error;
mod logger;
mod message;
mod params;
mod poster;
mod session;
mod stats;

pub use buffers::{PooledBuffer, PooledBufferFactory};
pub use error::PostingError;
pub use logger::FileLogger;
pub use message::OutboundMessage;
pub use params::{MessageProperty, PostingParameters};
pub use poster::{Poster, PostingContext};
pub use session::{InProcessSession, QueueId, Session, SessionError};
pub use stats::{StatContext, StatSnapshot};
