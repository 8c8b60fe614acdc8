//! mqpost - a message-broker client tool for posting series of messages
//!
//! The heart of the crate is [`queue::MonitoredQueue`], a bounded
//! multi-producer/multi-consumer FIFO with watermark-based load tracking.
//! The [`posting`] module builds the client-side posting pipeline on top of
//! it, and [`app`] wraps everything in a command-line tool.

pub mod app;
pub mod core;
pub mod posting;
pub mod queue;

include!(concat!(env!("OUT_DIR"), "/version.rs"));
