//! Posting parameters
//!
//! Describes one series of messages to post: where, how many, how large,
//! and which properties ride along.

use serde::Deserialize;

fn default_message_size() -> usize {
    1024
}

/// A name/value property attached to every posted message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageProperty {
    pub name: String,
    pub value: String,
}

impl MessageProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `NAME=VALUE` pair as given on the command line.
    pub fn parse(spec: &str) -> Option<Self> {
        let (name, value) = spec.split_once('=')?;
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value))
    }
}

/// Parameters for one series of messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostingParameters {
    /// URI of the queue to post to.
    pub queue_uri: String,

    /// Number of messages in the series.
    pub event_count: u64,

    /// Payload size in bytes.
    #[serde(default = "default_message_size")]
    pub message_size: usize,

    /// Fixed properties attached to every message.
    #[serde(default)]
    pub properties: Vec<MessageProperty>,

    /// Name of a property filled with an auto-incremented value, one per
    /// posted message, starting at zero.
    #[serde(default)]
    pub sequence_property: Option<String>,
}

impl PostingParameters {
    pub fn new(queue_uri: impl Into<String>, event_count: u64) -> Self {
        Self {
            queue_uri: queue_uri.into(),
            event_count,
            message_size: default_message_size(),
            properties: Vec::new(),
            sequence_property: None,
        }
    }
}
