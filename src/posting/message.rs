//! Outbound message assembly
//!
//! A posted message carries two blobs: a small prefix holding the posting
//! timestamp (8 bytes, big-endian nanoseconds since the Unix epoch) and the
//! payload proper, plus a list of string properties. The queue and session
//! layers treat both blobs as opaque bytes.

use crate::posting::buffers::PooledBufferFactory;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of bytes in the timestamp prefix blob.
pub const TIMESTAMP_PREFIX_LEN: usize = 8;

const FILL_PATTERN: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// One message on its way to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Timestamp prefix blob.
    pub prefix: Vec<u8>,
    /// Payload blob.
    pub payload: Vec<u8>,
    /// Properties attached to the message.
    pub properties: Vec<(String, String)>,
}

impl OutboundMessage {
    /// Total number of payload bytes (prefix + payload).
    pub fn len(&self) -> usize {
        self.prefix.len() + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.payload.is_empty()
    }

    /// Decode the posting timestamp from the prefix blob, if present.
    pub fn timestamp_ns(&self) -> Option<u64> {
        let bytes: [u8; TIMESTAMP_PREFIX_LEN] = self.prefix.as_slice().try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }
}

/// Build the timestamp prefix blob for a message posted now.
pub(crate) fn build_timestamp_prefix(factory: &PooledBufferFactory) -> Vec<u8> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0);

    let mut buffer = factory.acquire();
    buffer.extend_from_slice(&nanos.to_be_bytes());
    buffer.into()
}

/// Build a payload of exactly `size` bytes, filled with a repeating pattern
/// rotated by `seed` so consecutive messages differ.
pub(crate) fn build_payload(factory: &PooledBufferFactory, size: usize, seed: u64) -> Vec<u8> {
    let mut buffer = factory.acquire();
    let offset = (seed as usize) % FILL_PATTERN.len();
    buffer.extend(
        FILL_PATTERN
            .iter()
            .cycle()
            .skip(offset)
            .take(size)
            .copied(),
    );
    buffer.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_prefix_roundtrip() {
        let factory = PooledBufferFactory::new(TIMESTAMP_PREFIX_LEN);

        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64;
        let prefix = build_timestamp_prefix(&factory);
        let after = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64;

        assert_eq!(prefix.len(), TIMESTAMP_PREFIX_LEN);

        let message = OutboundMessage {
            prefix,
            payload: Vec::new(),
            properties: Vec::new(),
        };
        let stamped = message.timestamp_ns().unwrap();
        assert!(stamped >= before && stamped <= after);
    }

    #[test]
    fn test_payload_has_requested_size_and_rotates() {
        let factory = PooledBufferFactory::new(64);

        let first = build_payload(&factory, 40, 0);
        let second = build_payload(&factory, 40, 1);

        assert_eq!(first.len(), 40);
        assert_eq!(second.len(), 40);
        assert_ne!(first, second);
        assert!(first.starts_with(b"abcdefghij"));
        assert!(second.starts_with(b"bcdefghijk"));
    }

    #[test]
    fn test_empty_payload() {
        let factory = PooledBufferFactory::new(64);
        let payload = build_payload(&factory, 0, 3);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_timestamp_missing_on_short_prefix() {
        let message = OutboundMessage {
            prefix: vec![1, 2, 3],
            payload: Vec::new(),
            properties: Vec::new(),
        };
        assert_eq!(message.timestamp_ns(), None);
    }
}
