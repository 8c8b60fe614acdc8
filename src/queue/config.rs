//! Queue configuration
//!
//! Deserializable description of a monitored queue. The event sink is not
//! part of the configuration; it is installed programmatically.

use crate::core::error_handling::ContextualError;
use crate::queue::state::Watermarks;
use serde::Deserialize;

/// Recognized options for building a monitored queue.
///
/// Unspecified watermarks default to `(0, capacity, capacity)`, which keeps
/// the queue in the normal state until it is completely full.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Maximum number of queued elements. Must be positive.
    pub capacity: usize,

    #[serde(default)]
    pub low_watermark: Option<usize>,

    #[serde(default)]
    pub high_watermark: Option<usize>,

    #[serde(default)]
    pub high_watermark2: Option<usize>,

    /// Enables the timed pop operation on the built queue.
    #[serde(default)]
    pub timed_pops: bool,
}

impl QueueConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            low_watermark: None,
            high_watermark: None,
            high_watermark2: None,
            timed_pops: false,
        }
    }

    /// Resolve the effective thresholds, applying defaults for unset fields.
    pub fn watermarks(&self) -> Watermarks {
        let defaults = Watermarks::disarmed(self.capacity);
        Watermarks {
            low: self.low_watermark.unwrap_or(defaults.low),
            high: self.high_watermark.unwrap_or(defaults.high),
            high2: self.high_watermark2.unwrap_or(defaults.high2),
        }
    }

    /// Check capacity and watermark ordering, returning the first violation.
    pub fn validate(&self) -> Result<(), QueueConfigError> {
        if self.capacity == 0 {
            return Err(QueueConfigError::ZeroCapacity);
        }

        let watermarks = self.watermarks();
        if watermarks.low >= watermarks.high {
            return Err(QueueConfigError::WatermarkOrdering {
                detail: format!(
                    "low watermark ({}) must be below high watermark ({})",
                    watermarks.low, watermarks.high
                ),
            });
        }
        if watermarks.high > watermarks.high2 {
            return Err(QueueConfigError::WatermarkOrdering {
                detail: format!(
                    "high watermark ({}) must not exceed high watermark 2 ({})",
                    watermarks.high, watermarks.high2
                ),
            });
        }
        if watermarks.high2 > self.capacity {
            return Err(QueueConfigError::WatermarkOrdering {
                detail: format!(
                    "high watermark 2 ({}) must not exceed capacity ({})",
                    watermarks.high2, self.capacity
                ),
            });
        }

        Ok(())
    }
}

/// Queue configuration errors
#[derive(Debug, thiserror::Error)]
pub enum QueueConfigError {
    #[error("queue capacity must be positive")]
    ZeroCapacity,

    #[error("invalid watermarks: {detail}")]
    WatermarkOrdering { detail: String },
}

impl ContextualError for QueueConfigError {
    fn is_user_actionable(&self) -> bool {
        // Both variants point at values the user supplied.
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueConfigError::ZeroCapacity => {
                Some("Queue capacity must be a positive number of elements.")
            }
            QueueConfigError::WatermarkOrdering { .. } => {
                Some("Queue watermarks must satisfy low < high <= high2 <= capacity.")
            }
        }
    }
}
