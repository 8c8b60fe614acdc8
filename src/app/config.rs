//! Configuration resolution
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! configuration file, and command-line flags, with later layers winning.

use crate::app::cli::Args;
use crate::core::error_handling::ContextualError;
use crate::posting::{MessageProperty, PostingParameters};
use crate::queue::{QueueConfig, QueueConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_QUEUE_URI: &str = "inproc://default";
const DEFAULT_COUNT: u64 = 100;
const DEFAULT_MESSAGE_SIZE: usize = 1024;
const DEFAULT_CAPACITY: usize = 1000;

/// Top-level layout of the TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub queue: Option<QueueConfig>,

    #[serde(default)]
    pub posting: Option<PostingFileConfig>,
}

/// `[posting]` section of the configuration file; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostingFileConfig {
    pub queue_uri: Option<String>,
    pub count: Option<u64>,
    pub message_size: Option<usize>,
    pub sequence_property: Option<String>,

    #[serde(default)]
    pub properties: Vec<MessageProperty>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, AppConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| AppConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// Fully resolved settings for one posting run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub queue: QueueConfig,
    pub posting: PostingParameters,
    pub message_log: Option<PathBuf>,
}

/// Merge CLI flags over the configuration file over the defaults.
pub fn resolve(args: &Args) -> Result<ResolvedConfig, AppConfigError> {
    let file = match &args.config_file {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let file_queue = file.queue;
    let file_posting = file.posting.unwrap_or_default();

    let capacity = args
        .capacity
        .or(file_queue.as_ref().map(|queue| queue.capacity))
        .unwrap_or(DEFAULT_CAPACITY);
    let mut queue = QueueConfig::new(capacity);
    queue.low_watermark = args
        .low_watermark
        .or(file_queue.as_ref().and_then(|q| q.low_watermark));
    queue.high_watermark = args
        .high_watermark
        .or(file_queue.as_ref().and_then(|q| q.high_watermark));
    queue.high_watermark2 = args
        .high_watermark2
        .or(file_queue.as_ref().and_then(|q| q.high_watermark2));
    // The pump's drain loop terminates via timed pops, so the outbound
    // buffer always supports them regardless of the configured value.
    queue.timed_pops = true;
    queue.validate()?;

    let queue_uri = args
        .queue_uri
        .clone()
        .or(file_posting.queue_uri)
        .unwrap_or_else(|| DEFAULT_QUEUE_URI.to_string());
    let count = args.count.or(file_posting.count).unwrap_or(DEFAULT_COUNT);

    let mut posting = PostingParameters::new(queue_uri, count);
    posting.message_size = args
        .message_size
        .or(file_posting.message_size)
        .unwrap_or(DEFAULT_MESSAGE_SIZE);
    posting.sequence_property = args
        .sequence_property
        .clone()
        .or(file_posting.sequence_property);

    let mut properties = file_posting.properties;
    for spec in &args.properties {
        let property =
            MessageProperty::parse(spec).ok_or_else(|| AppConfigError::InvalidProperty {
                spec: spec.clone(),
            })?;
        properties.push(property);
    }
    posting.properties = properties;

    Ok(ResolvedConfig {
        queue,
        posting,
        message_log: args.message_log.clone(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error("cannot read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Queue(#[from] QueueConfigError),

    #[error("invalid property '{spec}' (expected NAME=VALUE)")]
    InvalidProperty { spec: String },
}

impl ContextualError for AppConfigError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppConfigError::Read { .. } => true,
            AppConfigError::Parse(_) => true,
            AppConfigError::Queue(error) => error.is_user_actionable(),
            AppConfigError::InvalidProperty { .. } => true,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AppConfigError::Read { .. } => Some("Check that the configuration file exists and is readable."),
            AppConfigError::Parse(_) => Some("Fix the TOML syntax or field names in the configuration file."),
            AppConfigError::Queue(error) => error.user_message(),
            AppConfigError::InvalidProperty { .. } => {
                Some("Properties are given as NAME=VALUE, with a non-empty name.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("mqpost").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve(&args(&[])).unwrap();

        assert_eq!(resolved.queue.capacity, DEFAULT_CAPACITY);
        assert!(resolved.queue.timed_pops);
        assert_eq!(resolved.posting.queue_uri, DEFAULT_QUEUE_URI);
        assert_eq!(resolved.posting.event_count, DEFAULT_COUNT);
        assert_eq!(resolved.posting.message_size, DEFAULT_MESSAGE_SIZE);
        assert!(resolved.message_log.is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mqpost.toml");
        std::fs::write(
            &path,
            r#"
            [queue]
            capacity = 64
            high_watermark = 32

            [posting]
            queue_uri = "inproc://from-file"
            count = 10
            message_size = 2048

            [[posting.properties]]
            name = "source"
            value = "file"
            "#,
        )
        .unwrap();

        let resolved = resolve(&args(&[
            "--config-file",
            path.to_str().unwrap(),
            "--count",
            "25",
            "-P",
            "extra=cli",
        ]))
        .unwrap();

        // File values hold where the CLI stays silent.
        assert_eq!(resolved.queue.capacity, 64);
        assert_eq!(resolved.queue.high_watermark, Some(32));
        assert_eq!(resolved.posting.queue_uri, "inproc://from-file");
        assert_eq!(resolved.posting.message_size, 2048);

        // CLI wins where both speak; CLI properties append after file ones.
        assert_eq!(resolved.posting.event_count, 25);
        assert_eq!(
            resolved.posting.properties,
            vec![
                MessageProperty::new("source", "file"),
                MessageProperty::new("extra", "cli"),
            ]
        );
    }

    #[test]
    fn test_invalid_watermarks_are_reported() {
        let error = resolve(&args(&[
            "--capacity",
            "10",
            "--low-watermark",
            "8",
            "--high-watermark",
            "4",
        ]))
        .unwrap_err();

        assert!(matches!(error, AppConfigError::Queue(_)));
        assert!(error.is_user_actionable());
    }

    #[test]
    fn test_invalid_property_is_reported() {
        let error = resolve(&args(&["-P", "notapair"])).unwrap_err();
        assert!(matches!(error, AppConfigError::InvalidProperty { .. }));
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let error = resolve(&args(&["--config-file", "/nonexistent/mqpost.toml"])).unwrap_err();
        assert!(matches!(error, AppConfigError::Read { .. }));
    }
}
