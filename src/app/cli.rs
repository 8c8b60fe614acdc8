//! Command-line arguments
//!
//! Options left unset fall back to the configuration file (when given) and
//! then to built-in defaults; explicit flags always win.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "mqpost")]
#[command(about = "Post series of messages to a broker queue through a monitored, watermark-tracked buffer")]
#[command(version)]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// Queue URI to post to
    #[arg(short = 'q', long = "queue", value_name = "URI")]
    pub queue_uri: Option<String>,

    /// Number of messages to post
    #[arg(short = 'n', long = "count", value_name = "COUNT")]
    pub count: Option<u64>,

    /// Payload size in bytes
    #[arg(short = 's', long = "message-size", value_name = "BYTES")]
    pub message_size: Option<usize>,

    /// Properties attached to every message (NAME=VALUE)*
    #[arg(short = 'P', long = "property", value_name = "NAME=VALUE", action = ArgAction::Append)]
    pub properties: Vec<String>,

    /// Property filled with an auto-incremented per-message value
    #[arg(long = "sequence-property", value_name = "NAME")]
    pub sequence_property: Option<String>,

    /// Capacity of the outbound buffer
    #[arg(long = "capacity", value_name = "N")]
    pub capacity: Option<usize>,

    /// Low watermark of the outbound buffer
    #[arg(long = "low-watermark", value_name = "N")]
    pub low_watermark: Option<usize>,

    /// High watermark of the outbound buffer
    #[arg(long = "high-watermark", value_name = "N")]
    pub high_watermark: Option<usize>,

    /// Second high watermark of the outbound buffer
    #[arg(long = "high-watermark2", value_name = "N")]
    pub high_watermark2: Option<usize>,

    /// File recording one line per posted message
    #[arg(short = 'm', long = "message-log", value_name = "FILE")]
    pub message_log: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unset() {
        let args = Args::try_parse_from(["mqpost"]).unwrap();

        assert!(args.queue_uri.is_none());
        assert!(args.count.is_none());
        assert!(args.properties.is_empty());
        assert!(!args.no_color);
    }

    #[test]
    fn test_full_invocation_parses() {
        let args = Args::try_parse_from([
            "mqpost",
            "--queue",
            "inproc://orders",
            "-n",
            "5000",
            "--message-size",
            "256",
            "-P",
            "region=emea",
            "-P",
            "source=loadgen",
            "--sequence-property",
            "msg_id",
            "--capacity",
            "512",
            "--low-watermark",
            "64",
            "--high-watermark",
            "256",
            "--high-watermark2",
            "448",
            "--message-log",
            "posted.log",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.queue_uri.as_deref(), Some("inproc://orders"));
        assert_eq!(args.count, Some(5000));
        assert_eq!(args.message_size, Some(256));
        assert_eq!(args.properties, vec!["region=emea", "source=loadgen"]);
        assert_eq!(args.sequence_property.as_deref(), Some("msg_id"));
        assert_eq!(args.capacity, Some(512));
        assert_eq!(args.low_watermark, Some(64));
        assert_eq!(args.high_watermark, Some(256));
        assert_eq!(args.high_watermark2, Some(448));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Args::try_parse_from(["mqpost", "--log-level", "loud"]).is_err());
    }
}
