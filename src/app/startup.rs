//! Application startup
//!
//! Parses arguments, initializes logging, resolves the configuration and
//! runs the posting pump.

use crate::app::cli::Args;
use crate::app::config::{self, AppConfigError};
use crate::app::pump;
use crate::core::error_handling::ContextualError;
use crate::core::logging;
use crate::posting::PostingError;
use clap::Parser;
use std::io::IsTerminal;

/// Startup errors
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Config(#[from] AppConfigError),

    #[error(transparent)]
    Posting(#[from] PostingError),
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        match self {
            StartupError::Logging(_) => true,
            StartupError::Config(error) => error.is_user_actionable(),
            StartupError::Posting(error) => error.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StartupError::Logging(_) => {
                Some("Check the --log-level, --log-format and --log-file values.")
            }
            StartupError::Config(error) => error.user_message(),
            StartupError::Posting(error) => error.user_message(),
        }
    }
}

/// Parse arguments, configure the process and run the pump to completion.
pub fn run() -> Result<(), StartupError> {
    let args = Args::parse();

    let color_enabled = !args.no_color && std::io::stderr().is_terminal();
    logging::init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        args.log_file.as_deref(),
        color_enabled,
    )
    .map_err(|error| StartupError::Logging(error.to_string()))?;

    log::info!(
        "mqpost starting (built {}, rev {})",
        crate::BUILD_TIME,
        crate::GIT_HASH
    );

    let resolved = config::resolve(&args)?;
    log::debug!(
        "posting {} messages of {} bytes to '{}' through a buffer of {}",
        resolved.posting.event_count,
        resolved.posting.message_size,
        resolved.posting.queue_uri,
        resolved.queue.capacity
    );

    let report = pump::run_pump(&resolved)?;

    if report.drained != report.snapshot.messages_posted {
        log::warn!(
            "drained {} messages but posted {}",
            report.drained,
            report.snapshot.messages_posted
        );
    }
    log::info!("posting complete: {}", report.snapshot);

    Ok(())
}
