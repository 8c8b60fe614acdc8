//! Posting Error Types

use crate::core::error_handling::ContextualError;
use crate::posting::session::SessionError;

/// Errors raised while posting a series of messages.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to write message log: {0}")]
    MessageLog(#[from] std::io::Error),
}

impl ContextualError for PostingError {
    fn is_user_actionable(&self) -> bool {
        match self {
            PostingError::Session(error) => error.is_user_actionable(),
            PostingError::MessageLog(_) => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PostingError::Session(error) => error.user_message(),
            PostingError::MessageLog(_) => None,
        }
    }
}
