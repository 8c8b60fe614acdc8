//! Generic error handling utilities
//!
//! Provides unified error handling that can work across different error types
//! while maintaining domain-specific error logging patterns.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// This trait enables generic error handling functions to determine whether an
/// error should show a specific user message or generic context with debug
/// details.
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message; when it returns
/// `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable
    /// message that should be displayed directly to the user
    ///
    /// Examples of user-actionable errors: argument parsing failures,
    /// configuration errors with clear fixes. Examples of system errors: IO
    /// failures, poisoned locks.
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with the appropriate level of detail
///
/// User-actionable errors surface their specific message; system errors show
/// the operation context with the debug representation behind it.
pub fn log_error_with_context<E: ContextualError>(error: &E, operation_context: &str) {
    if error.is_user_actionable() {
        if let Some(message) = error.user_message() {
            log::error!("{operation_context}: {message}");
            log::debug!("{operation_context} failure detail: {error:?}");
            return;
        }
    }

    log::error!("{operation_context} failed: {error}");
    log::debug!("{operation_context} failure detail: {error:?}");
}
