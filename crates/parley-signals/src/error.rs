//! Error types for the signals crate.

use thiserror::Error;

/// Errors that can occur in the signals crate.
///
/// Extractors only fail at construction (rule compilation); analysis itself
/// is infallible, which is what lets the planner treat extractor trouble as
/// a null signal.
#[derive(Debug, Error)]
pub enum SignalError {
    /// A rule pattern failed to compile.
    #[error("Rule error: {0}")]
    Rule(#[from] regex::Error),
}

/// Result type alias for signal operations.
pub type Result<T> = std::result::Result<T, SignalError>;
