//! Error types for G-code analysis.

use thiserror::Error;

/// Errors that can occur while analyzing G-code.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// Input bytes are not valid UTF-8 text.
    #[error("failed to analyze G-code file")]
    Parse(#[source] std::str::Utf8Error),

    /// An analyzer constant is out of range.
    #[error("invalid analyzer config: {field} {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// Analysis was cancelled by the caller.
    #[error("G-code analysis cancelled")]
    Cancelled,
}

/// Result type for G-code operations.
pub type Result<T> = std::result::Result<T, GcodeError>;
