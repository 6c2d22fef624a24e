//! Error types for the print-time estimator.

use thiserror::Error;

/// Errors that can occur during estimation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// A settings field is outside its documented domain.
    #[error("invalid settings: {field} {reason}")]
    InvalidSettings {
        /// Offending field, as named in serialized settings.
        field: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// The estimator model has a non-physical constant.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// No built-in profile with this name.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

impl EstimateError {
    pub(crate) fn settings(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidSettings { field, reason }
    }
}

/// Result type for estimator operations.
pub type Result<T> = std::result::Result<T, EstimateError>;
