//! Error types for the simulation core.

use thiserror::Error;

/// Result type alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the tree, the force law, and parameter validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Body position lies outside the bounds of the node it was inserted into.
    #[error("body {index} lies outside the tree bounds")]
    OutOfBounds { index: usize },

    /// Two bodies could not be separated before reaching the maximum tree depth.
    #[error("body {index} coincides with body {other}: not separable within depth {depth}")]
    DepthLimit { index: usize, other: usize, depth: usize },

    /// Zero separation between two distinct bodies during force computation.
    /// `other` is `None` when the source was a pseudo-body.
    #[error(
        "zero separation between body {index} and {}",
        .other.map_or_else(|| "a pseudo-body".to_string(), |o| format!("body {o}"))
    )]
    Singularity { index: usize, other: Option<usize> },

    /// Attempt to normalize a zero-length vector.
    #[error("cannot normalize a zero-length vector")]
    DegenerateNormal,

    /// Configuration value out of range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl SimError {
    /// Create an invalid parameters error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParameters(details.into())
    }

    /// True for conditions the step driver recovers from by freezing the body.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::DepthLimit { .. })
    }
}
