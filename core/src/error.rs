use thiserror::Error;

use crate::ActorId;

/// Failures reported by simulation operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ArenaError {
    /// A caller supplied a value outside the accepted domain.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument or configuration field.
        name: &'static str,
        /// Human readable description of the violation.
        reason: String,
    },
    /// The referenced actor does not exist.
    #[error("actor {} not found", .0.get())]
    NotFound(ActorId),
    /// Internal state broke an invariant and was corrected.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ArenaError {
    /// Convenience constructor for [`ArenaError::InvalidArgument`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
