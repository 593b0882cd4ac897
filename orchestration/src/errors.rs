//! Debate error taxonomy with retry classification.
//!
//! Two layers:
//!
//! | Type                | Raised by                         | Fatal to the run? |
//! |---------------------|-----------------------------------|-------------------|
//! | `CollaboratorError` | generation / verification / lookup | only once retries are exhausted |
//! | `DebateError`       | engine, input processor, service  | yes               |
//!
//! The iteration safety bound has no variant here: it ends the
//! debate normally and is reported through `EndReason::IterationLimit`.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single call to an external collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The call did not complete within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The inference backend returned an error (network, 5xx, backend crash).
    #[error("inference failure: {0}")]
    Inference(String),

    /// Provider rate limit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The response could not be interpreted.
    #[error("parse failure: {0}")]
    Parse(String),

    /// The collaborator is not configured or cannot be reached at all.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Whether retrying the same call may succeed.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// Which collaborator a failed call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Summarizer,
    Writer,
    Reviser,
    Verifier,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summarizer => write!(f, "summarizer"),
            Self::Writer => write!(f, "writer"),
            Self::Reviser => write!(f, "reviser"),
            Self::Verifier => write!(f, "verifier"),
        }
    }
}

/// Unified error for debate operations.
///
/// Any of these aborts the current run; the caller's stored state is left as
/// it was before the run started.
#[derive(Debug, Error)]
pub enum DebateError {
    /// Malformed or unexpected data reached a transition.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A collaborator kept failing after the retry budget was spent.
    #[error("{collaborator} failed after {attempts} attempt(s): {source}")]
    CollaboratorFailure {
        collaborator: Collaborator,
        attempts: u32,
        #[source]
        source: CollaboratorError,
    },

    /// No debate is stored under the given identifier.
    #[error("debate session not found: {0}")]
    SessionNotFound(String),
}

impl DebateError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }
}

/// Result alias for debate operations.
pub type DebateResult<T> = Result<T, DebateError>;
