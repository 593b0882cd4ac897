//! External collaborator contracts.
//!
//! The engine never talks to a model directly. It is handed implementations of
//! these traits at construction, so tests can inject deterministic doubles.
//!
//! | Trait                      | Operations                               |
//! |----------------------------|------------------------------------------|
//! | `GenerationCollaborator`   | summarize, generate argument, revise     |
//! | `VerificationCollaborator` | verify argument content                  |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorError;

use super::state::{Argument, Article, Position};

/// Everything a writer needs to draft one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentRequest {
    pub position: Position,
    pub summary: String,
    /// Up to the last three verified arguments, oldest first.
    pub previous: Vec<Argument>,
    /// Most recent user instruction; empty when none was given.
    pub user_input: String,
    /// Position-scoped sequence number the draft will carry.
    pub number: u32,
}

/// A rejected draft and the fact checker's explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub position: Position,
    pub original: String,
    pub feedback: String,
}

/// Fact-check judgment on an argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub verified: bool,
    pub feedback: String,
}

impl Verdict {
    pub fn pass(feedback: impl Into<String>) -> Self {
        Self {
            verified: true,
            feedback: feedback.into(),
        }
    }

    pub fn fail(feedback: impl Into<String>) -> Self {
        Self {
            verified: false,
            feedback: feedback.into(),
        }
    }

    /// Interpret a free-text judgment that is asked to state PASSES or FAILS.
    ///
    /// A judgment mentioning both is treated as a failure.
    pub fn from_judgment(raw: &str) -> Self {
        let verified = raw.contains("PASSES") && !raw.contains("FAILS");
        Self {
            verified,
            feedback: raw.to_string(),
        }
    }
}

/// Produces summaries, argument drafts, and revisions.
#[async_trait]
pub trait GenerationCollaborator: Send + Sync {
    /// Summarize the article for the writers.
    async fn summarize(&self, article: &Article) -> Result<String, CollaboratorError>;

    /// Draft a new argument text.
    async fn generate_argument(
        &self,
        request: &ArgumentRequest,
    ) -> Result<String, CollaboratorError>;

    /// Rewrite a rejected draft to address the feedback.
    async fn revise_argument(&self, request: &RevisionRequest)
        -> Result<String, CollaboratorError>;
}

/// Judges the factual validity of an argument.
#[async_trait]
pub trait VerificationCollaborator: Send + Sync {
    async fn verify(&self, content: &str) -> Result<Verdict, CollaboratorError>;
}
