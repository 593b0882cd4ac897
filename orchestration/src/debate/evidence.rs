//! Evidence-backed verification with degraded-mode lookups.
//!
//! ```text
//! verify(content)
//!   ├─ lookup succeeds → judge(content, evidence)
//!   └─ lookup fails or
//!      times out       → judge(content, empty evidence + error note)
//! ```
//!
//! A lookup failure never fails verification; only the judge can. The lookup
//! has its own time budget, which must stay below the verifier's call timeout
//! so the judge still gets to run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CollaboratorError;

use super::collaborators::{Verdict, VerificationCollaborator};

/// A published review of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReview {
    pub publisher: Option<String>,
    pub url: Option<String>,
    pub rating: Option<String>,
}

/// A previously fact-checked claim related to the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvidence {
    pub text: String,
    pub claimant: Option<String>,
    #[serde(default)]
    pub reviews: Vec<ClaimReview>,
}

/// Result of an evidence lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub claims: Vec<ClaimEvidence>,
    /// Set when the lookup failed and this is a stand-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Evidence {
    pub fn new(claims: Vec<ClaimEvidence>) -> Self {
        Self {
            claims,
            error: None,
        }
    }

    /// Empty evidence standing in for a failed lookup.
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            claims: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Plain-text rendering for a judge prompt.
    pub fn to_prompt_text(&self) -> String {
        if let Some(err) = &self.error {
            return format!("No evidence found (lookup failed: {err}).");
        }
        if self.claims.is_empty() {
            return "No evidence found.".to_string();
        }
        self.claims
            .iter()
            .map(|claim| {
                let reviews = claim
                    .reviews
                    .iter()
                    .map(|r| {
                        format!(
                            "{} rated it \"{}\" ({})",
                            r.publisher.as_deref().unwrap_or("unknown publisher"),
                            r.rating.as_deref().unwrap_or("unrated"),
                            r.url.as_deref().unwrap_or("no url")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                format!(
                    "- Claim: {} (claimant: {}). Reviews: {}",
                    claim.text,
                    claim.claimant.as_deref().unwrap_or("unknown"),
                    if reviews.is_empty() { "none" } else { reviews.as_str() }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// External fact lookup (query text in, structured evidence out).
#[async_trait]
pub trait EvidenceLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Evidence, CollaboratorError>;
}

/// Lookup used when no evidence source is configured.
pub struct NoEvidence;

#[async_trait]
impl EvidenceLookup for NoEvidence {
    async fn lookup(&self, _query: &str) -> Result<Evidence, CollaboratorError> {
        Ok(Evidence::default())
    }
}

/// Produces a free-text judgment that states PASSES or FAILS.
#[async_trait]
pub trait FactJudge: Send + Sync {
    async fn judge(&self, content: &str, evidence: &Evidence) -> Result<String, CollaboratorError>;
}

/// Default time allowed for one evidence lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Verification collaborator combining an evidence lookup with a judge.
pub struct FactCheckVerifier {
    judge: Arc<dyn FactJudge>,
    lookup: Arc<dyn EvidenceLookup>,
    lookup_timeout: Duration,
}

impl FactCheckVerifier {
    pub fn new(judge: Arc<dyn FactJudge>, lookup: Arc<dyn EvidenceLookup>) -> Self {
        Self {
            judge,
            lookup,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Fetch evidence, degrading any failure or timeout to empty evidence.
    pub async fn gather_evidence(&self, content: &str) -> Evidence {
        let result = tokio::time::timeout(self.lookup_timeout, self.lookup.lookup(content))
            .await
            .unwrap_or_else(|_| Err(CollaboratorError::Timeout(self.lookup_timeout)));
        match result {
            Ok(evidence) => evidence,
            Err(CollaboratorError::Timeout(after)) => {
                warn!(?after, "evidence lookup timed out, judging without evidence");
                Evidence::unavailable(format!("lookup timed out after {after:?}"))
            }
            Err(e) => {
                warn!(error = %e, "evidence lookup failed, judging without evidence");
                Evidence::unavailable(e.to_string())
            }
        }
    }
}

#[async_trait]
impl VerificationCollaborator for FactCheckVerifier {
    async fn verify(&self, content: &str) -> Result<Verdict, CollaboratorError> {
        let evidence = self.gather_evidence(content).await;
        let judgment = self.judge.judge(content, &evidence).await?;
        Ok(Verdict::from_judgment(&judgment))
    }
}
