//! Google Fact Check Tools claim search as an [`EvidenceLookup`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use orchestration::debate::{ClaimEvidence, ClaimReview, Evidence, EvidenceLookup};
use orchestration::CollaboratorError;

/// Longest query sent to the claim search, in characters.
pub const MAX_QUERY_CHARS: usize = 256;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimSearchResponse {
    #[serde(default)]
    claims: Vec<ApiClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiClaim {
    #[serde(default)]
    text: String,
    claimant: Option<String>,
    #[serde(default)]
    claim_review: Vec<ApiClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiClaimReview {
    publisher: Option<ApiPublisher>,
    url: Option<String>,
    textual_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPublisher {
    name: Option<String>,
    site: Option<String>,
}

impl ClaimSearchResponse {
    fn into_evidence(self) -> Evidence {
        Evidence::new(
            self.claims
                .into_iter()
                .map(|c| ClaimEvidence {
                    text: c.text,
                    claimant: c.claimant,
                    reviews: c
                        .claim_review
                        .into_iter()
                        .map(|r| ClaimReview {
                            publisher: r.publisher.and_then(|p| p.name.or(p.site)),
                            url: r.url,
                            rating: r.textual_rating,
                        })
                        .collect(),
                })
                .collect(),
        )
    }
}

/// Truncate on a character boundary.
fn truncate_query(query: &str) -> &str {
    match query.char_indices().nth(MAX_QUERY_CHARS) {
        Some((idx, _)) => &query[..idx],
        None => query,
    }
}

/// HTTP client for `claims:search`.
pub struct GoogleFactCheckClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GoogleFactCheckClient {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build fact check HTTP client")?;
        Ok(Self {
            http,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl EvidenceLookup for GoogleFactCheckClient {
    async fn lookup(&self, query: &str) -> Result<Evidence, CollaboratorError> {
        let query = truncate_query(query.trim());
        let resp = self
            .http
            .get(&self.url)
            .query(&[("key", self.api_key.as_str()), ("query", query)])
            .send()
            .await
            .map_err(|e| CollaboratorError::Inference(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CollaboratorError::RateLimited(format!("claim search HTTP {status}")));
        }
        if !status.is_success() {
            return Err(CollaboratorError::Inference(format!("claim search HTTP {status}")));
        }

        let body: ClaimSearchResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;
        let evidence = body.into_evidence();
        debug!(claims = evidence.claims.len(), "Claim search complete");
        Ok(evidence)
    }
}
