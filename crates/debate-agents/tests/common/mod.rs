//! In-process collaborators so the HTTP and CLI layers run without a model.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;

use orchestration::debate::{
    ArgumentRequest, Article, GenerationCollaborator, RevisionRequest, Verdict,
    VerificationCollaborator,
};
use orchestration::{CollaboratorError, DebateEngine, EngineConfig, RetryPolicy};

pub struct EchoGenerator {
    pub fail_writer: bool,
}

#[async_trait]
impl GenerationCollaborator for EchoGenerator {
    async fn summarize(&self, article: &Article) -> Result<String, CollaboratorError> {
        Ok(format!("{} in brief", article.title))
    }

    async fn generate_argument(
        &self,
        request: &ArgumentRequest,
    ) -> Result<String, CollaboratorError> {
        // The opening argument goes through so a debate can be created.
        if self.fail_writer && !request.previous.is_empty() {
            return Err(CollaboratorError::Unavailable("model offline".into()));
        }
        let hint = if request.user_input.is_empty() {
            String::new()
        } else {
            format!(" ({})", request.user_input)
        };
        Ok(format!(
            "{} case number {}{}",
            request.position.label(),
            request.number,
            hint
        ))
    }

    async fn revise_argument(
        &self,
        request: &RevisionRequest,
    ) -> Result<String, CollaboratorError> {
        Ok(request.original.clone())
    }
}

pub struct PassingVerifier;

#[async_trait]
impl VerificationCollaborator for PassingVerifier {
    async fn verify(&self, _content: &str) -> Result<Verdict, CollaboratorError> {
        Ok(Verdict::pass("PASSES"))
    }
}

pub fn engine(fail_writer: bool) -> DebateEngine {
    DebateEngine::with_config(
        Arc::new(EchoGenerator { fail_writer }),
        Arc::new(PassingVerifier),
        EngineConfig {
            retry: RetryPolicy {
                max_attempts: 1,
                timeout_ms: 5_000,
                backoff_ms: 0,
            },
            ..Default::default()
        },
    )
}
