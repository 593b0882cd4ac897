//! Deterministic in-process collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use orchestration::debate::{
    ArgumentRequest, Article, GenerationCollaborator, RevisionRequest, Verdict,
    VerificationCollaborator,
};
use orchestration::{CollaboratorError, DebateEngine, EngineConfig, RetryPolicy};

/// How the stub writer behaves on `generate_argument`.
#[derive(Clone, Copy)]
pub enum WriterMode {
    Normal,
    /// Fails every call from the given (1-based) call onwards.
    FailFrom(u32),
    /// Never answers within any sane timeout.
    Hang,
}

pub struct StubGenerator {
    mode: WriterMode,
    pub summaries: AtomicU32,
    pub generations: AtomicU32,
    pub revisions: AtomicU32,
    pub requests: Mutex<Vec<ArgumentRequest>>,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::with_mode(WriterMode::Normal)
    }

    pub fn with_mode(mode: WriterMode) -> Self {
        Self {
            mode,
            summaries: AtomicU32::new(0),
            generations: AtomicU32::new(0),
            revisions: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn generations(&self) -> u32 {
        self.generations.load(Ordering::SeqCst)
    }

    pub fn revisions(&self) -> u32 {
        self.revisions.load(Ordering::SeqCst)
    }

    pub fn summaries(&self) -> u32 {
        self.summaries.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ArgumentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationCollaborator for StubGenerator {
    async fn summarize(&self, article: &Article) -> Result<String, CollaboratorError> {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Summary: {}", article.title))
    }

    async fn generate_argument(
        &self,
        request: &ArgumentRequest,
    ) -> Result<String, CollaboratorError> {
        let call = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        match self.mode {
            WriterMode::FailFrom(n) if call >= n => {
                Err(CollaboratorError::Inference("backend returned 503".into()))
            }
            WriterMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".into())
            }
            _ => Ok(format!(
                "{} argument #{}",
                request.position.label(),
                request.number
            )),
        }
    }

    async fn revise_argument(
        &self,
        request: &RevisionRequest,
    ) -> Result<String, CollaboratorError> {
        self.revisions.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} [revised]", request.original))
    }
}

/// Fixed-verdict verifier.
pub struct StubVerifier {
    verified: bool,
    pub calls: AtomicU32,
}

impl StubVerifier {
    pub fn accepting() -> Self {
        Self {
            verified: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            verified: false,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl VerificationCollaborator for StubVerifier {
    async fn verify(&self, _content: &str) -> Result<Verdict, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(if self.verified {
            Verdict::pass("Verdict: PASSES")
        } else {
            Verdict::fail("Verdict: FAILS, the figure is invented")
        })
    }
}

pub fn article() -> Article {
    Article::new(
        "City bans cars downtown",
        "The council voted to close the downtown core to private cars from 2026.",
    )
    .with_source("Metro Gazette")
}

/// Small backoff so retry tests stay fast under a paused clock too.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        retry: RetryPolicy {
            max_attempts: 2,
            timeout_ms: 5_000,
            backoff_ms: 1,
        },
        ..Default::default()
    }
}

pub fn engine_with(
    generator: Arc<StubGenerator>,
    verifier: Arc<StubVerifier>,
    config: EngineConfig,
) -> DebateEngine {
    DebateEngine::with_config(generator, verifier, config)
}
