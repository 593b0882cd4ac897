//! Session-level facade used by the HTTP service and the CLI.
//!
//! Each debate is guarded by its own async lock, so a debate's state is owned
//! by one execution at a time while different debates run concurrently. A
//! failed run stores nothing, including the input that preceded it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::debate::{
    Argument, Article, DebateEngine, DebatePhase, DebateState, EndReason, Position,
};
use crate::errors::DebateResult;
use crate::session::SessionStore;

/// Public shape of one verified argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentView {
    pub content: String,
    pub position: Position,
    pub number: u32,
}

impl From<&Argument> for ArgumentView {
    fn from(arg: &Argument) -> Self {
        Self {
            content: arg.content.clone(),
            position: arg.position,
            number: arg.number,
        }
    }
}

/// Public shape of a debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateView {
    pub debate_id: String,
    pub article_title: String,
    pub summary: Option<String>,
    pub arguments: Vec<ArgumentView>,
    pub current_turn: Position,
    pub waiting_for_user: bool,
    pub is_active: bool,
    pub iteration_count: u32,
    pub phase: DebatePhase,
    pub end_reason: Option<EndReason>,
}

impl DebateView {
    pub fn from_state(debate_id: &str, state: &DebateState) -> Self {
        Self {
            debate_id: debate_id.to_string(),
            article_title: state.article.title.clone(),
            summary: state.summary.clone(),
            arguments: state.arguments.iter().map(ArgumentView::from).collect(),
            current_turn: state.current_turn,
            waiting_for_user: state.is_waiting_for_user() && state.is_active,
            is_active: state.is_active,
            iteration_count: state.iteration_count,
            phase: state.phase,
            end_reason: state.end_reason,
        }
    }
}

pub struct DebateService {
    engine: DebateEngine,
    store: Arc<dyn SessionStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DebateService {
    pub fn new(engine: DebateEngine, store: Arc<dyn SessionStore>) -> Self {
        Self {
            engine,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &DebateEngine {
        &self.engine
    }

    /// Lock guarding one stored debate.
    ///
    /// Fails with `SessionNotFound` before any entry is created, so unknown
    /// ids never grow the lock table. Debates are never removed from the
    /// store, so the existence check stays true once it passes.
    async fn session_lock(&self, id: &str) -> DebateResult<Arc<Mutex<()>>> {
        self.store.get(id).await?;
        Ok(self
            .locks
            .lock()
            .await
            .entry(id.to_string())
            .or_default()
            .clone())
    }

    /// Initialize a debate, run it to its first suspension, and store it.
    pub async fn create(&self, article: Article) -> DebateResult<DebateView> {
        let state = self.engine.initialize(article);
        let report = self.engine.run(&state).await?;
        let id = self.store.create(report.state.clone()).await?;
        info!(debate_id = %id, title = %report.state.article.title, "Debate created");
        Ok(DebateView::from_state(&id, &report.state))
    }

    /// Apply user input and resume the debate.
    pub async fn submit_input(&self, id: &str, text: &str) -> DebateResult<DebateView> {
        let lock = self.session_lock(id).await?;
        let _guard = lock.lock().await;

        let state = self.store.get(id).await?;
        let next = self.engine.apply_user_input(&state, text)?;
        let report = self.engine.run(&next).await?;
        self.store.update(id, report.state.clone()).await?;
        Ok(DebateView::from_state(id, &report.state))
    }

    pub async fn get(&self, id: &str) -> DebateResult<DebateView> {
        let state = self.store.get(id).await?;
        Ok(DebateView::from_state(id, &state))
    }

    /// Cancel a debate. Cancelling an ended debate returns it unchanged.
    pub async fn cancel(&self, id: &str) -> DebateResult<DebateView> {
        let lock = self.session_lock(id).await?;
        let _guard = lock.lock().await;

        let mut state = self.store.get(id).await?;
        if state.phase == DebatePhase::Ended {
            return Ok(DebateView::from_state(id, &state));
        }
        state.cancel();
        let report = self.engine.run(&state).await?;
        self.store.update(id, report.state.clone()).await?;
        info!(debate_id = %id, "Debate cancelled");
        Ok(DebateView::from_state(id, &report.state))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::debate::{
        ArgumentRequest, GenerationCollaborator, RevisionRequest, Verdict,
        VerificationCollaborator,
    };
    use crate::errors::{CollaboratorError, DebateError};
    use crate::session::InMemorySessionStore;

    struct PlainGenerator;

    #[async_trait]
    impl GenerationCollaborator for PlainGenerator {
        async fn summarize(&self, article: &Article) -> Result<String, CollaboratorError> {
            Ok(article.title.clone())
        }

        async fn generate_argument(
            &self,
            request: &ArgumentRequest,
        ) -> Result<String, CollaboratorError> {
            Ok(format!("{} #{}", request.position, request.number))
        }

        async fn revise_argument(
            &self,
            request: &RevisionRequest,
        ) -> Result<String, CollaboratorError> {
            Ok(request.original.clone())
        }
    }

    struct Accepting;

    #[async_trait]
    impl VerificationCollaborator for Accepting {
        async fn verify(&self, _content: &str) -> Result<Verdict, CollaboratorError> {
            Ok(Verdict::pass("PASSES"))
        }
    }

    fn service() -> DebateService {
        DebateService::new(
            DebateEngine::new(Arc::new(PlainGenerator), Arc::new(Accepting)),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_no_lock_entries() {
        let svc = service();
        for i in 0..100 {
            let id = format!("missing-{i}");
            assert!(matches!(
                svc.submit_input(&id, "continue").await,
                Err(DebateError::SessionNotFound(_))
            ));
            assert!(matches!(
                svc.cancel(&id).await,
                Err(DebateError::SessionNotFound(_))
            ));
        }
        assert!(svc.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_known_debate_gets_one_lock_entry() {
        let svc = service();
        let view = svc
            .create(Article::new("Night buses", "More routes after midnight."))
            .await
            .unwrap();
        svc.submit_input(&view.debate_id, "continue").await.unwrap();
        svc.cancel(&view.debate_id).await.unwrap();
        assert_eq!(svc.locks.lock().await.len(), 1);
    }
}
