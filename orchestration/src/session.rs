//! Session store: debate identifier → current debate state.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::debate::DebateState;
use crate::errors::{DebateError, DebateResult};

/// Fresh debate identifier (UUID v4).
pub fn new_debate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Storage for debate states between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new debate and return its identifier.
    async fn create(&self, state: DebateState) -> DebateResult<String>;

    async fn get(&self, id: &str) -> DebateResult<DebateState>;

    /// Replace the state of an existing debate.
    async fn update(&self, id: &str, state: DebateState) -> DebateResult<()>;
}

/// Process-local store keyed by UUID v4 identifiers.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, DebateState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, state: DebateState) -> DebateResult<String> {
        let id = new_debate_id();
        self.sessions.write().await.insert(id.clone(), state);
        Ok(id)
    }

    async fn get(&self, id: &str) -> DebateResult<DebateState> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DebateError::SessionNotFound(id.to_string()))
    }

    async fn update(&self, id: &str, state: DebateState) -> DebateResult<()> {
        match self.sessions.write().await.get_mut(id) {
            Some(slot) => {
                *slot = state;
                Ok(())
            }
            None => Err(DebateError::SessionNotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::Article;

    #[tokio::test]
    async fn test_create_get_update() {
        let store = InMemorySessionStore::new();
        let id = store
            .create(DebateState::new(Article::new("t", "b")))
            .await
            .unwrap();
        assert!(Uuid::parse_str(&id).is_ok());

        let mut state = store.get(&id).await.unwrap();
        state.user_inputs.push("note".into());
        store.update(&id, state).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().user_inputs, vec!["note"]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = InMemorySessionStore::new();
        let a = store.create(DebateState::new(Article::new("a", "b"))).await.unwrap();
        let b = store.create(DebateState::new(Article::new("a", "b"))).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = InMemorySessionStore::new();
        assert!(matches!(
            store.get("missing").await,
            Err(DebateError::SessionNotFound(_))
        ));
        assert!(matches!(
            store
                .update("missing", DebateState::new(Article::new("t", "b")))
                .await,
            Err(DebateError::SessionNotFound(_))
        ));
    }
}
