//! Session store: opaque session id → one interview in progress.
//!
//! The store is an explicit interface injected through `AppState`, never
//! ambient shared state. Handles are `Arc<Mutex<Session>>`; handlers hold the
//! lock for the duration of a request, so no two turns are ever appended
//! concurrently to the same conversation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::interview::conversation::ConversationState;
use crate::models::project::ProjectContext;
use crate::retrieval::service::RetrievalService;

/// Everything one interview owns. Dropped at interview end, reschedule, or
/// expiry.
pub struct Session {
    pub project: ProjectContext,
    pub conversation: ConversationState,
    /// Present once a product document has been ingested.
    pub retrieval: Option<RetrievalService>,
    /// The question currently awaiting a response.
    pub current_question: Option<String>,
}

impl Session {
    pub fn new(project: ProjectContext) -> Self {
        Self {
            project,
            conversation: ConversationState::new(),
            retrieval: None,
            current_question: None,
        }
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// get/insert/remove by id. Implementations must be safe to share across
/// request handlers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the session under a fresh id and returns the id.
    async fn insert(&self, session: Session) -> String;
    async fn get(&self, id: &str) -> Option<SessionHandle>;
    /// Removes and returns the session, if present.
    async fn remove(&self, id: &str) -> Option<SessionHandle>;
}

/// In-memory store keyed by UUID.
#[derive(Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Session) -> String {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.inner.read().await.get(id).cloned()
    }

    async fn remove(&self, id: &str) -> Option<SessionHandle> {
        self.inner.write().await.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::GoalType;

    fn make_session() -> Session {
        Session::new(ProjectContext {
            project_name: "fieldwork".to_string(),
            goal: GoalType::Discovery,
            target_audience: "freelance designers".to_string(),
            product_name: None,
            objective: None,
            product_context: None,
        })
    }

    #[tokio::test]
    async fn test_insert_get_remove_roundtrip() {
        let store = InMemorySessionStore::new();
        let id = store.insert(make_session()).await;

        let handle = store.get(&id).await.expect("session should exist");
        {
            let mut session = handle.lock().await;
            session.current_question = Some("Q1".to_string());
        }

        let handle = store.get(&id).await.unwrap();
        assert_eq!(
            handle.lock().await.current_question.as_deref(),
            Some("Q1")
        );

        assert!(store.remove(&id).await.is_some());
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_id_returns_none() {
        let store = InMemorySessionStore::new();
        assert!(store.get("nope").await.is_none());
        assert!(store.remove("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = InMemorySessionStore::new();
        let a = store.insert(make_session()).await;
        let b = store.insert(make_session()).await;
        assert_ne!(a, b);
    }
}
