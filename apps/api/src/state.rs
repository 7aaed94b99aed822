use std::sync::Arc;

use crate::config::Config;
use crate::interview::controller::DialogueStateController;
use crate::llm_client::{EmbeddingBackend, GenerationBackend};
use crate::persist::ResultsStore;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Both backends and the session store are trait objects so tests (and future
/// deployments) can swap implementations without touching handler code.
#[derive(Clone)]
pub struct AppState {
    pub generation: Arc<dyn GenerationBackend>,
    pub embeddings: Arc<dyn EmbeddingBackend>,
    pub sessions: Arc<dyn SessionStore>,
    pub results: ResultsStore,
    pub controller: DialogueStateController,
    pub config: Config,
}
