//! Interview lifecycle handlers.
//!
//! Every handler locks the session for the duration of the request, so turns
//! against the same session are strictly serialized. The respondent's answer
//! is appended before the next-question call is attempted: a failed
//! generation never loses recorded input, and because the phase/stage commit
//! waits for a live (non-fallback) question, it never advances the interview
//! either.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::interview::analyzer::InterviewAnalyzer;
use crate::interview::controller::NextMove;
use crate::interview::question::QuestionGenerator;
use crate::models::project::{GoalType, ProjectContext};
use crate::persist::InterviewRecord;
use crate::retrieval::chunker;
use crate::retrieval::index::EmbeddingIndex;
use crate::retrieval::service::RetrievalService;
use crate::session::{Session, SessionHandle};
use crate::state::AppState;

/// How much of an uploaded document is kept as the session's product-context
/// excerpt (used by the analyzer and as grounding fallback).
const PRODUCT_CONTEXT_EXCERPT_CHARS: usize = 2000;

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartProjectRequest {
    pub project_name: String,
    pub goal: GoalType,
    pub target_audience: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub product_context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartProjectResponse {
    pub session_id: String,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub chunk_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Active,
    Reschedule,
    Ended,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponseResponse {
    /// Absent when the interview reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub stage: u32,
    pub can_finish: bool,
    pub status: InterviewStatus,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects
pub async fn handle_start_project(
    State(state): State<AppState>,
    Json(req): Json<StartProjectRequest>,
) -> Result<Json<StartProjectResponse>, AppError> {
    if req.project_name.trim().is_empty() {
        return Err(AppError::Validation("project_name must not be empty".to_string()));
    }
    if req.target_audience.trim().is_empty() {
        return Err(AppError::Validation("target_audience must not be empty".to_string()));
    }

    let project = ProjectContext {
        project_name: req.project_name,
        goal: req.goal,
        target_audience: req.target_audience,
        product_name: req.product_name,
        objective: req.objective,
        product_context: req.product_context,
    };

    let mut session = Session::new(project);

    let spec = state
        .controller
        .select_prompt_spec(&session.conversation, &session.project, &[])?;
    let generator = QuestionGenerator::new(state.generation.clone());
    let outcome = generator.next_question(&spec).await?;

    if !outcome.fallback {
        session.conversation.enter_stage(0);
    }
    session.current_question = Some(outcome.text.clone());

    let session_id = state.sessions.insert(session).await;
    info!("Started interview session {session_id}");

    Ok(Json(StartProjectResponse {
        session_id,
        question: outcome.text,
    }))
}

/// POST /api/v1/projects/:session_id/document
///
/// Extract → chunk → embed, all-or-nothing: the session is only touched once
/// a complete index exists.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadDocumentResponse>, AppError> {
    let handle = get_session(&state, &session_id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
        .ok_or_else(|| AppError::Validation("expected a document field".to_string()))?;

    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "text/plain".to_string());
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

    let text = extract_text(&bytes, &content_type)?;
    let chunks = chunker::split(&text, state.config.chunk_size, state.config.chunk_overlap)?;
    let chunk_count = chunks.len();

    let index = EmbeddingIndex::build(chunks, state.embeddings.as_ref()).await?;

    let mut session = handle.lock().await;
    if session.conversation.is_terminal() {
        return Err(AppError::Validation("interview has already ended".to_string()));
    }
    session.retrieval = Some(RetrievalService::new(index));
    session
        .project
        .set_product_context(text.chars().take(PRODUCT_CONTEXT_EXCERPT_CHARS).collect());

    info!("Session {session_id}: indexed document as {chunk_count} chunks");

    Ok(Json(UploadDocumentResponse { chunk_count }))
}

/// POST /api/v1/projects/:session_id/responses
pub async fn handle_submit_response(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitResponseRequest>,
) -> Result<Json<SubmitResponseResponse>, AppError> {
    if req.response.trim().is_empty() {
        return Err(AppError::Validation("response must not be empty".to_string()));
    }

    let handle = get_session(&state, &session_id).await?;
    let mut session = handle.lock().await;

    if session.conversation.is_terminal() {
        return Err(AppError::Validation("interview has already ended".to_string()));
    }

    // Record the answer before any backend call: a failed generation must
    // never lose respondent input.
    let question = session.current_question.take().unwrap_or_default();
    session.conversation.append_turn(question, req.response);

    match state.controller.next_move(&session.conversation) {
        NextMove::Reschedule => {
            session.conversation.mark_rescheduled();
            warn!("Session {session_id}: response quality collapsed, rescheduling");
            let reply = SubmitResponseResponse {
                question: None,
                stage: session.conversation.stage(),
                can_finish: session.conversation.can_finish(),
                status: InterviewStatus::Reschedule,
            };
            drop(session);
            state.sessions.remove(&session_id).await;
            Ok(Json(reply))
        }
        NextMove::End => {
            // Terminal for questioning, but the session stays until the
            // analysis endpoint collects it.
            session.conversation.mark_ended();
            info!("Session {session_id}: reached max turns, interview ended");
            Ok(Json(SubmitResponseResponse {
                question: None,
                stage: session.conversation.stage(),
                can_finish: session.conversation.can_finish(),
                status: InterviewStatus::Ended,
            }))
        }
        mv @ (NextMove::Elaborate | NextMove::Advance { .. }) => {
            let retrieved = if session.project.goal.is_product_grounded() {
                match &session.retrieval {
                    Some(service) => {
                        let query = session
                            .conversation
                            .last_turn()
                            .map(|t| t.response.clone())
                            .unwrap_or_default();
                        service
                            .query(state.embeddings.as_ref(), &query, state.config.retrieval_top_k)
                            .await?
                    }
                    None => Vec::new(),
                }
            } else {
                Vec::new()
            };

            let spec = state.controller.select_prompt_spec(
                &session.conversation,
                &session.project,
                &retrieved,
            )?;
            let generator = QuestionGenerator::new(state.generation.clone());
            let outcome = generator.next_question(&spec).await?;

            // A fallback question keeps the interview where it was.
            if !outcome.fallback {
                match mv {
                    NextMove::Elaborate => session.conversation.mark_elaborating(),
                    NextMove::Advance { stage } => session.conversation.enter_stage(stage),
                    _ => {}
                }
            }
            session.current_question = Some(outcome.text.clone());

            Ok(Json(SubmitResponseResponse {
                question: Some(outcome.text),
                stage: session.conversation.stage(),
                can_finish: session.conversation.can_finish(),
                status: InterviewStatus::Active,
            }))
        }
    }
}

/// POST /api/v1/projects/:session_id/analysis
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let handle = get_session(&state, &session_id).await?;
    let mut session = handle.lock().await;

    let analyzer = InterviewAnalyzer::new(state.generation.clone());
    let result = analyzer
        .analyze(
            &session.conversation,
            &session.project,
            session.project.product_context.as_deref(),
        )
        .await?;

    let record = InterviewRecord {
        project_info: session.project.clone(),
        conversation_history: session.conversation.turns().to_vec(),
        analysis: result.text.clone(),
        completed_at: Utc::now(),
    };
    state.results.write_record(&record).await?;

    session.conversation.mark_ended();
    drop(session);
    state.sessions.remove(&session_id).await;
    info!("Session {session_id}: interview analyzed and recorded");

    Ok(Json(AnalyzeResponse {
        analysis: result.text,
    }))
}

async fn get_session(state: &AppState, session_id: &str) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::interview::controller::DialogueStateController;
    use crate::interview::question::FALLBACK_QUESTION;
    use crate::llm_client::{ChatMessage, EmbeddingBackend, GenerationBackend, LlmError};
    use crate::persist::ResultsStore;
    use crate::session::InMemorySessionStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Echoes the rendered prompt back as the "generated" text so tests can
    /// assert which template family produced it.
    struct EchoBackend;

    #[async_trait]
    impl GenerationBackend for EchoBackend {
        async fn complete(
            &self,
            _system: &str,
            messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Ok(messages[0].content.clone())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl GenerationBackend for FailingBackend {
        async fn complete(
            &self,
            _system: &str,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    struct FlatEmbedder;

    #[async_trait]
    impl EmbeddingBackend for FlatEmbedder {
        fn model_name(&self) -> &str {
            "flat-embed"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    fn make_state(generation: Arc<dyn GenerationBackend>, results_dir: &std::path::Path) -> AppState {
        AppState {
            generation,
            embeddings: Arc::new(FlatEmbedder),
            sessions: Arc::new(InMemorySessionStore::new()),
            results: ResultsStore::new(results_dir),
            controller: DialogueStateController::new(10),
            config: Config {
                openai_api_key: "test-key".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                chunk_size: 100,
                chunk_overlap: 20,
                retrieval_top_k: 3,
                max_turns: 10,
                results_dir: results_dir.to_path_buf(),
            },
        }
    }

    fn discovery_request() -> StartProjectRequest {
        StartProjectRequest {
            project_name: "fieldwork".to_string(),
            goal: GoalType::Discovery,
            target_audience: "freelance designers".to_string(),
            product_name: None,
            objective: None,
            product_context: None,
        }
    }

    #[tokio::test]
    async fn test_start_project_returns_first_question() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());

        let Json(reply) = handle_start_project(State(state.clone()), Json(discovery_request()))
            .await
            .unwrap();
        assert!(!reply.session_id.is_empty());
        // echo backend returns the rendered discovery prompt
        assert!(reply.question.contains("freelance designers"));
        assert!(state.sessions.get(&reply.session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_start_project_rejects_blank_fields() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());
        let mut req = discovery_request();
        req.project_name = "   ".to_string();
        let err = handle_start_project(State(state), Json(req)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    /// An 8-word answer advances to stage 1, a 2-word answer flips the
    /// controller to elaboration, and the turn-3 prompt quotes the 2-word
    /// answer verbatim.
    #[tokio::test]
    async fn test_two_turn_elaboration_flow() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());

        let Json(start) = handle_start_project(State(state.clone()), Json(discovery_request()))
            .await
            .unwrap();

        let Json(first) = handle_submit_response(
            State(state.clone()),
            Path(start.session_id.clone()),
            Json(SubmitResponseRequest {
                response: "I spend most mornings emailing clients about revisions".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(first.status, InterviewStatus::Active);
        assert_eq!(first.stage, 1);
        assert!(!first.can_finish);

        let Json(second) = handle_submit_response(
            State(state.clone()),
            Path(start.session_id.clone()),
            Json(SubmitResponseRequest {
                response: "logo one".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(second.status, InterviewStatus::Active);
        // elaboration holds the stage
        assert_eq!(second.stage, 1);
        assert!(second.can_finish);
        // the elaboration prompt quotes the thin answer verbatim
        assert!(second.question.unwrap().contains("logo one"));
    }

    #[tokio::test]
    async fn test_quality_collapse_reschedules_and_drops_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());

        let Json(start) = handle_start_project(State(state.clone()), Json(discovery_request()))
            .await
            .unwrap();

        for response in ["no", "dunno"] {
            let Json(reply) = handle_submit_response(
                State(state.clone()),
                Path(start.session_id.clone()),
                Json(SubmitResponseRequest {
                    response: response.to_string(),
                }),
            )
            .await
            .unwrap();
            assert_eq!(reply.status, InterviewStatus::Active);
        }

        let Json(last) = handle_submit_response(
            State(state.clone()),
            Path(start.session_id.clone()),
            Json(SubmitResponseRequest {
                response: "maybe".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(last.status, InterviewStatus::Reschedule);
        assert!(last.question.is_none());
        assert!(state.sessions.get(&start.session_id).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_stage_and_returns_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(FailingBackend), dir.path());

        let Json(start) = handle_start_project(State(state.clone()), Json(discovery_request()))
            .await
            .unwrap();
        assert_eq!(start.question, FALLBACK_QUESTION);

        let Json(reply) = handle_submit_response(
            State(state.clone()),
            Path(start.session_id.clone()),
            Json(SubmitResponseRequest {
                response: "a long and detailed answer about my workflow".to_string(),
            }),
        )
        .await
        .unwrap();
        // input recorded, fallback question returned, stage not advanced
        assert_eq!(reply.question.as_deref(), Some(FALLBACK_QUESTION));
        assert_eq!(reply.stage, 0);

        let handle = state.sessions.get(&start.session_id).await.unwrap();
        assert_eq!(handle.lock().await.conversation.turns().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_persists_record_and_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());

        let Json(start) = handle_start_project(State(state.clone()), Json(discovery_request()))
            .await
            .unwrap();

        for response in [
            "I spend most mornings emailing clients about revisions",
            "the logo project dragged on for three weeks",
        ] {
            handle_submit_response(
                State(state.clone()),
                Path(start.session_id.clone()),
                Json(SubmitResponseRequest {
                    response: response.to_string(),
                }),
            )
            .await
            .unwrap();
        }

        let Json(analysis) =
            handle_analyze(State(state.clone()), Path(start.session_id.clone()))
                .await
                .unwrap();
        assert!(analysis.analysis.contains("the logo project dragged on"));
        assert!(state.sessions.get(&start.session_id).await.is_none());

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("interview_"))
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_before_any_turn_is_insufficient_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());

        let Json(start) = handle_start_project(State(state.clone()), Json(discovery_request()))
            .await
            .unwrap();

        let err = handle_analyze(State(state.clone()), Path(start.session_id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientData(_)));
        // a failed analysis is a no-op: the session survives
        assert!(state.sessions.get(&start.session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_submit_to_unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(Arc::new(EchoBackend), dir.path());
        let err = handle_submit_response(
            State(state),
            Path("missing".to_string()),
            Json(SubmitResponseRequest {
                response: "hello there friend".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
