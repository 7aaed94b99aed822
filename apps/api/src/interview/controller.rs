//! Dialogue-state controller: decides what happens after each response.
//!
//! All decisions are computed from the conversation itself — turn count,
//! stage, and the derived quality counters. Free-text model output is never
//! inspected for control signals.
//!
//! Phase walk: `Init → Elaborating | Staged(n) → … → Ended`, with
//! `Rescheduled` reachable from any non-terminal phase when response quality
//! collapses. The phase/stage commit is deferred to the caller so that a
//! fallback question never advances the interview (see `question.rs`).

use crate::errors::AppError;
use crate::interview::conversation::{
    format_recap, ConversationState, LOW_QUALITY_WINDOW,
};
use crate::interview::prompts::{focus_area_for_stage, PromptSpec, TemplateFamily};
use crate::models::project::ProjectContext;
use crate::retrieval::DocumentChunk;

/// Responses shorter than this trigger an elaboration follow-up.
pub const ELABORATION_WORD_LIMIT: usize = 5;
/// Reschedule once every turn in the rolling window is low quality.
pub const RESCHEDULE_THRESHOLD: u32 = LOW_QUALITY_WINDOW as u32;

/// What the controller wants to do next. `Elaborate` and `Advance` produce a
/// question; `Reschedule` and `End` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextMove {
    Elaborate,
    Advance { stage: u32 },
    Reschedule,
    End,
}

#[derive(Debug, Clone, Copy)]
pub struct DialogueStateController {
    max_turns: usize,
}

impl DialogueStateController {
    pub fn new(max_turns: usize) -> Self {
        Self { max_turns }
    }

    /// Computes the next move from the state as it stands after the latest
    /// append. Does not mutate the state.
    pub fn next_move(&self, state: &ConversationState) -> NextMove {
        if state.rolling_low_quality_count() >= RESCHEDULE_THRESHOLD {
            return NextMove::Reschedule;
        }
        if state.turns().len() >= self.max_turns {
            return NextMove::End;
        }
        match state.last_turn() {
            Some(turn) if turn.word_count < ELABORATION_WORD_LIMIT => NextMove::Elaborate,
            _ => NextMove::Advance {
                stage: state.turns().len() as u32,
            },
        }
    }

    /// Chooses the template family for the next question and fills its
    /// variable schema.
    ///
    /// Must not be called when [`next_move`](Self::next_move) is terminal;
    /// doing so is a caller bug and surfaces as a `ConfigurationError`.
    pub fn select_prompt_spec(
        &self,
        state: &ConversationState,
        project: &ProjectContext,
        retrieved_chunks: &[DocumentChunk],
    ) -> Result<PromptSpec, AppError> {
        match self.next_move(state) {
            NextMove::Elaborate => {
                // next_move only returns Elaborate when a last turn exists
                let last = state.last_turn().ok_or_else(|| {
                    AppError::Configuration(
                        "elaboration requested with no prior turn".to_string(),
                    )
                })?;
                Ok(PromptSpec::new(TemplateFamily::Elaboration)
                    .with("question", last.question.clone())
                    .with("last_response", last.response.clone()))
            }
            NextMove::Advance { .. } => {
                if project.goal.is_product_grounded() {
                    self.guided_spec(state, project, retrieved_chunks)
                } else {
                    Ok(self.discovery_spec(state, project))
                }
            }
            NextMove::Reschedule | NextMove::End => Err(AppError::Configuration(
                "prompt selection requested for a terminal move".to_string(),
            )),
        }
    }

    fn discovery_spec(&self, state: &ConversationState, project: &ProjectContext) -> PromptSpec {
        PromptSpec::new(TemplateFamily::Discovery)
            .with("project_name", project.project_name.clone())
            .with("goal", project.goal.label())
            .with("target_audience", project.target_audience.clone())
            .with("conversation_recap", format_recap(state.turns()))
            .with("focus_area", focus_area_for_stage(state.turns().len()))
    }

    fn guided_spec(
        &self,
        state: &ConversationState,
        project: &ProjectContext,
        retrieved_chunks: &[DocumentChunk],
    ) -> Result<PromptSpec, AppError> {
        let objective = project.objective.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "an objective is required for improvement/diagnostic interviews".to_string(),
            )
        })?;
        let product_name = project.product_name.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "a product name is required for improvement/diagnostic interviews".to_string(),
            )
        })?;

        let product_context = if retrieved_chunks.is_empty() {
            project
                .product_context
                .clone()
                .ok_or_else(|| {
                    AppError::Configuration(
                        "improvement/diagnostic interviews need an uploaded product document \
                         or product context"
                            .to_string(),
                    )
                })?
        } else {
            retrieved_chunks
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n---\n\n")
        };

        Ok(PromptSpec::new(TemplateFamily::Guided)
            .with("project_name", project.project_name.clone())
            .with("goal", project.goal.label())
            .with("target_audience", project.target_audience.clone())
            .with("objective", objective)
            .with("product_name", product_name)
            .with("product_context", product_context)
            .with("conversation_recap", format_recap(state.turns())))
    }
}
