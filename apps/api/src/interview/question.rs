//! Question generation: renders a [`PromptSpec`] and invokes the generation
//! backend.
//!
//! Backend failures never propagate out of this module — the respondent gets
//! the fixed fallback question and the outcome is flagged so the caller knows
//! not to advance the interview. A rendering failure (missing required
//! variable) is a caller bug and does propagate.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::interview::prompts::{render, PromptSpec, INTERVIEWER_SYSTEM};
use crate::llm_client::{ChatMessage, GenerationBackend, TEMPERATURE};

/// Asked verbatim whenever the generation backend fails. Fixed text so logs
/// and callers can recognize a fallback turn.
pub const FALLBACK_QUESTION: &str =
    "Could you walk me through the most recent time this came up in your day-to-day, \
     start to finish?";

/// A generated question plus whether it came from the fallback path.
#[derive(Debug, Clone)]
pub struct QuestionOutcome {
    pub text: String,
    pub fallback: bool,
}

pub struct QuestionGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl QuestionGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Produces the next question for `spec`.
    ///
    /// Never returns a backend error: on failure the fallback question is
    /// returned with `fallback = true`.
    pub async fn next_question(&self, spec: &PromptSpec) -> Result<QuestionOutcome, AppError> {
        let prompt = render(spec)?;
        debug!("Generating question for {:?} template", spec.family);

        match self
            .backend
            .complete(INTERVIEWER_SYSTEM, &[ChatMessage::user(prompt)], TEMPERATURE)
            .await
        {
            Ok(text) => Ok(QuestionOutcome {
                text: text.trim().to_string(),
                fallback: false,
            }),
            Err(e) => {
                warn!("Question generation failed, using fallback: {e}");
                Ok(QuestionOutcome {
                    text: FALLBACK_QUESTION.to_string(),
                    fallback: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::prompts::TemplateFamily;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;

    struct EchoBackend;

    #[async_trait]
    impl GenerationBackend for EchoBackend {
        async fn complete(
            &self,
            _system: &str,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Ok("  What does a normal Tuesday look like?  \n".to_string())
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
            Err(LlmError::RateLimited { retries: 3 })
        }
    }

    fn elaboration_spec() -> PromptSpec {
        PromptSpec::new(TemplateFamily::Elaboration)
            .with("question", "What slows you down?")
            .with("last_response", "meetings")
    }

    #[tokio::test]
    async fn test_question_is_trimmed() {
        let generator = QuestionGenerator::new(Arc::new(EchoBackend));
        let outcome = generator.next_question(&elaboration_spec()).await.unwrap();
        assert_eq!(outcome.text, "What does a normal Tuesday look like?");
        assert!(!outcome.fallback);
    }

    #[tokio::test]
    async fn test_backend_failure_returns_fallback() {
        let generator = QuestionGenerator::new(Arc::new(FailingBackend));
        let outcome = generator.next_question(&elaboration_spec()).await.unwrap();
        assert_eq!(outcome.text, FALLBACK_QUESTION);
        assert!(outcome.fallback);
    }

    #[tokio::test]
    async fn test_missing_variable_still_propagates() {
        let generator = QuestionGenerator::new(Arc::new(EchoBackend));
        let spec = PromptSpec::new(TemplateFamily::Elaboration).with("question", "Q?");
        let err = generator.next_question(&spec).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
