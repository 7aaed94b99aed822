#![allow(dead_code)]

//! Conversation state: turns, stage, and derived quality counters.
//!
//! The state mutates in exactly two ways: appending a turn (which also
//! updates the derived counters) and committing a phase transition. `stage`
//! is monotonically non-decreasing; `one_word_count` and
//! `rolling_low_quality_count` are derived at append time and never set
//! directly.

use serde::{Deserialize, Serialize};

/// Responses with fewer tokens than this count as low quality.
pub const LOW_QUALITY_WORD_LIMIT: usize = 3;
/// The rolling low-quality window: the last N turns.
pub const LOW_QUALITY_WINDOW: usize = 3;
/// Callers may request analysis once this many turns are complete.
pub const MIN_TURNS_FOR_ANALYSIS: usize = 2;

/// Number of whitespace-delimited tokens in a response.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// One question/response exchange. `word_count` is computed once at append
/// time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub response: String,
    pub word_count: usize,
}

/// Where the interview currently stands.
///
/// `Ended` and `Rescheduled` are terminal. `Staged(n)` carries the committed
/// stage; `Elaborating` holds the stage steady while the next prompt asks
/// the respondent to expand on a thin answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    Init,
    Elaborating,
    Staged(u32),
    Ended,
    Rescheduled,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    turns: Vec<ConversationTurn>,
    stage: u32,
    phase: DialoguePhase,
    one_word_count: u32,
    rolling_low_quality_count: u32,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            stage: 0,
            phase: DialoguePhase::Init,
            one_word_count: 0,
            rolling_low_quality_count: 0,
        }
    }

    /// Records a completed exchange and refreshes the derived counters.
    pub fn append_turn(&mut self, question: String, response: String) {
        let words = word_count(&response);
        if words == 1 {
            self.one_word_count += 1;
        }
        self.turns.push(ConversationTurn {
            question,
            response,
            word_count: words,
        });
        self.rolling_low_quality_count = self
            .turns
            .iter()
            .rev()
            .take(LOW_QUALITY_WINDOW)
            .filter(|t| t.word_count < LOW_QUALITY_WORD_LIMIT)
            .count() as u32;
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    pub fn one_word_count(&self) -> u32 {
        self.one_word_count
    }

    pub fn rolling_low_quality_count(&self) -> u32 {
        self.rolling_low_quality_count
    }

    /// True once enough turns exist for a meaningful analysis.
    pub fn can_finish(&self) -> bool {
        self.turns.len() >= MIN_TURNS_FOR_ANALYSIS
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, DialoguePhase::Ended | DialoguePhase::Rescheduled)
    }

    /// Commits a stage advance. The stage never decreases, even if a smaller
    /// value is passed.
    pub fn enter_stage(&mut self, stage: u32) {
        self.stage = self.stage.max(stage);
        self.phase = DialoguePhase::Staged(self.stage);
    }

    pub fn mark_elaborating(&mut self) {
        self.phase = DialoguePhase::Elaborating;
    }

    pub fn mark_ended(&mut self) {
        self.phase = DialoguePhase::Ended;
    }

    pub fn mark_rescheduled(&mut self) {
        self.phase = DialoguePhase::Rescheduled;
    }
}

/// Formats the transcript as literal `Q:`/`A:` lines for prompt embedding.
/// Responses are quoted verbatim — the prompts rely on that.
pub fn format_recap(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return "No previous conversation.".to_string();
    }

    let mut lines = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        lines.push(format!("Q: {}", turn.question));
        lines.push(format!("A: {}", turn.response));
    }
    lines.join("\n")
}
