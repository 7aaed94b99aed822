//! All LLM prompt constants for the interview module, plus template rendering.
//!
//! Each template family carries an explicit required-variable schema; rendering
//! a spec with a missing required variable is a `ConfigurationError`, never a
//! silent omission.

use std::collections::BTreeMap;

use crate::errors::AppError;

/// System prompt for every question-generation call.
pub const INTERVIEWER_SYSTEM: &str = "You are an expert user researcher \
    following The Mom Test principles. You ask one short, neutral question at \
    a time about the respondent's actual past behavior, never about opinions, \
    hypotheticals, or your own ideas.";

/// System prompt for the post-hoc analysis call.
pub const ANALYST_SYSTEM: &str = "You are a critical product research analyst. \
    You ground every claim in quoted interview evidence, name real companies \
    and products where relevant, and say plainly when the evidence is weak.";

/// The three question-template families the controller selects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFamily {
    /// Audience-first exploration; no document grounding.
    Discovery,
    /// Product-grounded questions for Improvement and Diagnostic goals.
    Guided,
    /// Follow-up that quotes a thin answer back and asks for an example.
    Elaboration,
}

/// A template family plus the variable values that fully determine the
/// rendered prompt text.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub family: TemplateFamily,
    pub variables: BTreeMap<String, String>,
}

impl PromptSpec {
    pub fn new(family: TemplateFamily) -> Self {
        Self {
            family,
            variables: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }
}

impl TemplateFamily {
    pub fn required_variables(&self) -> &'static [&'static str] {
        match self {
            TemplateFamily::Discovery => &[
                "project_name",
                "goal",
                "target_audience",
                "conversation_recap",
                "focus_area",
            ],
            TemplateFamily::Guided => &[
                "project_name",
                "goal",
                "target_audience",
                "objective",
                "product_name",
                "product_context",
                "conversation_recap",
            ],
            TemplateFamily::Elaboration => &["question", "last_response"],
        }
    }

    fn template(&self) -> &'static str {
        match self {
            TemplateFamily::Discovery => DISCOVERY_PROMPT_TEMPLATE,
            TemplateFamily::Guided => GUIDED_PROMPT_TEMPLATE,
            TemplateFamily::Elaboration => ELABORATION_PROMPT_TEMPLATE,
        }
    }
}

/// Discovery question template.
/// Replace: {target_audience}, {project_name}, {goal}, {conversation_recap}, {focus_area}
pub const DISCOVERY_PROMPT_TEMPLATE: &str = r#"You are interviewing {target_audience} about {project_name}.
Research goal: {goal}

Conversation so far:
{conversation_recap}

Focus for this question:
{focus_area}

Generate ONE engaging interview question following The Mom Test principles:
1. Start with "Tell me about..." or "Walk me through..."
2. Focus on their daily life and actual experiences
3. Avoid any mention of solutions or hypotheticals
4. Make it specific to their role and context
Where it sharpens the question, reference their earlier answers in their own words.

The question should help understand their workflow, challenges, and actual behaviors.
Do not ask about the project or potential solutions.

Return only the question, nothing else."#;

/// Guided (Improvement/Diagnostic) question template.
/// Replace: {target_audience}, {product_name}, {project_name}, {goal},
///          {objective}, {product_context}, {conversation_recap}
pub const GUIDED_PROMPT_TEMPLATE: &str = r#"You are interviewing {target_audience} who uses {product_name}.
Project: {project_name}
Research goal: {goal}
Session objective: {objective}

Product context (from the uploaded document):
{product_context}

Conversation so far:
{conversation_recap}

Generate ONE interview question that:
1. References how they actually use {product_name} — concrete, recent usage
2. Probes the root cause behind their last answer (ask "why" one level deeper)
3. Stays neutral — no leading phrasing, no suggested answers
4. Stays within the product context above; never invent features

Return only the question, nothing else."#;

/// Elaboration follow-up template.
/// Replace: {question}, {last_response}
pub const ELABORATION_PROMPT_TEMPLATE: &str = r#"The respondent was asked:
"{question}"

They answered only:
"{last_response}"

Generate ONE short follow-up that quotes their own words back to them and asks
for a concrete, recent example. Do not introduce a new topic and do not move
the interview forward.

Return only the question, nothing else."#;

/// Post-hoc analysis template.
/// Replace: {project_name}, {goal}, {target_audience}, {document_context},
///          {conversation_recap}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze these user research interview responses with a focus on validating real business opportunities.

Project Context:
- Project: {project_name}
- Goal: {goal}
- Target Audience: {target_audience}

Product Document Context:
{document_context}

Full Conversation:
{conversation_recap}

Provide a critical analysis covering:

1. Document Alignment:
   - Where the interview confirms or contradicts the product document context
   - Claims in the document the respondent never substantiated

2. Problem Validation:
   - Specific problem identified (with examples from the interview)
   - Problem severity (frequency, impact, urgency)
   - Current workarounds being used
   - Cost (time/money) of the problem

3. Statement Sentiment:
   - Tag each substantive respondent statement as positive, negative, or neutral
   - Quote the statement verbatim next to its tag

4. Market and Problem Framing:
   - Existing companies solving similar problems (be specific with names)
   - Their current solutions and known gaps
   - Why users aren't adopting these solutions (from interview evidence)

5. Action Items:
   - Concrete follow-ups for the research team

6. Prioritized Recommendations:
   - Specific differentiators to build
   - Features to prioritize
   - Risks to mitigate
   - Next areas to investigate

Requirements:
- Cite specific examples from the interview
- Be critical and realistic about opportunities
- Focus on evidence, not speculation"#;

/// Per-stage focus heuristic for Discovery interviews. Stage 0 is the fixed
/// interest/daily-life opener; later stages narrow toward challenges and
/// workarounds.
pub fn focus_area_for_stage(completed_turns: usize) -> &'static str {
    match completed_turns {
        0 => {
            "Initial question:\n\
             - Understand their daily workflow and what they care about\n\
             - Get them talking about their actual experiences\n\
             - Build rapport and set a comfortable tone"
        }
        1 => {
            "Second question:\n\
             - Dig into specific challenges they mentioned\n\
             - Focus on concrete examples\n\
             - Understand their current process"
        }
        2 => {
            "Third question:\n\
             - Explore workarounds they've developed\n\
             - Understand the impact of the challenges\n\
             - Get specific examples of frustrating moments"
        }
        _ => {
            "Follow-up questions:\n\
             - Dig deeper into interesting areas already mentioned\n\
             - Get specific examples of their experiences\n\
             - Understand their decision-making process"
        }
    }
}

/// Renders a [`PromptSpec`] into the final prompt text.
///
/// Every required variable must be present; extra variables are substituted
/// if the template references them and ignored otherwise.
pub fn render(spec: &PromptSpec) -> Result<String, AppError> {
    for name in spec.family.required_variables() {
        if !spec.variables.contains_key(*name) {
            return Err(AppError::Configuration(format!(
                "prompt variable '{name}' is required for the {:?} template",
                spec.family
            )));
        }
    }

    let mut text = spec.family.template().to_string();
    for (name, value) in &spec.variables {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    Ok(text)
}
