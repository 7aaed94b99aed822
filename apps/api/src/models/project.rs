use serde::{Deserialize, Serialize};

/// What the research project is trying to learn.
///
/// Discovery interviews explore problems without referencing a product;
/// Improvement and Diagnostic interviews are grounded in an existing product
/// and require `objective` + `product_name` on the [`ProjectContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Discovery,
    Improvement,
    Diagnostic,
}

impl GoalType {
    /// Human-readable label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Discovery => "Discovery (understanding user problems and needs)",
            GoalType::Improvement => "Improvement (validating an existing solution)",
            GoalType::Diagnostic => "Diagnostic (finding the root cause of a known problem)",
        }
    }

    /// True for goals whose questions are grounded in a product document.
    pub fn is_product_grounded(&self) -> bool {
        matches!(self, GoalType::Improvement | GoalType::Diagnostic)
    }
}

/// Immutable project setup captured at interview start.
///
/// The only late-bound field is `product_context`: it is filled in when a
/// product document is uploaded mid-session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub project_name: String,
    pub goal: GoalType,
    pub target_audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_context: Option<String>,
}

impl ProjectContext {
    /// Late-binds the product context excerpt after a document upload.
    pub fn set_product_context(&mut self, excerpt: String) {
        self.product_context = Some(excerpt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_type_serializes_lowercase() {
        let json = serde_json::to_string(&GoalType::Discovery).unwrap();
        assert_eq!(json, "\"discovery\"");
        let back: GoalType = serde_json::from_str("\"diagnostic\"").unwrap();
        assert_eq!(back, GoalType::Diagnostic);
    }

    #[test]
    fn test_product_grounded_goals() {
        assert!(!GoalType::Discovery.is_product_grounded());
        assert!(GoalType::Improvement.is_product_grounded());
        assert!(GoalType::Diagnostic.is_product_grounded());
    }

    #[test]
    fn test_late_bound_product_context() {
        let mut project = ProjectContext {
            project_name: "checkout-revamp".to_string(),
            goal: GoalType::Improvement,
            target_audience: "online shoppers".to_string(),
            product_name: Some("ShopFast".to_string()),
            objective: Some("understand cart abandonment".to_string()),
            product_context: None,
        };
        project.set_product_context("ShopFast is a one-click checkout.".to_string());
        assert!(project.product_context.is_some());
    }
}
