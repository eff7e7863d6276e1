//! Agent output shapes.
//!
//! Each agent has a full (cloud) shape and a simplified (local-model) shape.
//! Local shapes convert into full shapes through `From`; that conversion is the
//! normalization boundary, applied once by `Strategy::normalize`.

use serde::{Deserialize, Serialize};

use crate::agents::strategy::TieredOutput;

// ────────────────────────────────────────────────────────────────────────────
// Analysis Agent
// ────────────────────────────────────────────────────────────────────────────

/// Full Analysis Agent output: proposed score plus keyword/ATS assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Proposed final score. Untrusted until clamped by `validate_score`.
    pub final_score: f64,
    #[serde(default)]
    pub score_rationale: String,
    /// Echoes of tool data the agent relied on.
    #[serde(default)]
    pub data_insights: Vec<String>,
    #[serde(default)]
    pub ats_assessment: AtsAssessment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsAssessment {
    #[serde(default)]
    pub compatibility: String,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_critical: Vec<String>,
}

/// Simplified Analysis Agent output from local models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAnalysisResult {
    pub score: f64,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl From<LocalAnalysisResult> for AnalysisResult {
    fn from(local: LocalAnalysisResult) -> Self {
        AnalysisResult {
            final_score: local.score,
            score_rationale: local.notes.trim().to_string(),
            data_insights: Vec::new(),
            ats_assessment: AtsAssessment {
                compatibility: String::new(),
                matched_keywords: Vec::new(),
                missing_critical: clean_list(local.missing),
            },
        }
    }
}

impl TieredOutput for AnalysisResult {
    type Local = LocalAnalysisResult;
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback Agent
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    #[default]
    Medium,
    Low,
}

/// A single categorized improvement suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default = "default_category")]
    pub category: String,
    pub suggestion: String,
    #[serde(default)]
    pub priority: SuggestionPriority,
}

/// Full Feedback Agent output: narrative strengths, weaknesses and suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResult {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub synthesis_notes: String,
}

/// Simplified Feedback Agent output: flat string lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFeedbackResult {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl From<LocalFeedbackResult> for FeedbackResult {
    fn from(local: LocalFeedbackResult) -> Self {
        FeedbackResult {
            strengths: clean_list(local.strengths),
            weaknesses: clean_list(local.weaknesses),
            suggestions: clean_list(local.suggestions)
                .into_iter()
                .map(|suggestion| Suggestion {
                    category: default_category(),
                    suggestion,
                    priority: SuggestionPriority::Medium,
                })
                .collect(),
            synthesis_notes: local.summary.trim().to_string(),
        }
    }
}

impl TieredOutput for FeedbackResult {
    type Local = LocalFeedbackResult;
}

fn default_category() -> String {
    "General".to_string()
}

/// Trims entries and drops blanks. Local models often emit `""` placeholders.
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_analysis_deserializes_with_defaults() {
        let v = json!({ "finalScore": 71.5 });
        let a: AnalysisResult = serde_json::from_value(v).unwrap();
        assert_eq!(a.final_score, 71.5);
        assert!(a.ats_assessment.missing_critical.is_empty());
    }

    #[test]
    fn test_local_analysis_normalizes_missing_into_missing_critical() {
        let local = LocalAnalysisResult {
            score: 64.0,
            missing: vec!["Kubernetes".to_string(), " ".to_string()],
            notes: " solid backend profile ".to_string(),
        };
        let full: AnalysisResult = local.into();
        assert_eq!(full.final_score, 64.0);
        assert_eq!(full.ats_assessment.missing_critical, vec!["Kubernetes"]);
        assert_eq!(full.score_rationale, "solid backend profile");
    }

    #[test]
    fn test_local_feedback_suggestions_get_general_category() {
        let local = LocalFeedbackResult {
            strengths: vec!["Clear layout".to_string()],
            weaknesses: vec![],
            suggestions: vec!["Add metrics to bullets".to_string()],
            summary: "Good start".to_string(),
        };
        let full: FeedbackResult = local.into();
        assert_eq!(full.suggestions.len(), 1);
        assert_eq!(full.suggestions[0].category, "General");
        assert_eq!(full.suggestions[0].priority, SuggestionPriority::Medium);
        assert_eq!(full.synthesis_notes, "Good start");
    }

    #[test]
    fn test_suggestion_priority_defaults_to_medium() {
        let s: Suggestion = serde_json::from_value(json!({ "suggestion": "Use stronger verbs" }))
            .unwrap();
        assert_eq!(s.priority, SuggestionPriority::Medium);
        assert_eq!(s.category, "General");
    }
}
