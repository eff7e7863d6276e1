// Public response schemas. Built once by `review::response`, never re-validated.

use serde::{Deserialize, Serialize};

use crate::agents::types::{AtsAssessment, SuggestionPriority};
use crate::llm_client::Provider;
use crate::scoring::BaselineScore;
use crate::tools::{KeywordOverlap, ResumeToolData, SimilarityAssessment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
}

/// One scored criterion with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCategory {
    pub category: String,
    pub score: f64,
    pub max_score: f64,
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub text: String,
    pub priority: SuggestionPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionGroup {
    pub category: String,
    pub items: Vec<SuggestionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeReviewResponse {
    /// Validated final score, always inside `score_range`.
    pub score: u8,
    pub baseline: BaselineScore,
    pub allowed_variance: u8,
    pub score_range: ScoreRange,
    pub detailed_analysis: Vec<AnalysisCategory>,
    pub suggestions: Vec<SuggestionGroup>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub ats_assessment: AtsAssessment,
    pub summary: String,
    pub tool_data: ResumeToolData,
    pub warnings: Vec<String>,
    pub provider: Provider,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Matched,
    Related,
    Missing,
}

impl SkillStatus {
    pub fn marker(self) -> &'static str {
        match self {
            SkillStatus::Matched => "✅",
            SkillStatus::Related => "🔄",
            SkillStatus::Missing => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLine {
    pub status: SkillStatus,
    pub marker: String,
    pub skill: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceFit {
    pub candidate_years: f64,
    pub required_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchResponse {
    pub score: u8,
    pub baseline: BaselineScore,
    pub allowed_variance: u8,
    pub score_range: ScoreRange,
    pub skills: Vec<SkillLine>,
    pub keyword_overlap: KeywordOverlap,
    pub experience: ExperienceFit,
    pub similarity: Option<SimilarityAssessment>,
    /// False when skill match + similarity were unavailable and only keyword overlap was used.
    pub semantic_available: bool,
    pub detailed_analysis: Vec<AnalysisCategory>,
    pub suggestions: Vec<SuggestionGroup>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub missing_critical: Vec<String>,
    pub summary: String,
    pub warnings: Vec<String>,
    pub provider: Provider,
    pub model: String,
}
