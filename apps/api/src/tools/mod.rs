// Signal extraction tools: deterministic extractors (regex, counting) and
// LLM-backed semantic extractors. Tool data is computed before the agents run
// and embedded into their prompts as grounding.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::scoring::{JobMatchSignals, ResumeSignals};

pub mod achievements;
pub mod experience;
pub mod formatting;
pub mod keywords;
pub mod prompts;
pub mod semantic;

pub use achievements::{count_quantified_achievements, AchievementReport};
pub use formatting::{analyze_formatting, FormattingReport};
pub use keywords::{compute_keyword_overlap, KeywordOverlap};
pub use semantic::{
    ExtractionContext, KeywordExtraction, SimilarityAssessment, SkillMatch, VerbAnalysis,
};

/// Everything measured about a resume before the agents run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeToolData {
    pub achievements: AchievementReport,
    pub formatting: FormattingReport,
    pub keywords: KeywordExtraction,
    pub verbs: VerbAnalysis,
}

/// Skill match + similarity. Absent when semantic extraction was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticData {
    pub skill_match: SkillMatch,
    pub similarity: SimilarityAssessment,
}

/// Everything measured about a resume/job pair before the agents run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchToolData {
    pub job_keywords: Vec<String>,
    pub keyword_overlap: KeywordOverlap,
    pub candidate_years: f64,
    pub required_years: f64,
    pub semantic: Option<SemanticData>,
}

impl ResumeSignals {
    pub fn from_tool_data(data: &ResumeToolData) -> Self {
        ResumeSignals {
            quantified_count: data.achievements.count,
            keyword_count: data.keywords.all().len() as u32,
            verb_count: data.verbs.strong_verbs.len() as u32,
            has_bullet_points: data.formatting.has_bullet_points,
            section_count: data.formatting.section_count,
        }
    }
}

impl JobMatchSignals {
    /// Semantic skill buckets are preferred; keyword overlap stands in without them.
    pub fn from_tool_data(data: &JobMatchToolData) -> Self {
        let (matched, required) = match &data.semantic {
            Some(s) if s.skill_match.required_count() > 0 => {
                (s.skill_match.matched_count(), s.skill_match.required_count())
            }
            _ => (
                data.keyword_overlap.matched.len(),
                data.keyword_overlap.matched.len() + data.keyword_overlap.missing.len(),
            ),
        };

        JobMatchSignals {
            matched_skills_count: matched as u32,
            required_skills_count: required as u32,
            keyword_overlap_percent: data.keyword_overlap.overlap_percent,
            experience_years: data.candidate_years,
            required_years: data.required_years,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt rendering
// ────────────────────────────────────────────────────────────────────────────

impl ResumeToolData {
    /// Plain-text TOOL DATA section for agent prompts.
    pub fn render_for_prompt(&self) -> String {
        let mut out = String::from("TOOL DATA (deterministic, treat as fact):\n");
        let _ = writeln!(
            out,
            "- Quantified achievements: {} (examples: {})",
            self.achievements.count,
            join_or_none(&self.achievements.examples)
        );
        let _ = writeln!(
            out,
            "- Bullet points: {}; sections detected: {} ({})",
            self.formatting.bullet_count,
            self.formatting.section_count,
            join_or_none(&self.formatting.sections)
        );
        let _ = writeln!(out, "- Keywords: {}", join_or_none(&self.keywords.all()));
        let _ = writeln!(
            out,
            "- Strong action verbs ({}): {}",
            self.verbs.strong_verbs.len(),
            join_or_none(&self.verbs.strong_verbs)
        );
        let _ = writeln!(
            out,
            "- Weak action verbs ({}): {}",
            self.verbs.weak_verbs.len(),
            join_or_none(&self.verbs.weak_verbs)
        );
        let _ = writeln!(out, "- Verb strength: {:.1}/10", self.verbs.verb_score);
        out
    }
}

impl JobMatchToolData {
    pub fn render_for_prompt(&self) -> String {
        let mut out = String::from("TOOL DATA (deterministic, treat as fact):\n");
        let _ = writeln!(
            out,
            "- Keyword overlap: {:.1}% ({} of {} job keywords)",
            self.keyword_overlap.overlap_percent,
            self.keyword_overlap.matched.len(),
            self.keyword_overlap.matched.len() + self.keyword_overlap.missing.len()
        );
        let _ = writeln!(out, "- Matched keywords: {}", join_or_none(&self.keyword_overlap.matched));
        let _ = writeln!(out, "- Missing keywords: {}", join_or_none(&self.keyword_overlap.missing));
        let _ = writeln!(
            out,
            "- Experience: candidate ~{:.0} years, job requires {:.0}",
            self.candidate_years, self.required_years
        );

        match &self.semantic {
            Some(s) => {
                for m in &s.skill_match.exact_matches {
                    let _ = writeln!(out, "- Matched skill: {}, evidence: '{}'", m.skill, m.evidence);
                }
                for r in &s.skill_match.related_matches {
                    let _ = writeln!(
                        out,
                        "- Related skill: {} (candidate has {})",
                        r.required, r.candidate_has
                    );
                }
                for m in &s.skill_match.missing_skills {
                    let _ = writeln!(
                        out,
                        "- Missing skill: {} (importance {:?}, learnability {:?})",
                        m.skill, m.importance, m.learnability
                    );
                }
                let _ = writeln!(
                    out,
                    "- Semantic similarity: {:.0}/100. {}",
                    s.similarity.score, s.similarity.explanation
                );
            }
            None => {
                out.push_str("- Semantic skill analysis unavailable; rely on keyword overlap only.\n");
            }
        }
        out
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
