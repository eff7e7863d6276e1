//! Response builders: normalized agent output + tool data → public schema.
//!
//! Pure transformation. The score arrives already validated; nothing here
//! re-checks it. Job match has two skill renderings: semantic buckets when skill
//! matching succeeded, keyword overlap only when it did not.

use crate::agents::executor::AgentResults;
use crate::agents::types::{FeedbackResult, SuggestionPriority};
use crate::llm_client::ModelTarget;
use crate::scoring::baseline::Criterion;
use crate::scoring::{BaselineScore, JobMatchSignals, ScoreValidation};
use crate::tools::semantic::{Importance, Learnability};
use crate::tools::{JobMatchToolData, KeywordOverlap, ResumeToolData, SemanticData};

use super::types::{
    AnalysisCategory, ExperienceFit, JobMatchResponse, ResumeReviewResponse, ScoreRange,
    SkillLine, SkillStatus, SuggestionGroup, SuggestionItem,
};

/// Keywords listed per finding before the list is cut.
const MAX_LISTED: usize = 10;

const SUBJECTIVE_NOTE: &str =
    "No deterministic signal: seeded at a default that the analysis agent may adjust within the allowed range.";

pub struct ResumeResponseParts<'a> {
    pub tool_data: ResumeToolData,
    pub baseline: BaselineScore,
    pub variance: u8,
    pub validation: ScoreValidation,
    pub agents: AgentResults,
    pub target: &'a ModelTarget,
    pub warnings: Vec<String>,
}

pub struct JobMatchResponseParts<'a> {
    pub tool_data: JobMatchToolData,
    pub signals: JobMatchSignals,
    pub baseline: BaselineScore,
    pub variance: u8,
    pub validation: ScoreValidation,
    pub agents: AgentResults,
    pub target: &'a ModelTarget,
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Resume review
// ────────────────────────────────────────────────────────────────────────────

pub fn build_resume_response(parts: ResumeResponseParts<'_>) -> ResumeReviewResponse {
    let ResumeResponseParts {
        tool_data,
        baseline,
        variance,
        validation,
        agents,
        target,
        mut warnings,
    } = parts;

    let mut detailed_analysis: Vec<AnalysisCategory> = baseline
        .breakdown
        .criteria()
        .into_iter()
        .map(|c| category(c, resume_findings(c.name, &tool_data)))
        .collect();
    detailed_analysis.push(agent_category(validation.score, &agents));

    let mut suggestions = group_suggestions(&agents.feedback);
    let verb_items: Vec<SuggestionItem> = tool_data
        .verbs
        .suggestions
        .iter()
        .map(|s| SuggestionItem {
            text: format!("Replace '{}' with '{}'", s.weak, s.stronger),
            priority: SuggestionPriority::Low,
        })
        .collect();
    push_group(&mut suggestions, "Action Verbs", verb_items);

    warnings.extend(validation.warning.clone());

    ResumeReviewResponse {
        score: validation.score,
        score_range: range(baseline.score, variance),
        allowed_variance: variance,
        baseline,
        detailed_analysis,
        suggestions,
        strengths: agents.feedback.strengths.clone(),
        weaknesses: agents.feedback.weaknesses.clone(),
        summary: summary(&agents),
        ats_assessment: agents.analysis.ats_assessment,
        tool_data,
        warnings,
        provider: target.provider,
        model: target.model.clone(),
    }
}

fn resume_findings(criterion: &str, data: &ResumeToolData) -> Vec<String> {
    match criterion {
        "keywords" => {
            let all = data.keywords.all();
            vec![
                format!("{} distinct keywords detected", all.len()),
                format!("Detected: {}", list(&all)),
            ]
        }
        "achievements" => {
            let mut out = vec![format!("{} quantified achievements", data.achievements.count)];
            out.extend(data.achievements.examples.iter().map(|e| format!("Example: '{e}'")));
            out
        }
        "verbs" => vec![format!(
            "{} strong and {} weak action verbs (strength {:.1}/10)",
            data.verbs.strong_verbs.len(),
            data.verbs.weak_verbs.len(),
            data.verbs.verb_score
        )],
        "formatting" => vec![
            if data.formatting.has_bullet_points {
                format!("Uses bullet points ({})", data.formatting.bullet_count)
            } else {
                "No bullet points detected".to_string()
            },
            format!(
                "{} sections: {}",
                data.formatting.section_count,
                list(&data.formatting.sections)
            ),
        ],
        _ => vec![SUBJECTIVE_NOTE.to_string()],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job match
// ────────────────────────────────────────────────────────────────────────────

pub fn build_job_match_response(parts: JobMatchResponseParts<'_>) -> JobMatchResponse {
    let JobMatchResponseParts {
        tool_data,
        signals,
        baseline,
        variance,
        validation,
        agents,
        target,
        mut warnings,
    } = parts;

    let skills = match &tool_data.semantic {
        Some(semantic) => semantic_skill_lines(semantic),
        None => keyword_skill_lines(&tool_data.keyword_overlap),
    };

    let mut detailed_analysis: Vec<AnalysisCategory> = baseline
        .breakdown
        .criteria()
        .into_iter()
        .map(|c| category(c, job_findings(c.name, &tool_data, &signals)))
        .collect();
    detailed_analysis.push(agent_category(validation.score, &agents));

    let mut suggestions = group_suggestions(&agents.feedback);
    if let Some(semantic) = &tool_data.semantic {
        let critical: Vec<SuggestionItem> = semantic
            .skill_match
            .missing_skills
            .iter()
            .filter(|m| m.importance == Importance::Critical)
            .map(|m| SuggestionItem {
                text: format!(
                    "Close the gap on {}: {}",
                    m.skill,
                    learnability_label(m.learnability)
                ),
                priority: SuggestionPriority::High,
            })
            .collect();
        push_group(&mut suggestions, "Critical Skills", critical);
    }

    warnings.extend(validation.warning.clone());

    JobMatchResponse {
        score: validation.score,
        score_range: range(baseline.score, variance),
        allowed_variance: variance,
        baseline,
        skills,
        experience: ExperienceFit {
            candidate_years: tool_data.candidate_years,
            required_years: tool_data.required_years,
        },
        similarity: tool_data.semantic.as_ref().map(|s| s.similarity.clone()),
        semantic_available: tool_data.semantic.is_some(),
        keyword_overlap: tool_data.keyword_overlap,
        detailed_analysis,
        suggestions,
        strengths: agents.feedback.strengths.clone(),
        gaps: agents.feedback.weaknesses.clone(),
        missing_critical: agents.analysis.ats_assessment.missing_critical.clone(),
        summary: summary(&agents),
        warnings,
        provider: target.provider,
        model: target.model.clone(),
    }
}

fn semantic_skill_lines(semantic: &SemanticData) -> Vec<SkillLine> {
    let m = &semantic.skill_match;
    let exact = m.exact_matches.iter().map(|e| {
        let detail = if e.evidence.is_empty() {
            format!("matched skill: {}", e.skill)
        } else {
            format!("matched skill: {}, evidence: '{}'", e.skill, e.evidence)
        };
        skill_line(SkillStatus::Matched, &e.skill, detail)
    });
    let related = m.related_matches.iter().map(|r| {
        let detail = match (r.candidate_has.is_empty(), r.explanation.is_empty()) {
            (true, _) => "related experience".to_string(),
            (false, true) => format!("transferable from {}", r.candidate_has),
            (false, false) => format!("transferable from {}: {}", r.candidate_has, r.explanation),
        };
        skill_line(SkillStatus::Related, &r.required, detail)
    });
    let missing = m.missing_skills.iter().map(|s| {
        let detail = format!(
            "{} gap, {}",
            importance_label(s.importance),
            learnability_label(s.learnability)
        );
        skill_line(SkillStatus::Missing, &s.skill, detail)
    });
    exact.chain(related).chain(missing).collect()
}

/// Rendering used when semantic skill matching was unavailable.
fn keyword_skill_lines(overlap: &KeywordOverlap) -> Vec<SkillLine> {
    let matched = overlap
        .matched
        .iter()
        .map(|k| skill_line(SkillStatus::Matched, k, "found in resume".to_string()));
    let missing = overlap
        .missing
        .iter()
        .map(|k| skill_line(SkillStatus::Missing, k, "not found in resume".to_string()));
    matched.chain(missing).collect()
}

fn job_findings(criterion: &str, data: &JobMatchToolData, signals: &JobMatchSignals) -> Vec<String> {
    match criterion {
        "skillsMatch" => {
            let source = if data.semantic.is_some() {
                "semantic skill match"
            } else {
                "keyword overlap"
            };
            vec![format!(
                "{} of {} required skills matched ({source})",
                signals.matched_skills_count, signals.required_skills_count
            )]
        }
        "experienceMatch" => vec![if data.required_years > 0.0 {
            format!(
                "Candidate has ~{:.0} years; job requires {:.0}",
                data.candidate_years, data.required_years
            )
        } else {
            "Job states no year requirement".to_string()
        }],
        "keywordOverlap" => vec![
            format!(
                "{:.1}% of job keywords found in the resume",
                data.keyword_overlap.overlap_percent
            ),
            format!("Missing: {}", list(&data.keyword_overlap.missing)),
        ],
        _ => vec![SUBJECTIVE_NOTE.to_string()],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

fn category(c: Criterion, findings: Vec<String>) -> AnalysisCategory {
    AnalysisCategory {
        category: criterion_label(c.name).to_string(),
        score: c.points,
        max_score: c.max,
        findings,
    }
}

fn agent_category(final_score: u8, agents: &AgentResults) -> AnalysisCategory {
    let mut findings = Vec::new();
    if !agents.analysis.score_rationale.is_empty() {
        findings.push(agents.analysis.score_rationale.clone());
    }
    findings.extend(agents.analysis.data_insights.iter().cloned());
    AnalysisCategory {
        category: "Agent Assessment".to_string(),
        score: f64::from(final_score),
        max_score: 100.0,
        findings,
    }
}

fn criterion_label(name: &str) -> &str {
    match name {
        "keywords" => "Keywords",
        "achievements" => "Quantified Achievements",
        "verbs" => "Action Verbs",
        "formatting" => "Formatting",
        "summary" => "Professional Summary",
        "experienceClarity" => "Experience Clarity",
        "skillsSection" => "Skills Section",
        "grammar" => "Grammar",
        "skillsMatch" => "Skills Match",
        "experienceMatch" => "Experience",
        "keywordOverlap" => "Keyword Overlap",
        "qualifications" => "Qualifications",
        "industryFit" => "Industry Fit",
        other => other,
    }
}

/// Groups feedback suggestions by category (first-seen order), high priority first.
fn group_suggestions(feedback: &FeedbackResult) -> Vec<SuggestionGroup> {
    let mut groups: Vec<SuggestionGroup> = Vec::new();
    for s in &feedback.suggestions {
        let item = SuggestionItem {
            text: s.suggestion.clone(),
            priority: s.priority,
        };
        match groups.iter_mut().find(|g| g.category == s.category) {
            Some(group) => group.items.push(item),
            None => groups.push(SuggestionGroup {
                category: s.category.clone(),
                items: vec![item],
            }),
        }
    }
    for group in &mut groups {
        group.items.sort_by_key(|i| priority_rank(i.priority));
    }
    groups
}

fn push_group(groups: &mut Vec<SuggestionGroup>, category: &str, items: Vec<SuggestionItem>) {
    if items.is_empty() {
        return;
    }
    match groups.iter_mut().find(|g| g.category == category) {
        Some(group) => group.items.extend(items),
        None => groups.push(SuggestionGroup {
            category: category.to_string(),
            items,
        }),
    }
}

fn priority_rank(p: SuggestionPriority) -> u8 {
    match p {
        SuggestionPriority::High => 0,
        SuggestionPriority::Medium => 1,
        SuggestionPriority::Low => 2,
    }
}

fn importance_label(i: Importance) -> &'static str {
    match i {
        Importance::Critical => "critical",
        Importance::Important => "important",
        Importance::NiceToHave => "nice-to-have",
    }
}

fn learnability_label(l: Learnability) -> &'static str {
    match l {
        Learnability::Quick => "quick to learn",
        Learnability::Moderate => "moderate effort to learn",
        Learnability::Significant => "significant effort to learn",
    }
}

fn summary(agents: &AgentResults) -> String {
    if agents.feedback.synthesis_notes.trim().is_empty() {
        agents.analysis.score_rationale.clone()
    } else {
        agents.feedback.synthesis_notes.clone()
    }
}

fn skill_line(status: SkillStatus, skill: &str, detail: String) -> SkillLine {
    SkillLine {
        status,
        marker: status.marker().to_string(),
        skill: skill.to_string(),
        detail,
    }
}

fn range(baseline: u8, variance: u8) -> ScoreRange {
    ScoreRange {
        min: baseline.saturating_sub(variance),
        max: baseline.saturating_add(variance).min(100),
    }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    let shown = &items[..items.len().min(MAX_LISTED)];
    let mut out = shown.join(", ");
    if items.len() > MAX_LISTED {
        out.push_str(&format!(" (+{} more)", items.len() - MAX_LISTED));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::types::{AnalysisResult, AtsAssessment, Suggestion};
    use crate::llm_client::Provider;
    use crate::scoring::{calculate_job_match_score, validate_score};
    use crate::tools::semantic::{ExactMatch, MissingSkill, RelatedMatch};
    use crate::tools::{SimilarityAssessment, SkillMatch};

    fn agents() -> AgentResults {
        AgentResults {
            analysis: AnalysisResult {
                final_score: 50.0,
                score_rationale: "Good keyword coverage".to_string(),
                data_insights: vec!["3 of 10 skills".to_string()],
                ats_assessment: AtsAssessment {
                    compatibility: "medium".to_string(),
                    matched_keywords: vec![],
                    missing_critical: vec!["Kafka".to_string()],
                },
            },
            feedback: FeedbackResult {
                strengths: vec!["Rust depth".to_string()],
                weaknesses: vec!["No Kafka".to_string()],
                suggestions: vec![
                    Suggestion {
                        category: "Skills".to_string(),
                        suggestion: "Mention streaming work".to_string(),
                        priority: SuggestionPriority::Low,
                    },
                    Suggestion {
                        category: "Skills".to_string(),
                        suggestion: "Add Kafka project".to_string(),
                        priority: SuggestionPriority::High,
                    },
                ],
                synthesis_notes: String::new(),
            },
        }
    }

    fn parts(tool_data: JobMatchToolData, target: &ModelTarget) -> JobMatchResponseParts<'_> {
        let signals = JobMatchSignals::from_tool_data(&tool_data);
        let baseline = calculate_job_match_score(&signals);
        JobMatchResponseParts {
            tool_data,
            signals,
            validation: validate_score(50.0, baseline.score, 15),
            baseline,
            variance: 15,
            agents: agents(),
            target,
            warnings: vec![],
        }
    }

    fn overlap() -> KeywordOverlap {
        KeywordOverlap {
            matched: vec!["Rust".to_string()],
            missing: vec!["Kafka".to_string()],
            overlap_percent: 50.0,
        }
    }

    fn target() -> ModelTarget {
        ModelTarget {
            provider: Provider::Anthropic,
            model: "m".to_string(),
        }
    }

    #[test]
    fn test_keyword_only_rendering_when_semantic_missing() {
        let t = target();
        let data = JobMatchToolData {
            job_keywords: vec!["Rust".to_string(), "Kafka".to_string()],
            keyword_overlap: overlap(),
            candidate_years: 3.0,
            required_years: 5.0,
            semantic: None,
        };
        let r = build_job_match_response(parts(data, &t));
        assert!(!r.semantic_available);
        assert!(r.similarity.is_none());
        assert_eq!(r.skills.len(), 2);
        assert_eq!(r.skills[0].marker, "✅");
        assert_eq!(r.skills[0].detail, "found in resume");
        assert_eq!(r.skills[1].status, SkillStatus::Missing);
        assert_eq!(r.summary, "Good keyword coverage");
    }

    #[test]
    fn test_semantic_rendering_uses_markers_and_evidence() {
        let t = target();
        let data = JobMatchToolData {
            job_keywords: vec![],
            keyword_overlap: overlap(),
            candidate_years: 0.0,
            required_years: 0.0,
            semantic: Some(SemanticData {
                skill_match: SkillMatch {
                    exact_matches: vec![ExactMatch {
                        skill: "Rust".to_string(),
                        evidence: "Built REST APIs in Rust".to_string(),
                    }],
                    related_matches: vec![RelatedMatch {
                        required: "Kafka".to_string(),
                        candidate_has: "RabbitMQ".to_string(),
                        explanation: String::new(),
                    }],
                    missing_skills: vec![MissingSkill {
                        skill: "Terraform".to_string(),
                        importance: Importance::Critical,
                        learnability: Learnability::Quick,
                    }],
                },
                similarity: SimilarityAssessment {
                    score: 70.0,
                    ..Default::default()
                },
            }),
        };
        let r = build_job_match_response(parts(data, &t));
        let markers: Vec<&str> = r.skills.iter().map(|s| s.marker.as_str()).collect();
        assert_eq!(markers, vec!["✅", "🔄", "❌"]);
        assert_eq!(r.skills[0].detail, "matched skill: Rust, evidence: 'Built REST APIs in Rust'");
        assert_eq!(r.skills[1].detail, "transferable from RabbitMQ");
        assert_eq!(r.skills[2].detail, "critical gap, quick to learn");
        assert!(r.semantic_available);
        assert!(r.suggestions.iter().any(|g| g.category == "Critical Skills"));
    }

    #[test]
    fn test_suggestions_grouped_high_priority_first() {
        let groups = group_suggestions(&agents().feedback);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items[0].text, "Add Kafka project");
        assert_eq!(groups[0].items[1].priority, SuggestionPriority::Low);
    }

    #[test]
    fn test_clamp_warning_is_carried_into_response() {
        let t = target();
        let data = JobMatchToolData {
            job_keywords: vec![],
            keyword_overlap: overlap(),
            candidate_years: 0.0,
            required_years: 0.0,
            semantic: None,
        };
        let mut p = parts(data, &t);
        p.validation = validate_score(99.0, p.baseline.score, 15);
        let r = build_job_match_response(p);
        assert_eq!(r.score, r.score_range.max);
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn test_list_is_cut() {
        let items: Vec<String> = (0..12).map(|i| format!("k{i}")).collect();
        assert!(list(&items).ends_with("(+2 more)"));
        assert_eq!(list(&[]), "none");
    }
}
