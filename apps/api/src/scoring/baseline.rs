//! Baseline scoring engine. Maps extracted signals to a deterministic 0 to 100 score.
//!
//! Same input ⇒ same output. The sum of the breakdown, rounded, is the score.
//! Criteria without a deterministic signal are seeded at fixed defaults; those are
//! the points an agent is allowed to move.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Criterion maxima (each breakdown sums to 100)
// ────────────────────────────────────────────────────────────────────────────

pub const RESUME_KEYWORDS_MAX: f64 = 20.0;
pub const RESUME_ACHIEVEMENTS_MAX: f64 = 25.0;
pub const RESUME_VERBS_MAX: f64 = 10.0;
pub const RESUME_FORMATTING_MAX: f64 = 15.0;
pub const RESUME_SUMMARY_MAX: f64 = 10.0;
pub const RESUME_EXPERIENCE_CLARITY_MAX: f64 = 10.0;
pub const RESUME_SKILLS_SECTION_MAX: f64 = 5.0;
pub const RESUME_GRAMMAR_MAX: f64 = 5.0;

pub const JOB_SKILLS_MATCH_MAX: f64 = 30.0;
pub const JOB_EXPERIENCE_MATCH_MAX: f64 = 25.0;
pub const JOB_KEYWORD_OVERLAP_MAX: f64 = 20.0;
pub const JOB_QUALIFICATIONS_MAX: f64 = 15.0;
pub const JOB_INDUSTRY_FIT_MAX: f64 = 10.0;

/// Defaults for criteria no extractor can measure.
const DEFAULT_SUMMARY: f64 = 6.0;
const DEFAULT_EXPERIENCE_CLARITY: f64 = 6.0;
const DEFAULT_SKILLS_SECTION: f64 = 3.0;
const DEFAULT_GRAMMAR: f64 = 4.0;
const DEFAULT_QUALIFICATIONS: f64 = 8.0;
const DEFAULT_INDUSTRY_FIT: f64 = 5.0;
/// Neutral experience score when the job states no year requirement.
const DEFAULT_EXPERIENCE_MATCH: f64 = 15.0;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Signals the resume baseline is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSignals {
    pub quantified_count: u32,
    pub keyword_count: u32,
    pub verb_count: u32,
    pub has_bullet_points: bool,
    pub section_count: u32,
}

/// Signals the job-match baseline is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchSignals {
    pub matched_skills_count: u32,
    pub required_skills_count: u32,
    pub keyword_overlap_percent: f64,
    pub experience_years: f64,
    pub required_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeBreakdown {
    pub keywords: f64,
    pub achievements: f64,
    pub verbs: f64,
    pub formatting: f64,
    pub summary: f64,
    pub experience_clarity: f64,
    pub skills_section: f64,
    pub grammar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchBreakdown {
    pub skills_match: f64,
    pub experience_match: f64,
    pub keyword_overlap: f64,
    pub qualifications: f64,
    pub industry_fit: f64,
}

/// Per-criterion sub-scores. Serializes as a flat camelCase map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreBreakdown {
    Resume(ResumeBreakdown),
    JobMatch(JobMatchBreakdown),
}

/// One row of a breakdown: name, points, maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub name: &'static str,
    pub points: f64,
    pub max: f64,
}

impl ScoreBreakdown {
    pub fn criteria(&self) -> Vec<Criterion> {
        let c = |name, points, max| Criterion { name, points, max };
        match self {
            ScoreBreakdown::Resume(b) => vec![
                c("keywords", b.keywords, RESUME_KEYWORDS_MAX),
                c("achievements", b.achievements, RESUME_ACHIEVEMENTS_MAX),
                c("verbs", b.verbs, RESUME_VERBS_MAX),
                c("formatting", b.formatting, RESUME_FORMATTING_MAX),
                c("summary", b.summary, RESUME_SUMMARY_MAX),
                c("experienceClarity", b.experience_clarity, RESUME_EXPERIENCE_CLARITY_MAX),
                c("skillsSection", b.skills_section, RESUME_SKILLS_SECTION_MAX),
                c("grammar", b.grammar, RESUME_GRAMMAR_MAX),
            ],
            ScoreBreakdown::JobMatch(b) => vec![
                c("skillsMatch", b.skills_match, JOB_SKILLS_MATCH_MAX),
                c("experienceMatch", b.experience_match, JOB_EXPERIENCE_MATCH_MAX),
                c("keywordOverlap", b.keyword_overlap, JOB_KEYWORD_OVERLAP_MAX),
                c("qualifications", b.qualifications, JOB_QUALIFICATIONS_MAX),
                c("industryFit", b.industry_fit, JOB_INDUSTRY_FIT_MAX),
            ],
        }
    }

    pub fn sum(&self) -> f64 {
        self.criteria().iter().map(|c| c.points).sum()
    }

    #[cfg(test)]
    pub fn points(&self, name: &str) -> Option<f64> {
        self.criteria()
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.points)
    }
}

/// Deterministic score plus its breakdown. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineScore {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
}

impl BaselineScore {
    fn from_breakdown(breakdown: ScoreBreakdown) -> Self {
        let score = breakdown.sum().round().clamp(0.0, 100.0) as u8;
        BaselineScore { score, breakdown }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume baseline
// ────────────────────────────────────────────────────────────────────────────

pub fn calculate_resume_score(signals: &ResumeSignals) -> BaselineScore {
    BaselineScore::from_breakdown(ScoreBreakdown::Resume(ResumeBreakdown {
        keywords: keyword_points(signals.keyword_count),
        achievements: achievement_points(signals.quantified_count),
        verbs: verb_points(signals.verb_count),
        formatting: formatting_points(signals.has_bullet_points, signals.section_count),
        summary: DEFAULT_SUMMARY,
        experience_clarity: DEFAULT_EXPERIENCE_CLARITY,
        skills_section: DEFAULT_SKILLS_SECTION,
        grammar: DEFAULT_GRAMMAR,
    }))
}

/// 1–4 → 1.6 each; 5–9 → 8 + 1.2 each past 5; 10–14 → 14 + 1.2 each past 10; ≥15 → 20.
fn keyword_points(count: u32) -> f64 {
    let n = f64::from(count);
    let points = match count {
        0 => 0.0,
        1..=4 => 1.6 * n,
        5..=9 => 8.0 + 1.2 * (n - 5.0),
        10..=14 => 14.0 + 1.2 * (n - 10.0),
        _ => RESUME_KEYWORDS_MAX,
    };
    round1(points.min(RESUME_KEYWORDS_MAX))
}

/// 1–2 → 6 each; 3–5 → 12 + 3 each past 2; 6–9 → 21 + 0.8 each past 5; ≥10 → 25.
fn achievement_points(count: u32) -> f64 {
    let n = f64::from(count);
    let points = match count {
        0 => 0.0,
        1..=2 => 6.0 * n,
        3..=5 => 12.0 + 3.0 * (n - 2.0),
        6..=9 => 21.0 + 0.8 * (n - 5.0),
        _ => RESUME_ACHIEVEMENTS_MAX,
    };
    round1(points.min(RESUME_ACHIEVEMENTS_MAX))
}

/// 1–4 → 1 each; 5–9 → 4 + 0.8 each past 4; 10–14 → 8 + 0.3 each past 9; ≥15 → 10.
fn verb_points(count: u32) -> f64 {
    let n = f64::from(count);
    let points = match count {
        0 => 0.0,
        1..=4 => n,
        5..=9 => 4.0 + 0.8 * (n - 4.0),
        10..=14 => 8.0 + 0.3 * (n - 9.0),
        _ => RESUME_VERBS_MAX,
    };
    round1(points.min(RESUME_VERBS_MAX))
}

fn formatting_points(has_bullet_points: bool, section_count: u32) -> f64 {
    let bullets = if has_bullet_points { 8.0 } else { 3.0 };
    let sections = match section_count {
        0..=2 => 2.0,
        3..=4 => 5.0,
        _ => 7.0,
    };
    bullets + sections
}

// ────────────────────────────────────────────────────────────────────────────
// Job-match baseline
// ────────────────────────────────────────────────────────────────────────────

pub fn calculate_job_match_score(signals: &JobMatchSignals) -> BaselineScore {
    BaselineScore::from_breakdown(ScoreBreakdown::JobMatch(JobMatchBreakdown {
        skills_match: skills_match_points(signals.matched_skills_count, signals.required_skills_count),
        experience_match: experience_match_points(signals.experience_years, signals.required_years),
        keyword_overlap: keyword_overlap_points(signals.keyword_overlap_percent),
        qualifications: DEFAULT_QUALIFICATIONS,
        industry_fit: DEFAULT_INDUSTRY_FIT,
    }))
}

fn skills_match_points(matched: u32, required: u32) -> f64 {
    if required == 0 {
        return 0.0;
    }
    let ratio = (f64::from(matched) / f64::from(required)).min(1.0);
    let points = (ratio * JOB_SKILLS_MATCH_MAX).round();
    if matched > 0 {
        points.max(5.0)
    } else {
        points
    }
}

fn experience_match_points(years: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return DEFAULT_EXPERIENCE_MATCH;
    }
    let ratio = years.max(0.0) / required;
    if ratio >= 1.5 {
        25.0
    } else if ratio >= 1.0 {
        20.0
    } else if ratio >= 0.75 {
        15.0
    } else if ratio >= 0.5 {
        10.0
    } else {
        (ratio * 20.0).round()
    }
}

fn keyword_overlap_points(percent: f64) -> f64 {
    let percent = percent.clamp(0.0, 100.0);
    let points = (percent * JOB_KEYWORD_OVERLAP_MAX / 100.0).round();
    if percent > 0.0 {
        points.max(2.0)
    } else {
        points
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume(q: u32, k: u32, v: u32, bullets: bool, sections: u32) -> ResumeSignals {
        ResumeSignals {
            quantified_count: q,
            keyword_count: k,
            verb_count: v,
            has_bullet_points: bullets,
            section_count: sections,
        }
    }

    fn job(matched: u32, required: u32, overlap: f64, years: f64, req_years: f64) -> JobMatchSignals {
        JobMatchSignals {
            matched_skills_count: matched,
            required_skills_count: required,
            keyword_overlap_percent: overlap,
            experience_years: years,
            required_years: req_years,
        }
    }

    #[test]
    fn test_scenario_a_empty_resume_scores_24() {
        let b = calculate_resume_score(&resume(0, 0, 0, false, 1));
        assert_eq!(b.breakdown.points("keywords"), Some(0.0));
        assert_eq!(b.breakdown.points("achievements"), Some(0.0));
        assert_eq!(b.breakdown.points("verbs"), Some(0.0));
        assert_eq!(b.breakdown.points("formatting"), Some(5.0));
        assert_eq!(b.score, 24);
    }

    #[test]
    fn test_scenario_b_strong_resume_scores_89() {
        let b = calculate_resume_score(&resume(10, 15, 15, true, 5));
        assert_eq!(b.breakdown.points("keywords"), Some(20.0));
        assert_eq!(b.breakdown.points("achievements"), Some(25.0));
        assert_eq!(b.breakdown.points("verbs"), Some(10.0));
        assert_eq!(b.breakdown.points("formatting"), Some(15.0));
        assert_eq!(b.score, 89);
    }

    #[test]
    fn test_scenario_c_job_match_scores_43() {
        let b = calculate_job_match_score(&job(3, 10, 30.0, 0.0, 0.0));
        assert_eq!(b.breakdown.points("skillsMatch"), Some(9.0));
        assert_eq!(b.breakdown.points("experienceMatch"), Some(15.0));
        assert_eq!(b.breakdown.points("keywordOverlap"), Some(6.0));
        assert_eq!(b.breakdown.points("qualifications"), Some(8.0));
        assert_eq!(b.breakdown.points("industryFit"), Some(5.0));
        assert_eq!(b.score, 43);
    }

    #[test]
    fn test_keyword_ramp_has_diminishing_returns() {
        assert_eq!(keyword_points(1), 1.6);
        assert_eq!(keyword_points(4), 6.4);
        assert_eq!(keyword_points(5), 8.0);
        assert_eq!(keyword_points(10), 14.0);
        assert_eq!(keyword_points(14), 18.8);
        assert_eq!(keyword_points(40), 20.0);
    }

    #[test]
    fn test_ramps_are_monotone_and_capped() {
        for n in 0..40 {
            assert!(keyword_points(n) <= keyword_points(n + 1));
            assert!(achievement_points(n) <= achievement_points(n + 1));
            assert!(verb_points(n) <= verb_points(n + 1));
            assert!(achievement_points(n) <= RESUME_ACHIEVEMENTS_MAX);
            assert!(verb_points(n) <= RESUME_VERBS_MAX);
        }
    }

    #[test]
    fn test_skills_match_floor_of_five() {
        assert_eq!(skills_match_points(1, 20), 5.0);
        assert_eq!(skills_match_points(0, 20), 0.0);
        assert_eq!(skills_match_points(0, 0), 0.0);
        assert_eq!(skills_match_points(12, 10), 30.0);
    }

    #[test]
    fn test_experience_tiers() {
        assert_eq!(experience_match_points(8.0, 5.0), 25.0);
        assert_eq!(experience_match_points(5.0, 5.0), 20.0);
        assert_eq!(experience_match_points(4.0, 5.0), 15.0);
        assert_eq!(experience_match_points(2.5, 5.0), 10.0);
        assert_eq!(experience_match_points(1.0, 5.0), 4.0);
        assert_eq!(experience_match_points(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_keyword_overlap_floor_of_two() {
        assert_eq!(keyword_overlap_points(3.0), 2.0);
        assert_eq!(keyword_overlap_points(0.0), 0.0);
        assert_eq!(keyword_overlap_points(100.0), 20.0);
    }

    #[test]
    fn test_breakdown_sum_matches_score_across_inputs() {
        for q in [0, 1, 3, 7, 12] {
            for k in [0, 2, 6, 11, 20] {
                for v in [0, 3, 8, 13, 30] {
                    for sections in [0, 3, 6] {
                        let signals = resume(q, k, v, q % 2 == 0, sections);
                        let b = calculate_resume_score(&signals);
                        assert_eq!(b.breakdown.sum().round() as u8, b.score);
                        assert!(b.score <= 100);
                        assert_eq!(b, calculate_resume_score(&signals));
                    }
                }
            }
        }
    }

    #[test]
    fn test_job_match_sum_matches_score() {
        for (m, r, o, y, ry) in [
            (0, 0, 0.0, 0.0, 0.0),
            (5, 5, 100.0, 10.0, 3.0),
            (2, 9, 17.5, 1.5, 4.0),
        ] {
            let b = calculate_job_match_score(&job(m, r, o, y, ry));
            assert_eq!(b.breakdown.sum().round() as u8, b.score);
        }
    }

    #[test]
    fn test_breakdown_serializes_flat() {
        let b = calculate_resume_score(&resume(0, 0, 0, false, 1));
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["breakdown"]["experienceClarity"], 6.0);
        assert_eq!(json["score"], 24);
    }
}
