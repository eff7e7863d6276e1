//! LLM-based semantic extractors: keywords, action verbs, skill match, similarity.
//!
//! Each extractor resolves a `Strategy` for the provider tier, so local-model
//! output is normalized into the full shape before it leaves this module.
//! Callers own the degradation policy; every function here just returns
//! `AnalysisError` after retry and timeout are exhausted.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agents::strategy::{CallOptions, PromptSpec, Strategy, TieredOutput};
use crate::agents::types::clean_list;
use crate::agents::AnalysisError;
use crate::llm_client::prompts::{fill_template, system_prompt};
use crate::llm_client::{ModelTarget, StructuredGenerator};
use crate::preprocess::DocumentKind;
use crate::tools::prompts::*;

/// Local models get the document cut to this many characters.
const LOCAL_TEXT_LIMIT: usize = 6_000;

/// Everything an extractor call needs besides its inputs.
pub struct ExtractionContext<'a> {
    pub generator: &'a dyn StructuredGenerator,
    pub target: &'a ModelTarget,
    pub options: CallOptions,
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordExtraction {
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl KeywordExtraction {
    /// Every keyword across categories, deduplicated case-insensitively.
    pub fn all(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.technical_skills
            .iter()
            .chain(&self.tools)
            .chain(&self.certifications)
            .chain(&self.soft_skills)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalKeywordExtraction {
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl From<LocalKeywordExtraction> for KeywordExtraction {
    fn from(local: LocalKeywordExtraction) -> Self {
        KeywordExtraction {
            technical_skills: clean_list(local.keywords),
            ..Default::default()
        }
    }
}

impl TieredOutput for KeywordExtraction {
    type Local = LocalKeywordExtraction;
}

pub async fn extract_keywords(
    ctx: &ExtractionContext<'_>,
    text: &str,
    kind: DocumentKind,
) -> Result<KeywordExtraction, AnalysisError> {
    let kind_label = kind.to_string().to_uppercase();
    let strategy = Strategy::<KeywordExtraction>::resolve(
        "keyword extraction",
        ctx.target.provider.tier(),
        || PromptSpec {
            system_prompt: system_prompt(KEYWORD_ROLE),
            schema: KEYWORD_SCHEMA,
            prompt: KEYWORD_PROMPT
                .replace("{document_kind}", &kind_label)
                .replace("{text}", text),
        },
        || PromptSpec {
            system_prompt: system_prompt(LOCAL_KEYWORD_ROLE),
            schema: LOCAL_KEYWORD_SCHEMA,
            prompt: LOCAL_KEYWORD_PROMPT
                .replace("{document_kind}", &kind.to_string())
                .replace("{text}", truncate_chars(text, LOCAL_TEXT_LIMIT)),
        },
    );

    let out = strategy.run(ctx.generator, ctx.target, &ctx.options).await?;
    info!(document = %kind, keywords = out.all().len(), "Keywords extracted");
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Action-verb analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbSuggestion {
    pub weak: String,
    pub stronger: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerbAnalysis {
    #[serde(default)]
    pub strong_verbs: Vec<String>,
    #[serde(default)]
    pub weak_verbs: Vec<String>,
    /// 0–10.
    #[serde(default)]
    pub verb_score: f64,
    #[serde(default)]
    pub suggestions: Vec<VerbSuggestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalVerbAnalysis {
    #[serde(default)]
    pub strong: Vec<String>,
    #[serde(default)]
    pub weak: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

impl From<LocalVerbAnalysis> for VerbAnalysis {
    fn from(local: LocalVerbAnalysis) -> Self {
        VerbAnalysis {
            strong_verbs: clean_list(local.strong),
            weak_verbs: clean_list(local.weak),
            verb_score: local.score,
            suggestions: Vec::new(),
        }
    }
}

impl TieredOutput for VerbAnalysis {
    type Local = LocalVerbAnalysis;

    fn sanitize(mut self) -> Self {
        self.verb_score = self.verb_score.clamp(0.0, 10.0);
        self
    }
}

pub async fn analyze_action_verbs(
    ctx: &ExtractionContext<'_>,
    resume_text: &str,
) -> Result<VerbAnalysis, AnalysisError> {
    let strategy = Strategy::<VerbAnalysis>::resolve(
        "action verb analysis",
        ctx.target.provider.tier(),
        || PromptSpec {
            system_prompt: system_prompt(VERB_ROLE),
            schema: VERB_SCHEMA,
            prompt: VERB_PROMPT.replace("{text}", resume_text),
        },
        || PromptSpec {
            system_prompt: system_prompt(LOCAL_VERB_ROLE),
            schema: LOCAL_VERB_SCHEMA,
            prompt: LOCAL_VERB_PROMPT.replace("{text}", truncate_chars(resume_text, LOCAL_TEXT_LIMIT)),
        },
    );

    let out = strategy.run(ctx.generator, ctx.target, &ctx.options).await?;
    info!(
        strong = out.strong_verbs.len(),
        weak = out.weak_verbs.len(),
        score = out.verb_score,
        "Action verbs analyzed"
    );
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Skill matching
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Critical,
    #[default]
    Important,
    NiceToHave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Learnability {
    Quick,
    #[default]
    Moderate,
    Significant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactMatch {
    pub skill: String,
    #[serde(default)]
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedMatch {
    pub required: String,
    #[serde(default)]
    pub candidate_has: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub skill: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub learnability: Learnability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    #[serde(default)]
    pub exact_matches: Vec<ExactMatch>,
    #[serde(default)]
    pub related_matches: Vec<RelatedMatch>,
    #[serde(default)]
    pub missing_skills: Vec<MissingSkill>,
}

impl SkillMatch {
    /// Skills the job asks for, whichever bucket they landed in.
    pub fn required_count(&self) -> usize {
        self.exact_matches.len() + self.related_matches.len() + self.missing_skills.len()
    }

    /// Exact matches count fully, related ones count too: the candidate has something to show.
    pub fn matched_count(&self) -> usize {
        self.exact_matches.len() + self.related_matches.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalSkillMatch {
    #[serde(default)]
    pub matched: Vec<String>,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl From<LocalSkillMatch> for SkillMatch {
    fn from(local: LocalSkillMatch) -> Self {
        SkillMatch {
            exact_matches: clean_list(local.matched)
                .into_iter()
                .map(|skill| ExactMatch {
                    skill,
                    evidence: String::new(),
                })
                .collect(),
            related_matches: clean_list(local.related)
                .into_iter()
                .map(|required| RelatedMatch {
                    required,
                    candidate_has: String::new(),
                    explanation: String::new(),
                })
                .collect(),
            missing_skills: clean_list(local.missing)
                .into_iter()
                .map(|skill| MissingSkill {
                    skill,
                    importance: Importance::default(),
                    learnability: Learnability::default(),
                })
                .collect(),
        }
    }
}

impl TieredOutput for SkillMatch {
    type Local = LocalSkillMatch;
}

pub async fn match_skills(
    ctx: &ExtractionContext<'_>,
    resume_text: &str,
    job_text: &str,
) -> Result<SkillMatch, AnalysisError> {
    let strategy = Strategy::<SkillMatch>::resolve(
        "skill matching",
        ctx.target.provider.tier(),
        || PromptSpec {
            system_prompt: system_prompt(SKILL_MATCH_ROLE),
            schema: SKILL_MATCH_SCHEMA,
            prompt: fill_template(SKILL_MATCH_PROMPT, &[("{job}", job_text), ("{resume}", resume_text)]),
        },
        || PromptSpec {
            system_prompt: system_prompt(LOCAL_SKILL_MATCH_ROLE),
            schema: LOCAL_SKILL_MATCH_SCHEMA,
            prompt: fill_template(
                LOCAL_SKILL_MATCH_PROMPT,
                &[
                    ("{job}", truncate_chars(job_text, LOCAL_TEXT_LIMIT)),
                    ("{resume}", truncate_chars(resume_text, LOCAL_TEXT_LIMIT)),
                ],
            ),
        },
    );

    let out = strategy.run(ctx.generator, ctx.target, &ctx.options).await?;
    info!(
        exact = out.exact_matches.len(),
        related = out.related_matches.len(),
        missing = out.missing_skills.len(),
        "Skills matched"
    );
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Semantic similarity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityAssessment {
    /// 0–100.
    pub score: f64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub transferable_skills: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalSimilarity {
    pub score: f64,
    #[serde(default)]
    pub reason: String,
}

impl From<LocalSimilarity> for SimilarityAssessment {
    fn from(local: LocalSimilarity) -> Self {
        SimilarityAssessment {
            score: local.score,
            explanation: local.reason.trim().to_string(),
            transferable_skills: Vec::new(),
            recommendation: String::new(),
        }
    }
}

impl TieredOutput for SimilarityAssessment {
    type Local = LocalSimilarity;

    fn sanitize(mut self) -> Self {
        self.score = self.score.clamp(0.0, 100.0);
        self
    }
}

pub async fn score_similarity(
    ctx: &ExtractionContext<'_>,
    resume_text: &str,
    job_text: &str,
) -> Result<SimilarityAssessment, AnalysisError> {
    let strategy = Strategy::<SimilarityAssessment>::resolve(
        "similarity scoring",
        ctx.target.provider.tier(),
        || PromptSpec {
            system_prompt: system_prompt(SIMILARITY_ROLE),
            schema: SIMILARITY_SCHEMA,
            prompt: fill_template(SIMILARITY_PROMPT, &[("{job}", job_text), ("{resume}", resume_text)]),
        },
        || PromptSpec {
            system_prompt: system_prompt(LOCAL_SIMILARITY_ROLE),
            schema: LOCAL_SIMILARITY_SCHEMA,
            prompt: fill_template(
                LOCAL_SIMILARITY_PROMPT,
                &[
                    ("{job}", truncate_chars(job_text, LOCAL_TEXT_LIMIT)),
                    ("{resume}", truncate_chars(resume_text, LOCAL_TEXT_LIMIT)),
                ],
            ),
        },
    );

    let out = strategy.run(ctx.generator, ctx.target, &ctx.options).await?;
    info!(score = out.score, "Similarity scored");
    Ok(out)
}

/// Cuts `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
