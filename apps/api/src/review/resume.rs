//! Resume review pipeline.

use tracing::info;

use crate::agents::executor::{execute_agents, AgentTask, ExecuteAgentsRequest};
use crate::agents::strategy::CallOptions;
use crate::llm_client::ModelTarget;
use crate::preprocess::{preprocess_resume, DocumentKind};
use crate::progress::{Progress, ProgressStep};
use crate::scoring::{
    calculate_allowed_variance, calculate_resume_score, validate_score, ResumeSignals,
    ReviewDomain,
};
use crate::tools::semantic::{analyze_action_verbs, extract_keywords};
use crate::tools::{analyze_formatting, count_quantified_achievements, ExtractionContext, ResumeToolData};

use super::context::resume_context;
use super::response::{build_resume_response, ResumeResponseParts};
use super::types::ResumeReviewResponse;
use super::{input_rejected, step_failed, ReviewDeps, ReviewError};

const DOMAIN: ReviewDomain = ReviewDomain::Resume;

#[derive(Debug, Clone)]
pub struct ResumeReviewInput {
    pub resume_text: String,
    pub target: ModelTarget,
}

pub async fn review_resume(
    deps: &ReviewDeps<'_>,
    input: &ResumeReviewInput,
    progress: Progress<'_>,
) -> Result<ResumeReviewResponse, ReviewError> {
    let settings = deps.settings;

    // ── Preprocessing ───────────────────────────────────────────────────────
    progress.started(ProgressStep::Preprocessing, "Cleaning and validating resume text");
    let resume = preprocess_resume(&input.resume_text).map_err(|e| input_rejected(progress, e))?;
    progress.completed(
        ProgressStep::Preprocessing,
        format!("{} words, {} lines", resume.metadata.word_count, resume.metadata.line_count),
    );
    let text = resume.normalized_text.as_str();

    // ── Deterministic signals ───────────────────────────────────────────────
    progress.started(ProgressStep::SignalExtraction, "Counting achievements and sections");
    let achievements = count_quantified_achievements(text);
    let formatting = analyze_formatting(text);
    progress.completed(
        ProgressStep::SignalExtraction,
        format!(
            "{} quantified achievements, {} sections",
            achievements.count, formatting.section_count
        ),
    );

    // ── Semantic extraction ─────────────────────────────────────────────────
    progress.started(ProgressStep::SemanticExtraction, "Extracting keywords and action verbs");
    let ctx = ExtractionContext {
        generator: deps.generator,
        target: &input.target,
        options: CallOptions {
            temperature: settings.analysis_temperature,
            timeout: settings.semantic_timeout,
            retry: settings.retry.clone(),
        },
    };
    let (keywords, verbs) = tokio::try_join!(
        extract_keywords(&ctx, text, DocumentKind::Resume),
        analyze_action_verbs(&ctx, text),
    )
    .map_err(|e| step_failed(progress, ProgressStep::SemanticExtraction, DOMAIN, e))?;
    progress.completed(
        ProgressStep::SemanticExtraction,
        format!(
            "{} keywords, {} strong verbs",
            keywords.all().len(),
            verbs.strong_verbs.len()
        ),
    );

    let tool_data = ResumeToolData {
        achievements,
        formatting,
        keywords,
        verbs,
    };

    // ── Baseline ────────────────────────────────────────────────────────────
    progress.started(ProgressStep::BaselineScoring, "Calculating baseline score");
    let signals = ResumeSignals::from_tool_data(&tool_data);
    let baseline = calculate_resume_score(&signals);
    let variance = calculate_allowed_variance(baseline.score, DOMAIN);
    progress.completed(
        ProgressStep::BaselineScoring,
        format!("Baseline {}/100 (±{variance})", baseline.score),
    );
    info!(baseline = baseline.score, variance, "Resume baseline computed");

    // ── Agents ──────────────────────────────────────────────────────────────
    let context = resume_context(&tool_data, &baseline, variance, text);
    let request = ExecuteAgentsRequest {
        target: input.target.clone(),
        domain: DOMAIN,
        analysis: AgentTask {
            context: context.clone(),
            temperature: settings.analysis_temperature,
        },
        feedback: AgentTask {
            context,
            temperature: settings.feedback_temperature,
        },
    };
    let agents = execute_agents(
        deps.generator,
        &request,
        settings.agent_timeout,
        &settings.retry,
        progress,
    )
    .await
    .map_err(|source| ReviewError::Failed {
        domain: DOMAIN,
        source,
    })?;

    // ── Validation ──────────────────────────────────────────────────────────
    progress.started(ProgressStep::ScoreValidation, "Checking agent score against baseline");
    let validation = validate_score(agents.analysis.final_score, baseline.score, variance);
    if validation.was_clamped() {
        progress.warning(
            ProgressStep::ScoreValidation,
            format!("Agent score adjusted to {} to stay within the allowed range", validation.score),
        );
    } else {
        progress.completed(
            ProgressStep::ScoreValidation,
            format!("Final score {}", validation.score),
        );
    }

    // ── Response ────────────────────────────────────────────────────────────
    progress.started(ProgressStep::ResponseAssembly, "Assembling review");
    let response = build_resume_response(ResumeResponseParts {
        tool_data,
        baseline,
        variance,
        validation,
        agents,
        target: &input.target,
        warnings: Vec::new(),
    });
    progress.completed(ProgressStep::ResponseAssembly, "Review ready");

    info!(
        score = response.score,
        baseline = response.baseline.score,
        warnings = response.warnings.len(),
        "Resume review completed"
    );
    Ok(response)
}
