//! Resume-to-job match pipeline.
//!
//! Keyword extraction is required. Skill matching and similarity scoring are
//! optional: when either fails, the run continues on keyword overlap alone and the
//! response says so (`semanticAvailable: false` plus a warning).

use tracing::{info, warn};

use crate::agents::executor::{execute_agents, AgentTask, ExecuteAgentsRequest};
use crate::agents::strategy::CallOptions;
use crate::agents::AnalysisError;
use crate::llm_client::ModelTarget;
use crate::preprocess::{preprocess_job, preprocess_resume, DocumentKind};
use crate::progress::{Progress, ProgressStep};
use crate::scoring::{
    calculate_allowed_variance, calculate_job_match_score, validate_score, JobMatchSignals,
    ReviewDomain,
};
use crate::tools::experience::{estimate_experience_years, extract_required_years};
use crate::tools::semantic::{extract_keywords, match_skills, score_similarity};
use crate::tools::{compute_keyword_overlap, ExtractionContext, JobMatchToolData, SemanticData};

use super::context::job_match_context;
use super::response::{build_job_match_response, JobMatchResponseParts};
use super::types::JobMatchResponse;
use super::{input_rejected, step_failed, ReviewDeps, ReviewError};

const DOMAIN: ReviewDomain = ReviewDomain::JobMatch;

#[derive(Debug, Clone)]
pub struct JobMatchInput {
    pub resume_text: String,
    pub job_text: String,
    pub target: ModelTarget,
}

pub async fn review_job_match(
    deps: &ReviewDeps<'_>,
    input: &JobMatchInput,
    progress: Progress<'_>,
) -> Result<JobMatchResponse, ReviewError> {
    let settings = deps.settings;
    let mut warnings = Vec::new();

    // ── Preprocessing ───────────────────────────────────────────────────────
    progress.started(ProgressStep::Preprocessing, "Cleaning and validating resume and job text");
    let resume = preprocess_resume(&input.resume_text).map_err(|e| input_rejected(progress, e))?;
    let job = preprocess_job(&input.job_text).map_err(|e| input_rejected(progress, e))?;
    progress.completed(
        ProgressStep::Preprocessing,
        format!(
            "Resume {} words, job description {} words",
            resume.metadata.word_count, job.metadata.word_count
        ),
    );
    let resume_text = resume.normalized_text.as_str();
    let job_text = job.normalized_text.as_str();

    // ── Deterministic signals ───────────────────────────────────────────────
    progress.started(ProgressStep::SignalExtraction, "Reading experience requirements");
    let required_years = extract_required_years(job_text);
    let candidate_years = estimate_experience_years(resume_text);
    progress.completed(
        ProgressStep::SignalExtraction,
        format!("Candidate ~{candidate_years:.0} years, job asks for {required_years:.0}"),
    );

    // ── Semantic extraction ─────────────────────────────────────────────────
    progress.started(
        ProgressStep::SemanticExtraction,
        "Extracting job keywords and matching skills",
    );
    let ctx = ExtractionContext {
        generator: deps.generator,
        target: &input.target,
        options: CallOptions {
            temperature: settings.analysis_temperature,
            timeout: settings.semantic_timeout,
            retry: settings.retry.clone(),
        },
    };
    // Keywords are required, the skill pair is not: a keyword failure returns at
    // once and drops the pair, while a pair failure is carried as a value.
    let semantic_pair = async {
        tokio::try_join!(
            match_skills(&ctx, resume_text, job_text),
            score_similarity(&ctx, resume_text, job_text),
        )
    };
    let (keywords, semantic) = tokio::try_join!(
        extract_keywords(&ctx, job_text, DocumentKind::Job),
        async { Ok::<_, AnalysisError>(semantic_pair.await) },
    )
    .map_err(|e| step_failed(progress, ProgressStep::SemanticExtraction, DOMAIN, e))?;
    let job_keywords = keywords.all();
    let keyword_overlap = compute_keyword_overlap(&job_keywords, resume_text);

    let semantic = match semantic {
        Ok((skill_match, similarity)) => {
            progress.completed(
                ProgressStep::SemanticExtraction,
                format!(
                    "{} job keywords, {} of {} skills matched",
                    job_keywords.len(),
                    skill_match.matched_count(),
                    skill_match.required_count()
                ),
            );
            Some(SemanticData {
                skill_match,
                similarity,
            })
        }
        Err(e) => {
            let message = format!("Semantic skill analysis unavailable ({e}); using keyword overlap only");
            warn!(error = %e, "Continuing job match without semantic data");
            progress.warning(ProgressStep::SemanticExtraction, message.clone());
            warnings.push(message);
            None
        }
    };

    let tool_data = JobMatchToolData {
        job_keywords,
        keyword_overlap,
        candidate_years,
        required_years,
        semantic,
    };

    // ── Baseline ────────────────────────────────────────────────────────────
    progress.started(ProgressStep::BaselineScoring, "Calculating baseline match score");
    let signals = JobMatchSignals::from_tool_data(&tool_data);
    let baseline = calculate_job_match_score(&signals);
    let variance = calculate_allowed_variance(baseline.score, DOMAIN);
    progress.completed(
        ProgressStep::BaselineScoring,
        format!("Baseline {}/100 (±{variance})", baseline.score),
    );
    info!(
        baseline = baseline.score,
        variance,
        semantic = tool_data.semantic.is_some(),
        "Job match baseline computed"
    );

    // ── Agents ──────────────────────────────────────────────────────────────
    let context = job_match_context(&tool_data, &baseline, variance, resume_text, job_text);
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
    progress.started(ProgressStep::ResponseAssembly, "Assembling match report");
    let response = build_job_match_response(JobMatchResponseParts {
        tool_data,
        signals,
        baseline,
        variance,
        validation,
        agents,
        target: &input.target,
        warnings,
    });
    progress.completed(ProgressStep::ResponseAssembly, "Match report ready");

    info!(
        score = response.score,
        baseline = response.baseline.score,
        semantic_available = response.semantic_available,
        "Job match completed"
    );
    Ok(response)
}
