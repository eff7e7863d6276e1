//! Axum route handlers for the Review API.
//!
//! Every handler rate-limits the caller first, resolves the provider/model pair,
//! then runs the pipeline. The `/stream` variants run it on a spawned task and
//! forward progress events as SSE.

use std::future::Future;

use anyhow::anyhow;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{ModelTarget, Provider};
use crate::progress::{ChannelSink, NoopSink, Progress, ProgressUpdate};
use crate::review::types::{JobMatchResponse, ResumeReviewResponse};
use crate::review::{
    review_job_match, review_resume, JobMatchInput, ResumeReviewInput, ReviewDeps,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeReviewRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    #[serde(default)]
    pub provider: Option<Provider>,
    #[serde(default, alias = "model")]
    pub model_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    pub job_text: String,
    #[serde(default)]
    pub provider: Option<Provider>,
    #[serde(default, alias = "model")]
    pub model_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reviews/resume
pub async fn handle_review_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeReviewRequest>,
) -> Result<Json<ResumeReviewResponse>, AppError> {
    let input = admit_resume(&state, request)?;
    let deps = ReviewDeps {
        generator: state.llm.as_ref(),
        settings: &state.config.analysis,
    };
    let response = review_resume(&deps, &input, Progress::new(&NoopSink)).await?;
    Ok(Json(response))
}

/// POST /api/v1/reviews/resume/stream
///
/// Same pipeline; emits `progress` events, then one `result` or `error` event.
pub async fn handle_review_resume_stream(
    State(state): State<AppState>,
    Json(request): Json<ResumeReviewRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let input = admit_resume(&state, request)?;
    Ok(progress_stream(move |sink| async move {
        let deps = ReviewDeps {
            generator: state.llm.as_ref(),
            settings: &state.config.analysis,
        };
        review_resume(&deps, &input, Progress::new(&sink))
            .await
            .map_err(AppError::from)
    }))
}

/// POST /api/v1/reviews/job-match
pub async fn handle_job_match(
    State(state): State<AppState>,
    Json(request): Json<JobMatchRequest>,
) -> Result<Json<JobMatchResponse>, AppError> {
    let input = admit_job_match(&state, request)?;
    let deps = ReviewDeps {
        generator: state.llm.as_ref(),
        settings: &state.config.analysis,
    };
    let response = review_job_match(&deps, &input, Progress::new(&NoopSink)).await?;
    Ok(Json(response))
}

/// POST /api/v1/reviews/job-match/stream
pub async fn handle_job_match_stream(
    State(state): State<AppState>,
    Json(request): Json<JobMatchRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let input = admit_job_match(&state, request)?;
    Ok(progress_stream(move |sink| async move {
        let deps = ReviewDeps {
            generator: state.llm.as_ref(),
            settings: &state.config.analysis,
        };
        review_job_match(&deps, &input, Progress::new(&sink))
            .await
            .map_err(AppError::from)
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Admission
// ────────────────────────────────────────────────────────────────────────────

fn admit_resume(state: &AppState, request: ResumeReviewRequest) -> Result<ResumeReviewInput, AppError> {
    enforce_rate_limit(state, request.user_id)?;
    let target = resolve_target(&state.config, request.provider, request.model_name)?;
    info!(user_id = %request.user_id, provider = %target.provider, model = %target.model, "Resume review requested");
    Ok(ResumeReviewInput {
        resume_text: request.resume_text,
        target,
    })
}

fn admit_job_match(state: &AppState, request: JobMatchRequest) -> Result<JobMatchInput, AppError> {
    enforce_rate_limit(state, request.user_id)?;
    let target = resolve_target(&state.config, request.provider, request.model_name)?;
    info!(user_id = %request.user_id, provider = %target.provider, model = %target.model, "Job match requested");
    Ok(JobMatchInput {
        resume_text: request.resume_text,
        job_text: request.job_text,
        target,
    })
}

fn enforce_rate_limit(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    let decision = state.rate_limiter.check(&user_id.to_string());
    if decision.allowed {
        return Ok(());
    }
    warn!(%user_id, reset_in_ms = decision.reset_in_ms, "Rate limit exceeded");
    Err(AppError::RateLimited {
        reset_in_ms: decision.reset_in_ms,
    })
}

/// Provider defaults to the cloud tier with the configured model.
/// Local models have no sensible default, so they must be named.
fn resolve_target(
    config: &Config,
    provider: Option<Provider>,
    model_name: Option<String>,
) -> Result<ModelTarget, AppError> {
    let provider = provider.unwrap_or(Provider::Anthropic);
    let model = model_name
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let model = match (provider, model) {
        (_, Some(model)) => model,
        (Provider::Anthropic, None) => config.default_model.clone(),
        (Provider::Ollama, None) => {
            return Err(AppError::Validation(
                "modelName is required when provider is 'ollama'".to_string(),
            ))
        }
    };
    Ok(ModelTarget { provider, model })
}

// ────────────────────────────────────────────────────────────────────────────
// SSE plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Runs `pipeline` on its own task and streams its progress, then its outcome.
///
/// The pipeline owns the sending half of the channel; once it finishes the
/// channel closes, buffered events drain, and the outcome is read from the
/// oneshot. A client disconnect drops the stream but not the task.
fn progress_stream<T, F, Fut>(pipeline: F) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    T: Serialize + Send + 'static,
    F: FnOnce(ChannelSink) -> Fut,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<ProgressUpdate>();
    let (done_tx, done_rx) = oneshot::channel::<Result<T, AppError>>();

    let run = pipeline(ChannelSink::new(tx));
    tokio::spawn(async move {
        if done_tx.send(run.await).is_err() {
            warn!("Review finished after the client disconnected");
        }
    });

    let events = stream::unfold(Some((rx, done_rx)), |state| async move {
        let (mut rx, done_rx) = state?;
        match rx.recv().await {
            Some(update) => {
                let event = Event::default().event("progress").json_data(&update);
                Some((event, Some((rx, done_rx))))
            }
            None => {
                let outcome = done_rx
                    .await
                    .unwrap_or_else(|_| Err(AppError::Internal(anyhow!("review task ended without a result"))));
                Some((outcome_event(outcome), None))
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn outcome_event<T: Serialize>(outcome: Result<T, AppError>) -> Result<Event, axum::Error> {
    match outcome {
        Ok(response) => Event::default().event("result").json_data(&response),
        Err(err) => {
            let (_, body) = err.status_and_body();
            Event::default().event("error").json_data(&body)
        }
    }
}
