//! End-to-end review pipelines: resume review and resume-to-job match.
//!
//! preprocess → deterministic signals → semantic extraction → baseline →
//! agents (concurrent) → score validation → response assembly.
//! Progress events are pushed into the caller's sink at every step.

use thiserror::Error;
use tracing::warn;

use crate::agents::AnalysisError;
use crate::config::AnalysisSettings;
use crate::llm_client::StructuredGenerator;
use crate::preprocess::PreprocessingError;
use crate::progress::{Progress, ProgressStep};
use crate::scoring::ReviewDomain;

pub mod context;
pub mod handlers;
pub mod job_match;
pub mod response;
pub mod resume;
pub mod types;

pub use job_match::{review_job_match, JobMatchInput};
pub use resume::{review_resume, ResumeReviewInput};

/// Collaborators a pipeline run borrows.
pub struct ReviewDeps<'a> {
    pub generator: &'a dyn StructuredGenerator,
    pub settings: &'a AnalysisSettings,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    /// The document was rejected before any network call.
    #[error(transparent)]
    Input(#[from] PreprocessingError),

    #[error("{}: {source}", .domain.failure_prefix())]
    Failed {
        domain: ReviewDomain,
        #[source]
        source: AnalysisError,
    },
}

impl ReviewError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReviewError::Failed { source, .. } if source.is_timeout())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ReviewError::Failed { source, .. } if source.is_unavailable())
    }
}

/// Emits the progress warning for a failed step, then wraps the error for the domain.
pub(crate) fn step_failed(
    progress: Progress<'_>,
    step: ProgressStep,
    domain: ReviewDomain,
    source: AnalysisError,
) -> ReviewError {
    warn!(?step, domain = domain.label(), error = %source, "Pipeline step failed");
    progress.warning(step, source.to_string());
    ReviewError::Failed { domain, source }
}

/// Emits the progress warning for a rejected document.
pub(crate) fn input_rejected(progress: Progress<'_>, error: PreprocessingError) -> ReviewError {
    progress.warning(ProgressStep::Preprocessing, error.to_string());
    ReviewError::Input(error)
}
