// Deterministic scoring: baseline engine, variance policy and score validation.
// Pure functions only: no LLM calls, no I/O.

use serde::{Deserialize, Serialize};

pub mod baseline;
pub mod variance;

pub use baseline::{
    calculate_job_match_score, calculate_resume_score, BaselineScore, JobMatchSignals,
    ResumeSignals,
};
pub use variance::{calculate_allowed_variance, validate_score, ScoreValidation};

/// Which analysis a pipeline run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDomain {
    Resume,
    JobMatch,
}

impl ReviewDomain {
    /// Prefix of every user-facing failure message for this domain.
    pub fn failure_prefix(self) -> &'static str {
        match self {
            ReviewDomain::Resume => "Resume review failed",
            ReviewDomain::JobMatch => "Job match analysis failed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewDomain::Resume => "resume review",
            ReviewDomain::JobMatch => "job match",
        }
    }
}
