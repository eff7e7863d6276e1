// Agent orchestration: strategy resolution per provider tier, the retry/timeout
// harness, output normalization, and the concurrent Analysis + Feedback executor.
// All LLM calls go through llm_client; nothing here talks to a provider directly.

use std::time::Duration;

use thiserror::Error;

use crate::llm_client::{LlmError, Provider};

pub mod executor;
pub mod prompts;
pub mod resilience;
pub mod strategy;
pub mod types;

/// Failure of an extraction or agent step after the retry/timeout harness gave up.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("AI service unavailable ({provider}): {message}")]
    Unavailable { provider: Provider, message: String },

    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("{operation} returned malformed output: {detail}")]
    MalformedOutput {
        operation: &'static str,
        detail: String,
    },
}

impl AnalysisError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalysisError::Timeout { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, AnalysisError::Unavailable { .. })
    }

    /// Classifies a raw provider failure for one operation.
    pub fn from_llm(operation: &'static str, provider: Provider, error: LlmError) -> Self {
        if error.is_unavailable() {
            AnalysisError::Unavailable {
                provider,
                message: format!("{error}. {}", provider.remediation()),
            }
        } else if let LlmError::Parse(e) = &error {
            AnalysisError::MalformedOutput {
                operation,
                detail: e.to_string(),
            }
        } else {
            AnalysisError::Provider {
                operation,
                source: error,
            }
        }
    }
}
