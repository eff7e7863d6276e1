//! Provider-tier strategy objects.
//!
//! A `Strategy<T>` bundles everything one structured call needs: system prompt,
//! output schema, rendered prompt, and the normalizer that turns raw JSON into
//! the full shape `T`. `Strategy::resolve` is the only place in the pipeline that
//! inspects `ProviderTier`; everything downstream sees the full shape.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::agents::resilience::{with_retry, with_timeout, RetryPolicy};
use crate::agents::AnalysisError;
use crate::llm_client::{ModelTarget, ProviderTier, StructuredGenerator, StructuredRequest};

/// An output type with a simplified local-model counterpart that normalizes into it.
pub trait TieredOutput: DeserializeOwned + Sized {
    type Local: DeserializeOwned + Into<Self>;

    /// Range fixes applied after parsing, whichever tier produced the value.
    fn sanitize(self) -> Self {
        self
    }
}

/// The tier-specific half of a strategy: prompt, system prompt and schema.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub system_prompt: String,
    pub schema: &'static str,
    pub prompt: String,
}

/// Per-call knobs shared by extraction and agent calls.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub temperature: f32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

pub struct Strategy<T> {
    pub operation: &'static str,
    pub tier: ProviderTier,
    pub spec: PromptSpec,
    normalize: fn(Value) -> Result<T, serde_json::Error>,
}

impl<T: TieredOutput> Strategy<T> {
    /// Picks the full or simplified prompt/schema pair for `tier`.
    /// Only the chosen builder runs.
    pub fn resolve(
        operation: &'static str,
        tier: ProviderTier,
        full: impl FnOnce() -> PromptSpec,
        local: impl FnOnce() -> PromptSpec,
    ) -> Self {
        match tier {
            ProviderTier::Full => Strategy {
                operation,
                tier,
                spec: full(),
                normalize: parse_full::<T>,
            },
            ProviderTier::Local => Strategy {
                operation,
                tier,
                spec: local(),
                normalize: parse_local::<T>,
            },
        }
    }
}

impl<T> Strategy<T> {
    /// Converts raw model output into the full shape.
    pub fn normalize(&self, raw: Value) -> Result<T, AnalysisError> {
        (self.normalize)(raw).map_err(|e| AnalysisError::MalformedOutput {
            operation: self.operation,
            detail: e.to_string(),
        })
    }

    /// Runs the call as `retry(timeout(generate → normalize))`.
    pub async fn run(
        &self,
        generator: &dyn StructuredGenerator,
        target: &ModelTarget,
        options: &CallOptions,
    ) -> Result<T, AnalysisError> {
        let operation = self.operation;
        with_retry(operation, &options.retry, move || async move {
            let started = Instant::now();
            let raw = with_timeout(operation, options.timeout, async move {
                generator
                    .generate_object(StructuredRequest {
                        provider: target.provider,
                        model: &target.model,
                        schema: self.spec.schema,
                        system: &self.spec.system_prompt,
                        prompt: &self.spec.prompt,
                        temperature: options.temperature,
                    })
                    .await
                    .map_err(|e| AnalysisError::from_llm(operation, target.provider, e))
            })
            .await?;
            debug!(
                operation,
                tier = ?self.tier,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "structured call completed"
            );
            self.normalize(raw)
        })
        .await
    }
}

fn parse_full<T: TieredOutput>(raw: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value::<T>(raw).map(T::sanitize)
}

fn parse_local<T: TieredOutput>(raw: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value::<T::Local>(raw).map(|local| T::sanitize(local.into()))
}
