use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::agents::resilience::RetryPolicy;
use crate::rate_limit::RateLimitConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Cloud provider key. Optional: without it only the local provider is usable.
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub ollama_base_url: String,
    pub default_model: String,
    pub analysis: AnalysisSettings,
}

/// Numeric knobs of the analysis pipeline, grouped so tests can build them directly.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Hard deadline for semantic-extraction-class calls.
    pub semantic_timeout: Duration,
    /// Hard deadline for agent-class calls.
    pub agent_timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitConfig,
    pub analysis_temperature: f32,
    pub feedback_temperature: f32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            semantic_timeout: Duration::from_millis(60_000),
            agent_timeout: Duration::from_millis(120_000),
            retry: RetryPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            analysis_temperature: 0.1,
            feedback_temperature: 0.3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional_env("ANTHROPIC_API_URL")
                .unwrap_or_else(|| "https://api.anthropic.com/v1/messages".to_string()),
            ollama_base_url: optional_env("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            default_model: optional_env("DEFAULT_MODEL")
                .unwrap_or_else(|| crate::llm_client::DEFAULT_MODEL.to_string()),
            analysis: AnalysisSettings::from_env()?,
        })
    }
}

impl AnalysisSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = AnalysisSettings::default();

        Ok(AnalysisSettings {
            semantic_timeout: Duration::from_millis(env_or(
                "SEMANTIC_TIMEOUT_MS",
                defaults.semantic_timeout.as_millis() as u64,
            )?),
            agent_timeout: Duration::from_millis(env_or(
                "AGENT_TIMEOUT_MS",
                defaults.agent_timeout.as_millis() as u64,
            )?),
            retry: RetryPolicy {
                max_attempts: env_or("RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                base_delay: Duration::from_millis(env_or(
                    "RETRY_BASE_DELAY_MS",
                    defaults.retry.base_delay.as_millis() as u64,
                )?),
                multiplier: env_or("RETRY_BACKOFF_MULTIPLIER", defaults.retry.multiplier)?,
            },
            rate_limit: RateLimitConfig {
                window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit.window_ms)?,
                max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", defaults.rate_limit.max_requests)?,
                ..defaults.rate_limit
            },
            analysis_temperature: env_or("ANALYSIS_TEMPERATURE", defaults.analysis_temperature)?,
            feedback_temperature: env_or("FEEDBACK_TEMPERATURE", defaults.feedback_temperature)?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
