/// LLM Client: the single point of entry for all model calls in the reviewer.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Everything else talks to the `StructuredGenerator` trait, which `LlmClient`
/// implements for the cloud (full tier) and local (simplified tier) providers.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
/// Transport-level ceiling. The pipeline applies its own, shorter, per-call deadlines.
const HTTP_TIMEOUT_SECS: u64 = 300;

/// Backing LLM provider for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    Ollama,
}

/// Capability class of a provider. Selects prompt/schema pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderTier {
    /// Cloud models that handle long prompts and rich schemas.
    Full,
    /// Resource-constrained local models: short prompts, flat schemas.
    Local,
}

impl Provider {
    pub fn tier(self) -> ProviderTier {
        match self {
            Provider::Anthropic => ProviderTier::Full,
            Provider::Ollama => ProviderTier::Local,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Ollama => "ollama",
        }
    }

    /// Sentence telling the user how to recover when the provider cannot be reached.
    pub fn remediation(self) -> &'static str {
        match self {
            Provider::Anthropic => {
                "Check that the Anthropic API key is configured and the service is reachable."
            }
            Provider::Ollama => {
                "Ensure the Ollama service is running and the requested model has been pulled."
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider + model pair a pipeline run is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTarget {
    pub provider: Provider,
    pub model: String,
}

/// One "generate a structured object" call.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub provider: Provider,
    pub model: &'a str,
    /// JSON shape the model must return, embedded into the prompt.
    pub schema: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Provider '{provider}' is not configured")]
    NotConfigured { provider: Provider },

    #[error("Provider '{provider}' is unreachable: {message}")]
    Unreachable { provider: Provider, message: String },
}

impl LlmError {
    /// True when the failure means the provider itself is not usable right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LlmError::NotConfigured { .. } | LlmError::Unreachable { .. }
        ) || matches!(self, LlmError::Api { status, .. } if *status == 503)
    }
}

/// Capability contract: generate a JSON object matching a schema, or fail.
///
/// Carried in `AppState` as `Arc<dyn StructuredGenerator>` so tests can swap in fakes.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate_object(&self, request: StructuredRequest<'_>) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// The single LLM client used by every pipeline stage.
/// Each call is one attempt: retry and deadlines belong to the agent harness.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    anthropic_api_key: Option<String>,
    anthropic_api_url: String,
    ollama_base_url: String,
}

impl LlmClient {
    pub fn new(
        anthropic_api_key: Option<String>,
        anthropic_api_url: String,
        ollama_base_url: String,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()?,
            anthropic_api_key,
            anthropic_api_url,
            ollama_base_url: ollama_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call_anthropic(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        let api_key = self
            .anthropic_api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured {
                provider: Provider::Anthropic,
            })?;

        let prompt = with_schema(request.prompt, request.schema);
        let body = AnthropicRequest {
            model: request.model,
            max_tokens: MAX_TOKENS,
            temperature: request.temperature,
            system: request.system,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.anthropic_api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Anthropic, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;
        debug!(
            provider = "anthropic",
            model = request.model,
            input_tokens = llm_response.usage.input_tokens,
            output_tokens = llm_response.usage.output_tokens,
            "LLM call succeeded"
        );

        llm_response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn call_ollama(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        let prompt = with_schema(request.prompt, request.schema);
        let body = OllamaRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            format: "json",
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.ollama_base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Provider::Ollama, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(
            provider = "ollama",
            model = request.model,
            prompt_tokens = ollama_response.prompt_eval_count.unwrap_or_default(),
            output_tokens = ollama_response.eval_count.unwrap_or_default(),
            "LLM call succeeded"
        );

        if ollama_response.message.content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(ollama_response.message.content)
    }
}

#[async_trait]
impl StructuredGenerator for LlmClient {
    async fn generate_object(&self, request: StructuredRequest<'_>) -> Result<Value, LlmError> {
        let text = match request.provider {
            Provider::Anthropic => self.call_anthropic(&request).await?,
            Provider::Ollama => self.call_ollama(&request).await?,
        };

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);
        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

fn transport_error(provider: Provider, error: reqwest::Error) -> LlmError {
    if error.is_connect() {
        LlmError::Unreachable {
            provider,
            message: error.to_string(),
        }
    } else {
        LlmError::Http(error)
    }
}

fn with_schema(prompt: &str, schema: &str) -> String {
    format!("{prompt}\n\nReturn a JSON object with this EXACT shape:\n{schema}")
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_provider_tiers() {
        assert_eq!(Provider::Anthropic.tier(), ProviderTier::Full);
        assert_eq!(Provider::Ollama.tier(), ProviderTier::Local);
    }

    #[test]
    fn test_provider_serde_is_lowercase() {
        let p: Provider = serde_json::from_str(r#""ollama""#).unwrap();
        assert_eq!(p, Provider::Ollama);
        assert_eq!(serde_json::to_string(&Provider::Anthropic).unwrap(), r#""anthropic""#);
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(LlmError::NotConfigured {
            provider: Provider::Anthropic
        }
        .is_unavailable());
        assert!(LlmError::Api {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_unavailable());
        assert!(!LlmError::EmptyContent.is_unavailable());
    }

    #[tokio::test]
    async fn test_anthropic_without_key_is_not_configured() {
        let client = LlmClient::new(
            None,
            "http://127.0.0.1:9/v1/messages".to_string(),
            "http://127.0.0.1:9".to_string(),
        )
        .unwrap();
        let err = client
            .generate_object(StructuredRequest {
                provider: Provider::Anthropic,
                model: DEFAULT_MODEL,
                schema: "{}",
                system: "system",
                prompt: "prompt",
                temperature: 0.1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured { .. }));
    }
}
