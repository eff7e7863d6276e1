use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::StructuredGenerator;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every model call goes through this. `LlmClient` in production, fakes in tests.
    pub llm: Arc<dyn StructuredGenerator>,
    pub config: Config,
    pub rate_limiter: Arc<RateLimiter>,
}
