pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::review::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Review API
        .route("/api/v1/reviews/resume", post(handlers::handle_review_resume))
        .route(
            "/api/v1/reviews/resume/stream",
            post(handlers::handle_review_resume_stream),
        )
        .route("/api/v1/reviews/job-match", post(handlers::handle_job_match))
        .route(
            "/api/v1/reviews/job-match/stream",
            post(handlers::handle_job_match_stream),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::agents::resilience::RetryPolicy;
    use crate::config::{AnalysisSettings, Config};
    use crate::llm_client::{LlmError, StructuredGenerator, StructuredRequest};
    use crate::preprocess::testing::SAMPLE_RESUME;
    use crate::rate_limit::{RateLimitConfig, RateLimiter};

    const USER: &str = "7f8c2a4e-1b3d-4c5e-9f6a-0b1c2d3e4f5a";

    /// One object that satisfies every full-tier schema.
    struct AnyShape;

    #[async_trait]
    impl StructuredGenerator for AnyShape {
        async fn generate_object(&self, _request: StructuredRequest<'_>) -> Result<Value, LlmError> {
            Ok(json!({
                "finalScore": 60,
                "score": 60,
                "technicalSkills": ["Rust", "Go"],
                "strongVerbs": ["Led"],
                "verbScore": 7,
                "suggestions": [],
                "strengths": ["Rust"]
            }))
        }
    }

    fn app(max_requests: u32) -> Router {
        let analysis = AnalysisSettings {
            retry: RetryPolicy::none(),
            rate_limit: RateLimitConfig {
                max_requests,
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState {
            llm: Arc::new(AnyShape),
            rate_limiter: Arc::new(RateLimiter::in_memory(analysis.rate_limit)),
            config: Config {
                port: 0,
                rust_log: "info".to_string(),
                anthropic_api_key: None,
                anthropic_api_url: String::new(),
                ollama_base_url: String::new(),
                default_model: "test-model".to_string(),
                analysis,
            },
        };
        build_router(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(5)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_empty_resume_is_bad_request_no_content() {
        let response = app(5)
            .oneshot(post_json(
                "/api/v1/reviews/resume",
                json!({ "userId": USER, "resumeText": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"]["code"], "NO_CONTENT");
    }

    #[tokio::test]
    async fn test_over_limit_user_gets_429() {
        let app = app(1);
        let body = json!({ "userId": USER, "resumeText": "" });

        let first = app
            .clone()
            .oneshot(post_json("/api/v1/reviews/resume", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);

        let second = app
            .oneshot(post_json("/api/v1/reviews/resume", body))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = read_json(second).await;
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
        assert!(json["error"]["resetIn"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_resume_review_returns_scored_response() {
        let response = app(5)
            .oneshot(post_json(
                "/api/v1/reviews/resume",
                json!({ "userId": USER, "resumeText": SAMPLE_RESUME }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["model"], "test-model");
        let score = json["score"].as_u64().unwrap();
        assert!(score >= json["scoreRange"]["min"].as_u64().unwrap());
        assert!(score <= json["scoreRange"]["max"].as_u64().unwrap());
    }

    #[tokio::test]
    async fn test_stream_emits_progress_then_result() {
        let response = app(5)
            .oneshot(post_json(
                "/api/v1/reviews/resume/stream",
                json!({ "userId": USER, "resumeText": SAMPLE_RESUME }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap().replace("event: ", "event:");
        let first_progress = text.find("event:progress").unwrap();
        let result = text.find("event:result").unwrap();
        assert!(first_progress < result);
        assert!(!text.contains("event:error"));
    }

    #[tokio::test]
    async fn test_stream_reports_rejected_input_as_error_event() {
        let response = app(5)
            .oneshot(post_json(
                "/api/v1/reviews/job-match/stream",
                json!({ "userId": USER, "resumeText": SAMPLE_RESUME, "jobText": "" }),
            ))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap().replace("event: ", "event:");
        assert!(text.contains("event:error"));
        assert!(text.contains("NO_CONTENT"));
    }
}
