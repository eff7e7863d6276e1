//! Agent Executor: runs the Analysis and Feedback agents concurrently.
//!
//! Both agents read the same pre-computed context (tool data + baseline) and never
//! each other's output, so they are issued together and joined. The first failure
//! wins: the other future is dropped and its result discarded.

use std::time::Duration;

use tracing::{info, warn};

use crate::agents::prompts::{
    AGENT_PROMPT_TEMPLATE, ANALYSIS_ROLE, ANALYSIS_SCHEMA, FEEDBACK_ROLE, FEEDBACK_SCHEMA,
    JOB_MATCH_ANALYSIS_TASK, JOB_MATCH_FEEDBACK_TASK, LOCAL_AGENT_PROMPT_TEMPLATE,
    LOCAL_ANALYSIS_ROLE, LOCAL_ANALYSIS_SCHEMA, LOCAL_FEEDBACK_ROLE, LOCAL_FEEDBACK_SCHEMA,
    RESUME_ANALYSIS_TASK, RESUME_FEEDBACK_TASK,
};
use crate::agents::resilience::RetryPolicy;
use crate::agents::strategy::{CallOptions, PromptSpec, Strategy};
use crate::agents::types::{AnalysisResult, FeedbackResult};
use crate::agents::AnalysisError;
use crate::llm_client::prompts::{system_prompt, GROUNDING_INSTRUCTION, LOCAL_GROUNDING_INSTRUCTION};
use crate::llm_client::{ModelTarget, ProviderTier, StructuredGenerator};
use crate::progress::{Progress, ProgressStep};
use crate::scoring::ReviewDomain;

const ANALYSIS_OPERATION: &str = "analysis agent";
const FEEDBACK_OPERATION: &str = "feedback agent";

/// Rough durations shown to the user while the agents run.
const ANALYSIS_ESTIMATE_MS: u64 = 30_000;
const FEEDBACK_ESTIMATE_MS: u64 = 25_000;

/// Context and sampling temperature for one agent.
#[derive(Debug, Clone)]
pub struct AgentTask {
    /// Rendered TOOL DATA / BASELINE / document sections.
    pub context: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct ExecuteAgentsRequest {
    pub target: ModelTarget,
    pub domain: ReviewDomain,
    pub analysis: AgentTask,
    pub feedback: AgentTask,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentResults {
    pub analysis: AnalysisResult,
    pub feedback: FeedbackResult,
}

/// Both agent strategies, resolved once per request from the provider tier.
pub struct AgentStrategies {
    pub analysis: Strategy<AnalysisResult>,
    pub feedback: Strategy<FeedbackResult>,
}

impl AgentStrategies {
    pub fn resolve(
        tier: ProviderTier,
        domain: ReviewDomain,
        analysis_context: &str,
        feedback_context: &str,
    ) -> Self {
        let (analysis_task, feedback_task) = match domain {
            ReviewDomain::Resume => (RESUME_ANALYSIS_TASK, RESUME_FEEDBACK_TASK),
            ReviewDomain::JobMatch => (JOB_MATCH_ANALYSIS_TASK, JOB_MATCH_FEEDBACK_TASK),
        };

        let analysis = Strategy::resolve(
            ANALYSIS_OPERATION,
            tier,
            || PromptSpec {
                system_prompt: system_prompt(ANALYSIS_ROLE),
                schema: ANALYSIS_SCHEMA,
                prompt: render(AGENT_PROMPT_TEMPLATE, GROUNDING_INSTRUCTION, analysis_task, analysis_context),
            },
            || PromptSpec {
                system_prompt: system_prompt(LOCAL_ANALYSIS_ROLE),
                schema: LOCAL_ANALYSIS_SCHEMA,
                prompt: render(
                    LOCAL_AGENT_PROMPT_TEMPLATE,
                    LOCAL_GROUNDING_INSTRUCTION,
                    analysis_task,
                    analysis_context,
                ),
            },
        );

        let feedback = Strategy::resolve(
            FEEDBACK_OPERATION,
            tier,
            || PromptSpec {
                system_prompt: system_prompt(FEEDBACK_ROLE),
                schema: FEEDBACK_SCHEMA,
                prompt: render(AGENT_PROMPT_TEMPLATE, GROUNDING_INSTRUCTION, feedback_task, feedback_context),
            },
            || PromptSpec {
                system_prompt: system_prompt(LOCAL_FEEDBACK_ROLE),
                schema: LOCAL_FEEDBACK_SCHEMA,
                prompt: render(
                    LOCAL_AGENT_PROMPT_TEMPLATE,
                    LOCAL_GROUNDING_INSTRUCTION,
                    feedback_task,
                    feedback_context,
                ),
            },
        );

        AgentStrategies { analysis, feedback }
    }
}

fn render(template: &str, grounding: &str, task: &str, context: &str) -> String {
    template
        .replace("{grounding}", grounding)
        .replace("{domain_task}", task)
        .replace("{context}", context)
}

/// Runs both agents concurrently, each as `retry(timeout(generate))`.
///
/// Results are already normalized to the full shape. Any failure aborts the
/// whole run after a progress warning for the failing agent.
pub async fn execute_agents(
    generator: &dyn StructuredGenerator,
    request: &ExecuteAgentsRequest,
    timeout: Duration,
    retry: &RetryPolicy,
    progress: Progress<'_>,
) -> Result<AgentResults, AnalysisError> {
    let target = &request.target;
    let strategies = AgentStrategies::resolve(
        target.provider.tier(),
        request.domain,
        &request.analysis.context,
        &request.feedback.context,
    );

    let analysis_options = CallOptions {
        temperature: request.analysis.temperature,
        timeout,
        retry: retry.clone(),
    };
    let feedback_options = CallOptions {
        temperature: request.feedback.temperature,
        timeout,
        retry: retry.clone(),
    };

    info!(
        provider = %target.provider,
        model = %target.model,
        domain = request.domain.label(),
        "Running analysis and feedback agents"
    );

    progress.agent_started(
        ProgressStep::AnalysisAgent,
        1,
        "Analysis agent scoring against the baseline",
        ANALYSIS_ESTIMATE_MS,
    );
    progress.agent_started(
        ProgressStep::FeedbackAgent,
        2,
        "Feedback agent drafting strengths and suggestions",
        FEEDBACK_ESTIMATE_MS,
    );

    let analysis = async {
        let result = strategies
            .analysis
            .run(generator, target, &analysis_options)
            .await;
        report(progress, ProgressStep::AnalysisAgent, 1, &result);
        result
    };
    let feedback = async {
        let result = strategies
            .feedback
            .run(generator, target, &feedback_options)
            .await;
        report(progress, ProgressStep::FeedbackAgent, 2, &result);
        result
    };

    let (analysis, feedback) = tokio::try_join!(analysis, feedback)?;

    info!(
        proposed_score = analysis.final_score,
        suggestions = feedback.suggestions.len(),
        "Agents completed"
    );

    Ok(AgentResults { analysis, feedback })
}

fn report<T>(
    progress: Progress<'_>,
    step: ProgressStep,
    agent_number: u8,
    result: &Result<T, AnalysisError>,
) {
    match result {
        Ok(_) => progress.agent_completed(step, agent_number, "Agent finished"),
        Err(e) => {
            warn!(agent_number, error = %e, "Agent failed");
            progress.warning(step, e.to_string());
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::llm_client::{LlmError, StructuredRequest};

    pub fn full_analysis(score: f64) -> Value {
        json!({
            "finalScore": score,
            "scoreRationale": "Matches the baseline",
            "dataInsights": ["3 quantified achievements"],
            "atsAssessment": {
                "compatibility": "medium",
                "matchedKeywords": ["rust"],
                "missingCritical": ["kubernetes"]
            }
        })
    }

    pub fn full_feedback() -> Value {
        json!({
            "strengths": ["Clear bullets"],
            "weaknesses": ["Few metrics"],
            "suggestions": [
                {"category": "Achievements", "suggestion": "Quantify impact", "priority": "high"}
            ],
            "synthesisNotes": "Solid foundation"
        })
    }

    /// Fake agent backend. Answers by schema, optionally sleeping or failing per role.
    pub struct FakeAgents {
        pub analysis: Value,
        pub feedback: Value,
        pub analysis_delay: Duration,
        pub feedback_delay: Duration,
        pub fail_analysis: bool,
        pub calls: AtomicU32,
    }

    impl FakeAgents {
        pub fn new(analysis: Value, feedback: Value) -> Self {
            Self {
                analysis,
                feedback,
                analysis_delay: Duration::ZERO,
                feedback_delay: Duration::ZERO,
                fail_analysis: false,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl StructuredGenerator for FakeAgents {
        async fn generate_object(&self, request: StructuredRequest<'_>) -> Result<Value, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let is_analysis =
                request.schema == ANALYSIS_SCHEMA || request.schema == LOCAL_ANALYSIS_SCHEMA;
            if is_analysis {
                tokio::time::sleep(self.analysis_delay).await;
                if self.fail_analysis {
                    return Err(LlmError::Api {
                        status: 500,
                        message: "overloaded".to_string(),
                    });
                }
                Ok(self.analysis.clone())
            } else {
                tokio::time::sleep(self.feedback_delay).await;
                Ok(self.feedback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::Instant;

    use super::testing::{full_analysis, full_feedback, FakeAgents};
    use super::*;
    use crate::llm_client::Provider;
    use crate::progress::testing::RecordingSink;
    use crate::progress::{NoopSink, ProgressStatus};

    fn request(provider: Provider) -> ExecuteAgentsRequest {
        ExecuteAgentsRequest {
            target: ModelTarget {
                provider,
                model: "test-model".to_string(),
            },
            domain: ReviewDomain::Resume,
            analysis: AgentTask {
                context: "BASELINE: 24".to_string(),
                temperature: 0.1,
            },
            feedback: AgentTask {
                context: "BASELINE: 24".to_string(),
                temperature: 0.3,
            },
        }
    }

    #[test]
    fn test_strategies_use_local_schemas_for_local_tier() {
        let s = AgentStrategies::resolve(ProviderTier::Local, ReviewDomain::Resume, "ctx", "ctx");
        assert_eq!(s.analysis.spec.schema, LOCAL_ANALYSIS_SCHEMA);
        assert_eq!(s.feedback.spec.schema, LOCAL_FEEDBACK_SCHEMA);
        assert!(s.analysis.spec.prompt.contains(LOCAL_GROUNDING_INSTRUCTION));
    }

    #[test]
    fn test_strategies_embed_domain_task_and_context() {
        let s = AgentStrategies::resolve(
            ProviderTier::Full,
            ReviewDomain::JobMatch,
            "BASELINE: 43",
            "TOOL DATA: 3 skills",
        );
        assert_eq!(s.analysis.spec.schema, ANALYSIS_SCHEMA);
        assert!(s.analysis.spec.prompt.contains(JOB_MATCH_ANALYSIS_TASK));
        assert!(s.analysis.spec.prompt.contains("BASELINE: 43"));
        assert!(s.feedback.spec.prompt.contains("TOOL DATA: 3 skills"));
        assert!(!s.feedback.spec.prompt.contains("{context}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_agents_run_concurrently() {
        let mut fake = FakeAgents::new(full_analysis(30.0), full_feedback());
        fake.analysis_delay = Duration::from_secs(1);
        fake.feedback_delay = Duration::from_secs(1);

        let started = Instant::now();
        let out = execute_agents(
            &fake,
            &request(Provider::Anthropic),
            Duration::from_secs(120),
            &RetryPolicy::none(),
            Progress::new(&NoopSink),
        )
        .await
        .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
        assert_eq!(out.analysis.final_score, 30.0);
        assert_eq!(out.feedback.strengths, vec!["Clear bullets"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_aborts_without_waiting() {
        let mut fake = FakeAgents::new(full_analysis(30.0), full_feedback());
        fake.fail_analysis = true;
        fake.feedback_delay = Duration::from_secs(10);

        let sink = RecordingSink::default();
        let started = Instant::now();
        let err = execute_agents(
            &fake,
            &request(Provider::Anthropic),
            Duration::from_secs(120),
            &RetryPolicy::none(),
            Progress::new(&sink),
        )
        .await
        .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(matches!(err, AnalysisError::Provider { .. }));
        assert_eq!(
            sink.statuses_for(ProgressStep::AnalysisAgent),
            vec![ProgressStatus::Started, ProgressStatus::Warning]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_agent_timeout_is_distinguishable() {
        let mut fake = FakeAgents::new(full_analysis(30.0), full_feedback());
        fake.analysis_delay = Duration::from_secs(200);

        let err = execute_agents(
            &fake,
            &request(Provider::Anthropic),
            Duration::from_secs(120),
            &RetryPolicy::none(),
            Progress::new(&NoopSink),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_local_tier_output_is_normalized() {
        let fake = FakeAgents::new(
            json!({ "score": 55, "missing": ["Terraform"], "notes": "ok" }),
            json!({ "strengths": ["Tidy"], "weaknesses": [], "suggestions": ["Add metrics"], "summary": "Fine" }),
        );

        let out = execute_agents(
            &fake,
            &request(Provider::Ollama),
            Duration::from_secs(120),
            &RetryPolicy::none(),
            Progress::new(&NoopSink),
        )
        .await
        .unwrap();

        assert_eq!(out.analysis.final_score, 55.0);
        assert_eq!(out.analysis.ats_assessment.missing_critical, vec!["Terraform"]);
        assert_eq!(out.feedback.suggestions[0].suggestion, "Add metrics");
        assert_eq!(out.feedback.synthesis_notes, "Fine");
    }

    #[tokio::test]
    async fn test_progress_reports_agent_numbers() {
        let fake = FakeAgents::new(full_analysis(30.0), full_feedback());
        let sink = RecordingSink::default();

        execute_agents(
            &fake,
            &request(Provider::Anthropic),
            Duration::from_secs(120),
            &RetryPolicy::none(),
            Progress::new(&sink),
        )
        .await
        .unwrap();

        let events = sink.events();
        let feedback_started = events
            .iter()
            .find(|e| e.step == ProgressStep::FeedbackAgent && e.status == ProgressStatus::Started)
            .unwrap();
        assert_eq!(feedback_started.agent_number, Some(2));
        assert_eq!(feedback_started.estimated_duration_ms, Some(FEEDBACK_ESTIMATE_MS));
        assert_eq!(
            sink.statuses_for(ProgressStep::AnalysisAgent),
            vec![ProgressStatus::Started, ProgressStatus::Completed]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        use std::sync::atomic::Ordering;

        let mut fake = FakeAgents::new(full_analysis(30.0), full_feedback());
        fake.fail_analysis = true;

        let err = execute_agents(
            &fake,
            &request(Provider::Anthropic),
            Duration::from_secs(120),
            &RetryPolicy::default(),
            Progress::new(&NoopSink),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AnalysisError::Provider { .. }));
        // Feedback once, analysis twice (one retry).
        assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
    }
}
