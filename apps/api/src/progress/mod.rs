//! Progress events for live UIs.
//!
//! Pipelines push `ProgressUpdate`s into a caller-supplied `ProgressSink`. Sinks
//! must not block: emitting is fire-and-forget and never fails the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStep {
    Preprocessing,
    SignalExtraction,
    SemanticExtraction,
    BaselineScoring,
    AnalysisAgent,
    FeedbackAgent,
    ScoreValidation,
    ResponseAssembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Started,
    Completed,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub step: ProgressStep,
    pub status: ProgressStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_ms: Option<u64>,
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, update: ProgressUpdate);
}

/// Discards every event. Used by the plain JSON endpoints.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _update: ProgressUpdate) {}
}

/// Forwards events into an unbounded channel (drained by the SSE stream).
pub struct ChannelSink {
    tx: UnboundedSender<ProgressUpdate>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<ProgressUpdate>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, update: ProgressUpdate) {
        // The receiver disappears when the client disconnects; the pipeline keeps going.
        if self.tx.send(update).is_err() {
            debug!("progress receiver dropped; event discarded");
        }
    }
}

/// Thin helper that stamps and emits events for one pipeline run.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    sink: &'a dyn ProgressSink,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink }
    }

    pub fn started(&self, step: ProgressStep, message: impl Into<String>) {
        self.emit(step, ProgressStatus::Started, message.into(), None, None);
    }

    pub fn completed(&self, step: ProgressStep, message: impl Into<String>) {
        self.emit(step, ProgressStatus::Completed, message.into(), None, None);
    }

    pub fn warning(&self, step: ProgressStep, message: impl Into<String>) {
        self.emit(step, ProgressStatus::Warning, message.into(), None, None);
    }

    pub fn agent_started(
        &self,
        step: ProgressStep,
        agent_number: u8,
        message: impl Into<String>,
        estimated_duration_ms: u64,
    ) {
        self.emit(
            step,
            ProgressStatus::Started,
            message.into(),
            Some(agent_number),
            Some(estimated_duration_ms),
        );
    }

    pub fn agent_completed(&self, step: ProgressStep, agent_number: u8, message: impl Into<String>) {
        self.emit(
            step,
            ProgressStatus::Completed,
            message.into(),
            Some(agent_number),
            None,
        );
    }

    fn emit(
        &self,
        step: ProgressStep,
        status: ProgressStatus,
        message: String,
        agent_number: Option<u8>,
        estimated_duration_ms: Option<u64>,
    ) {
        self.sink.emit(ProgressUpdate {
            step,
            status,
            message,
            timestamp: Utc::now(),
            agent_number,
            estimated_duration_ms,
        });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every event for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<ProgressUpdate>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<ProgressUpdate> {
            self.events.lock().map(|e| e.clone()).unwrap_or_default()
        }

        pub fn statuses_for(&self, step: ProgressStep) -> Vec<ProgressStatus> {
            self.events()
                .into_iter()
                .filter(|e| e.step == step)
                .map(|e| e.status)
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn emit(&self, update: ProgressUpdate) {
            if let Ok(mut events) = self.events.lock() {
                events.push(update);
            }
        }
    }
}
