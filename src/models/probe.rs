use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use crate::errors::StepFailure;
use crate::template::Template;
use super::exchange::{HttpResponse, PreparedRequest, StepResult};
use super::verdict::{StepEvaluation, Verdict};

/// Everything recorded about one executed step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Zero-based position of the step in its template.
    pub index: usize,
    /// `None` when the step could not be turned into a request.
    pub request: Option<PreparedRequest>,
    pub result: StepResult,
    /// `None` when there was no response to evaluate.
    pub evaluation: Option<StepEvaluation>,
}

impl StepRecord {
    pub fn response(&self) -> Option<&HttpResponse> {
        self.result.response()
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        self.result.failure()
    }

    pub fn latency(&self) -> Option<Duration> {
        self.response().map(|r| r.latency)
    }
}

/// Outcome of one template run against one URL. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub template: Arc<Template>,
    pub url: String,
    pub verdict: Verdict,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl ProbeResult {
    /// A result for a probe that produced no step records at all.
    pub fn aborted(template: Arc<Template>, url: String, reason: &str) -> Self {
        Self {
            template,
            url,
            verdict: Verdict::Error(reason.to_string()),
            steps: Vec::new(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        self.verdict.is_vulnerable()
    }

    pub fn responded_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.response().is_some()).count()
    }
}
