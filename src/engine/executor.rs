use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use crate::config::ScanConfig;
use crate::errors::{StepFailure, TransportError};
use crate::models::{ProbeResult, StepRecord, StepEvaluation, StepResult};
use crate::template::{Step, Template};
use super::matcher::{combine_steps, evaluate_step};
use super::request::build_request;
use super::transport::HttpTransport;
use tracing::{debug, info};

/// Lifecycle of one probe. Steps run strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Pending,
    Running(usize),
    Completed(usize),
    TransportFailed(usize),
    Scored,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeState::Pending => write!(f, "pending"),
            ProbeState::Running(i) => write!(f, "running(step {})", i + 1),
            ProbeState::Completed(i) => write!(f, "completed(step {})", i + 1),
            ProbeState::TransportFailed(i) => write!(f, "transport-failed(step {})", i + 1),
            ProbeState::Scored => write!(f, "scored"),
        }
    }
}

/// Runs every step of one template against one URL and scores the result.
///
/// A failed step never stops the probe; later steps still run. There is no
/// retry here: re-running a probe is the caller's business.
pub struct StepExecutor {
    config: Arc<ScanConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl StepExecutor {
    pub fn new(config: Arc<ScanConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub async fn run(&self, template: Arc<Template>, url: &str) -> ProbeResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut state = ProbeState::Pending;
        let mut steps = Vec::with_capacity(template.steps.len());

        for (index, step) in template.steps.iter().enumerate() {
            self.transition(&template, url, &mut state, ProbeState::Running(index));
            let outcome = self.run_step(index, step, url).await;
            let next = match outcome.result {
                StepResult::Response(_) => ProbeState::Completed(index),
                StepResult::Failed(_) => ProbeState::TransportFailed(index),
            };
            self.transition(&template, url, &mut state, next);
            steps.push(outcome);
        }

        let verdict = combine_steps(steps.iter().map(|s| match s.failure() {
            Some(failure) => Err(failure),
            None => Ok(s.evaluation.unwrap_or(StepEvaluation::NoRule)),
        }));
        self.transition(&template, url, &mut state, ProbeState::Scored);

        if verdict.is_vulnerable() {
            info!(
                template = %template.id,
                url = %url,
                severity = %template.info.severity,
                "Target is vulnerable"
            );
        } else {
            debug!(template = %template.id, url = %url, verdict = %verdict, "Probe finished");
        }

        ProbeResult {
            template,
            url: url.to_string(),
            verdict,
            steps,
            started_at,
            duration: clock.elapsed(),
        }
    }

    async fn run_step(&self, index: usize, step: &Step, url: &str) -> StepRecord {
        let request = match build_request(step, url, &self.config) {
            Ok(request) => request,
            Err(failure) => {
                debug!(step = index + 1, error = %failure, "Step could not be built");
                return StepRecord {
                    index,
                    request: None,
                    result: StepResult::Failed(failure),
                    evaluation: None,
                };
            }
        };

        // The transport enforces its own timeout; this bound holds for any transport.
        let timeout = self.config.request_timeout();
        let sent = tokio::time::timeout(timeout, self.transport.send(&request)).await;
        let result = match sent {
            Ok(Ok(response)) => StepResult::Response(response),
            Ok(Err(error)) => {
                debug!(step = index + 1, url = %request.url, error = %error, "Request failed");
                StepResult::Failed(StepFailure::Transport(error))
            }
            Err(_) => {
                debug!(step = index + 1, url = %request.url, "Request abandoned after timeout");
                StepResult::Failed(StepFailure::Transport(TransportError::Timeout(timeout)))
            }
        };

        let evaluation = result.response().map(|response| evaluate_step(step, response));

        StepRecord {
            index,
            request: Some(request),
            result,
            evaluation,
        }
    }

    fn transition(&self, template: &Template, url: &str, state: &mut ProbeState, next: ProbeState) {
        debug!(
            template = %template.id,
            url = %url,
            transport = self.transport.name(),
            from = %state,
            to = %next,
            "Probe state change"
        );
        *state = next;
    }
}
