use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use crate::config::ScanConfig;
use crate::models::ProbeResult;
use crate::template::Template;
use super::executor::StepExecutor;
use super::transport::HttpTransport;
use tracing::{debug, error, info, warn};

/// Everything a finished (or cancelled) scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Completed probes in completion order.
    pub results: Vec<ProbeResult>,
    /// Pairs handed to the worker pool.
    pub submitted: usize,
    /// Size of the template x URL cross product.
    pub total_pairs: usize,
    pub cancelled: bool,
}

impl ScanOutcome {
    pub fn vulnerable(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.is_vulnerable())
    }

    /// Result counts keyed by verdict label.
    pub fn count_by_verdict(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.verdict.label()).or_insert(0) += 1;
        }
        counts
    }
}

/// Fans every (template, URL) pair out over a bounded pool of tokio tasks.
pub struct ScanCoordinator {
    config: Arc<ScanConfig>,
    executor: Arc<StepExecutor>,
    cancel_token: CancellationToken,
}

impl ScanCoordinator {
    pub fn new(config: Arc<ScanConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        let executor = Arc::new(StepExecutor::new(config.clone(), transport));
        Self {
            config,
            executor,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Use an external token, e.g. one tripped by a Ctrl-C handler.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub async fn run(&self, templates: &[Arc<Template>], urls: &[String]) -> ScanOutcome {
        self.execute(templates, urls, None).await
    }

    /// Like [`run`](Self::run), but each result is also sent on `tx` as soon as it completes.
    pub async fn run_streaming(
        &self,
        templates: &[Arc<Template>],
        urls: &[String],
        tx: mpsc::UnboundedSender<ProbeResult>,
    ) -> ScanOutcome {
        self.execute(templates, urls, Some(tx)).await
    }

    async fn execute(
        &self,
        templates: &[Arc<Template>],
        urls: &[String],
        tx: Option<mpsc::UnboundedSender<ProbeResult>>,
    ) -> ScanOutcome {
        let workers = self.config.threads.max(1);
        let total_pairs = templates.len() * urls.len();
        info!(
            templates = templates.len(),
            targets = urls.len(),
            pairs = total_pairs,
            workers,
            "Starting scan"
        );

        let mut pairs = templates.iter()
            .flat_map(|template| urls.iter().map(move |url| (template.clone(), url.clone())));
        let mut outcome = ScanOutcome {
            results: Vec::with_capacity(total_pairs),
            total_pairs,
            ..Default::default()
        };
        let mut in_flight: JoinSet<ProbeResult> = JoinSet::new();
        let mut pending: HashMap<Id, (Arc<Template>, String)> = HashMap::new();

        loop {
            while !outcome.cancelled && in_flight.len() < workers {
                if self.cancel_token.is_cancelled() {
                    outcome.cancelled = true;
                    break;
                }
                let Some((template, url)) = pairs.next() else { break };
                let id = self.spawn_probe(&mut in_flight, template.clone(), url.clone());
                pending.insert(id, (template, url));
                outcome.submitted += 1;
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled(), if !outcome.cancelled => {
                    warn!(
                        submitted = outcome.submitted,
                        remaining = total_pairs - outcome.submitted,
                        "Scan cancelled, waiting for in-flight probes"
                    );
                    outcome.cancelled = true;
                }
                joined = in_flight.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    let Some(result) = settle(&mut pending, joined) else { continue };
                    if let Some(tx) = &tx {
                        let _ = tx.send(result.clone());
                    }
                    outcome.results.push(result);
                }
            }
        }

        info!(
            completed = outcome.results.len(),
            vulnerable = outcome.vulnerable().count(),
            cancelled = outcome.cancelled,
            "Scan finished"
        );
        outcome
    }

    fn spawn_probe(&self, set: &mut JoinSet<ProbeResult>, template: Arc<Template>, url: String) -> Id {
        let executor = self.executor.clone();
        debug!(template = %template.id, url = %url, "Submitting probe");
        let handle = set.spawn(async move {
            let probe = AssertUnwindSafe(executor.run(template.clone(), &url)).catch_unwind();
            match probe.await {
                Ok(result) => result,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    error!(template = %template.id, url = %url, reason = %reason, "Probe panicked");
                    ProbeResult::aborted(template, url, &format!("probe panicked: {}", reason))
                }
            }
        });
        handle.id()
    }
}

/// Turn a joined task back into its pair's result. A task that was aborted or
/// whose panic escaped still yields an error result for the pair it owned.
fn settle(
    pending: &mut HashMap<Id, (Arc<Template>, String)>,
    joined: Result<(Id, ProbeResult), JoinError>,
) -> Option<ProbeResult> {
    match joined {
        Ok((id, result)) => {
            pending.remove(&id);
            Some(result)
        }
        Err(e) => {
            let Some((template, url)) = pending.remove(&e.id()) else {
                error!(error = %e, "Probe task could not be joined");
                return None;
            };
            error!(template = %template.id, url = %url, error = %e, "Probe task could not be joined");
            let reason = if e.is_cancelled() { "probe task cancelled" } else { "probe task failed" };
            Some(ProbeResult::aborted(template, url, &format!("{}: {}", reason, e)))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
