//! Result sinks: where vulnerable probe results end up once the scan produces them.

pub mod html;
pub mod json;
pub mod log;

use std::path::PathBuf;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::engine::ScanOutcome;
use crate::errors::ScanError;
use crate::models::ProbeResult;

pub use html::HtmlReport;
pub use json::JsonReport;
pub use log::FindingLog;

/// Receives vulnerable results in the order they are produced.
#[async_trait]
pub trait ResultSink: Send {
    async fn record(&mut self, result: &ProbeResult) -> Result<(), ScanError>;

    /// Called once after the scan. Returns the written file, if any.
    async fn finish(&mut self, outcome: &ScanOutcome) -> Result<Option<PathBuf>, ScanError>;

    /// Sink name for logging
    fn name(&self) -> &str;
}

/// Request and response text of one step, as shown in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvidence {
    pub step: usize,
    pub request: Option<String>,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingRecord {
    pub url: String,
    pub template: String,
    pub name: String,
    pub severity: String,
    pub category: String,
    pub verdict: String,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<StepEvidence>,
}

impl FindingRecord {
    pub fn from_result(result: &ProbeResult) -> Self {
        let info = &result.template.info;
        Self {
            url: result.url.clone(),
            template: result.template.id.clone(),
            name: info.name.clone(),
            severity: info.severity.to_string(),
            category: info.category.clone(),
            verdict: result.verdict.to_string(),
            detected_at: result.started_at,
            evidence: result.steps.iter()
                .map(|step| StepEvidence {
                    step: step.index + 1,
                    request: step.request_text(),
                    response: step.response_text(),
                })
                .collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_result() {
        let result = fixtures::vulnerable_result("http://10.0.0.1", "<h1>admin</h1>");
        let record = FindingRecord::from_result(&result);
        assert_eq!(record.template, "demo-admin");
        assert_eq!(record.severity, "high");
        assert_eq!(record.category, "cms");
        assert_eq!(record.verdict, "vulnerable");
        assert_eq!(record.evidence.len(), 1);
        assert!(record.evidence[0].request.as_deref().unwrap().starts_with("GET /admin HTTP/1.1\nHost: 10.0.0.1\n"));
        assert!(record.evidence[0].response.contains("<h1>admin</h1>"));
    }
}
