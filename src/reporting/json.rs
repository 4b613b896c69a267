use std::path::{Path, PathBuf};
use async_trait::async_trait;
use crate::engine::ScanOutcome;
use crate::errors::ScanError;
use crate::models::ProbeResult;
use super::{FindingRecord, ResultSink};
use tracing::info;

/// Writes every finding, with evidence, to `<report_dir>/findings.json`.
pub struct JsonReport {
    path: PathBuf,
    findings: Vec<FindingRecord>,
}

impl JsonReport {
    pub fn new(report_dir: &Path) -> Self {
        Self { path: report_dir.join("findings.json"), findings: Vec::new() }
    }
}

#[async_trait]
impl ResultSink for JsonReport {
    async fn record(&mut self, result: &ProbeResult) -> Result<(), ScanError> {
        self.findings.push(FindingRecord::from_result(result));
        Ok(())
    }

    async fn finish(&mut self, _outcome: &ScanOutcome) -> Result<Option<PathBuf>, ScanError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(&self.findings)?;
        tokio::fs::write(&self.path, json).await?;
        info!(path = %self.path.display(), findings = self.findings.len(), "JSON findings written");
        Ok(Some(self.path.clone()))
    }

    fn name(&self) -> &str { "json" }
}
