use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::Local;
use tokio::io::AsyncWriteExt;
use crate::engine::ScanOutcome;
use crate::errors::ScanError;
use crate::models::ProbeResult;
use super::ResultSink;
use tracing::debug;

/// Appends one line per finding to `<log_dir>/<YYYY-MM-DD>.log`.
pub struct FindingLog {
    path: PathBuf,
    written: usize,
}

impl FindingLog {
    pub fn new(log_dir: &Path) -> Self {
        let file = format!("{}.log", Local::now().format("%Y-%m-%d"));
        Self { path: log_dir.join(file), written: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `YYYY-MM-DD HH:MM:SS - {"url":...}`
    pub fn format_line(result: &ProbeResult) -> Result<String, ScanError> {
        let info = &result.template.info;
        let entry = serde_json::json!({
            "url": result.url,
            "template": result.template.id,
            "severity": info.severity.as_str(),
            "category": info.category,
            "verdict": result.verdict.to_string(),
        });
        Ok(format!(
            "{} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            serde_json::to_string(&entry)?
        ))
    }
}

#[async_trait]
impl ResultSink for FindingLog {
    async fn record(&mut self, result: &ProbeResult) -> Result<(), ScanError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let line = Self::format_line(result)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        self.written += 1;
        debug!(path = %self.path.display(), "Finding logged");
        Ok(())
    }

    async fn finish(&mut self, _outcome: &ScanOutcome) -> Result<Option<PathBuf>, ScanError> {
        Ok((self.written > 0).then(|| self.path.clone()))
    }

    fn name(&self) -> &str { "finding-log" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::fixtures::vulnerable_result;
    use tempfile::TempDir;

    #[test]
    fn test_line_shape() {
        let line = FindingLog::format_line(&vulnerable_result("http://h", "admin")).unwrap();
        let (stamp, json) = line.trim_end().split_once(" - ").unwrap();
        assert_eq!(stamp.len(), "YYYY-MM-DD HH:MM:SS".len());
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["url"], "http://h");
        assert_eq!(value["template"], "demo-admin");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["category"], "cms");
        assert_eq!(value["verdict"], "vulnerable");
    }

    #[tokio::test]
    async fn test_appends_one_line_per_finding() {
        let dir = TempDir::new().unwrap();
        let mut log = FindingLog::new(&dir.path().join("logs"));
        log.record(&vulnerable_result("http://a", "admin")).await.unwrap();
        log.record(&vulnerable_result("http://b", "admin")).await.unwrap();

        let path = log.finish(&ScanOutcome::default()).await.unwrap().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().next().unwrap().contains("\"url\":\"http://a\""));
        assert!(path.file_name().unwrap().to_string_lossy().ends_with(".log"));
    }

    #[tokio::test]
    async fn test_no_findings_no_file() {
        let dir = TempDir::new().unwrap();
        let mut log = FindingLog::new(dir.path());
        assert!(log.finish(&ScanOutcome::default()).await.unwrap().is_none());
        assert!(!log.path().exists());
    }
}
