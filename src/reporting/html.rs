use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use crate::engine::ScanOutcome;
use crate::errors::ScanError;
use crate::models::ProbeResult;
use crate::utils::escape_html;
use super::{FindingRecord, ResultSink};
use tracing::{debug, info};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;background:#fafafa}\
h1{margin-bottom:0}.meta{color:#666}\
details{background:#fff;border:1px solid #ddd;border-radius:4px;margin:.5em 0;padding:.5em 1em}\
summary{cursor:pointer;font-weight:bold}\
pre{background:#f0f0f0;padding:.75em;overflow-x:auto;white-space:pre-wrap;word-break:break-all}\
.critical{color:#8b0000}.high{color:#d9534f}.medium{color:#f0ad4e}.low{color:#5bc0de}.info,.unknown{color:#777}";

/// Collects findings and renders one self-contained HTML page when the scan ends.
/// No findings means no report; a stale file at the same path is removed.
pub struct HtmlReport {
    path: PathBuf,
    started_at: DateTime<Local>,
    findings: Vec<FindingRecord>,
}

impl HtmlReport {
    pub fn new(report_dir: &Path, started_at: DateTime<Local>) -> Self {
        let file = format!("{}_scan_report.html", started_at.format("%Y-%m-%d_%H-%M-%S"));
        Self {
            path: report_dir.join(file),
            started_at,
            findings: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, outcome: &ScanOutcome) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Scan report {}</title>\n<style>{}</style>\n</head>\n<body>\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            STYLE
        );
        let _ = write!(
            html,
            "<h1>Vulnerability scan report</h1>\n<p class=\"meta\">Started {} &middot; {} probes &middot; {} findings{}</p>\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            outcome.results.len(),
            self.findings.len(),
            if outcome.cancelled { " &middot; cancelled" } else { "" }
        );

        for (n, finding) in self.findings.iter().enumerate() {
            let severity = escape_html(&finding.severity);
            let _ = write!(
                html,
                "<details>\n<summary>#{} <span class=\"{}\">[{}]</span> {} &ndash; {}</summary>\n\
                 <p>Template <code>{}</code> &middot; category {} &middot; detected {}</p>\n",
                n + 1,
                severity,
                severity.to_uppercase(),
                escape_html(&finding.name),
                escape_html(&finding.url),
                escape_html(&finding.template),
                escape_html(&finding.category),
                finding.detected_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            );
            for evidence in &finding.evidence {
                let _ = write!(html, "<h4>Step {}</h4>\n", evidence.step);
                if let Some(request) = &evidence.request {
                    let _ = write!(html, "<pre>{}</pre>\n", escape_html(request));
                }
                let _ = write!(html, "<pre>{}</pre>\n", escape_html(&evidence.response));
            }
            html.push_str("</details>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

#[async_trait]
impl ResultSink for HtmlReport {
    async fn record(&mut self, result: &ProbeResult) -> Result<(), ScanError> {
        self.findings.push(FindingRecord::from_result(result));
        Ok(())
    }

    async fn finish(&mut self, outcome: &ScanOutcome) -> Result<Option<PathBuf>, ScanError> {
        if self.findings.is_empty() {
            if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
                tokio::fs::remove_file(&self.path).await?;
            }
            debug!("No findings, HTML report skipped");
            return Ok(None);
        }

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.path, self.render(outcome)).await
            .map_err(|e| ScanError::Report(format!("Failed to write {}: {}", self.path.display(), e)))?;
        info!(path = %self.path.display(), findings = self.findings.len(), "HTML report written");
        Ok(Some(self.path.clone()))
    }

    fn name(&self) -> &str { "html" }
}
