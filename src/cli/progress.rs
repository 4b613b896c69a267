use std::time::Duration;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use crate::models::ProbeResult;

/// Probe-level progress bar. Hidden in quiet mode, where findings still print.
pub struct ScanProgress {
    bar: ProgressBar,
    findings: usize,
}

impl ScanProgress {
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(total as u64)
        };
        let bar_style = ProgressStyle::with_template(
            "  {spinner:.cyan} {bar:30.cyan/dark_gray} {pos}/{len} probes | {elapsed_precise} | {msg}",
        )
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(bar_style);
        bar.set_message("0 findings");
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar, findings: 0 }
    }

    pub fn record(&mut self, result: &ProbeResult) {
        if result.is_vulnerable() {
            self.findings += 1;
            self.bar.set_message(format!("{} findings", self.findings));
            let line = format_finding(result);
            if self.bar.is_hidden() {
                println!("{}", line);
            } else {
                self.bar.println(line);
            }
        }
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// `[VULN] <url> - <name> (<severity>)`
pub fn format_finding(result: &ProbeResult) -> String {
    let info = &result.template.info;
    format!(
        "{} {} - {} ({})",
        style("[VULN]").red().bold(),
        result.url,
        style(&info.name).bold(),
        info.severity
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::template::parse_template_str;

    #[test]
    fn test_finding_line() {
        console::set_colors_enabled(false);
        let yaml = "info:\n  name: Exposed panel\n  severity: critical\nhttp:\n  - path: '{{BaseURL}}/'\n";
        let template = Arc::new(parse_template_str(yaml, "panel", None).unwrap());
        let result = ProbeResult::aborted(template, "http://h".into(), "x");
        assert_eq!(format_finding(&result), "[VULN] http://h - Exposed panel (critical)");
    }

    #[test]
    fn test_quiet_progress_counts() {
        let mut progress = ScanProgress::new(2, true);
        let yaml = "http:\n  - path: '{{BaseURL}}/'\n";
        let template = Arc::new(parse_template_str(yaml, "t", None).unwrap());
        progress.record(&ProbeResult::aborted(template, "http://h".into(), "x"));
        assert_eq!(progress.findings, 0);
        assert_eq!(progress.bar.position(), 1);
        progress.finish();
    }
}
