use std::path::PathBuf;
use std::sync::Arc;
use chrono::Local;
use console::style;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::cli::commands::ScanArgs;
use crate::cli::progress::ScanProgress;
use crate::config::{self, ProxyConfig, ScanConfig};
use crate::engine::{ReqwestTransport, ScanCoordinator, ScanOutcome};
use crate::errors::ScanError;
use crate::reporting::{FindingLog, HtmlReport, JsonReport, ResultSink};
use crate::targets::load_targets;
use crate::template::TemplateLibrary;
use crate::utils::format_duration;
use tracing::{info, warn};

pub async fn handle_scan(args: ScanArgs, quiet: bool) -> Result<(), ScanError> {
    let scan_id = uuid::Uuid::new_v4();
    let started_at = Local::now();
    let clock = std::time::Instant::now();

    let file_config = match &args.config {
        Some(path) => Some(config::parse_config(path).await?),
        None => None,
    };
    let scan_config = Arc::new(build_scan_config(&args, file_config)?);

    let urls = load_targets(&args.url).await?;
    let library = TemplateLibrary::load(&args.pocs)?;
    for skipped in &library.skipped {
        eprintln!("{} {}: {}", style("[SKIP]").yellow(), skipped.path.display(), skipped.error);
    }
    if library.is_empty() {
        return Err(match library.skipped.into_iter().next() {
            Some(skipped) => skipped.error,
            None => ScanError::Config("No POC templates found".into()),
        });
    }

    info!(
        scan_id = %scan_id,
        templates = library.len(),
        targets = urls.len(),
        threads = scan_config.threads,
        timeout_secs = scan_config.request_timeout().as_secs_f64(),
        "Scan configured"
    );

    let transport = Arc::new(ReqwestTransport::new(&scan_config)?);
    let cancel_token = CancellationToken::new();
    let coordinator = ScanCoordinator::new(scan_config.clone(), transport)
        .with_cancel_token(cancel_token.clone());

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, no new probes will start");
            cancel_token.cancel();
        }
    });

    let mut sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(FindingLog::new(&args.log_dir))];
    if !args.no_report {
        sinks.push(Box::new(HtmlReport::new(&args.report_dir, started_at)));
    }
    if args.json {
        sinks.push(Box::new(JsonReport::new(&args.report_dir)));
    }

    let mut progress = ScanProgress::new(library.len() * urls.len(), quiet);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let scan = coordinator.run_streaming(&library.templates, &urls, tx);
    let consume = async {
        while let Some(result) = rx.recv().await {
            progress.record(&result);
            if !result.is_vulnerable() {
                continue;
            }
            for sink in sinks.iter_mut() {
                if let Err(e) = sink.record(&result).await {
                    warn!(sink = sink.name(), error = %e, "Failed to record finding");
                }
            }
        }
    };
    let (outcome, ()) = tokio::join!(scan, consume);
    progress.finish();
    interrupt.abort();

    let mut written = Vec::new();
    for sink in sinks.iter_mut() {
        match sink.finish(&outcome).await {
            Ok(Some(path)) => written.push(path),
            Ok(None) => {}
            Err(e) => warn!(sink = sink.name(), error = %e, "Failed to finalize output"),
        }
    }

    print_summary(&outcome, &written, clock.elapsed());
    Ok(())
}

/// Config file values (or defaults) with command-line overrides applied on top.
pub fn build_scan_config(args: &ScanArgs, file_config: Option<ScanConfig>) -> Result<ScanConfig, ScanError> {
    let mut scan_config = file_config.unwrap_or_default();

    if let Some(threads) = args.threads {
        scan_config.threads = threads;
    }
    if let Some(timeout) = args.timeout {
        scan_config.timeout = Some(timeout);
    }
    if let Some(proxy) = &args.proxy {
        scan_config.proxy = Some(ProxyConfig::both(proxy));
    }
    for line in &args.headers {
        let (name, value) = line.split_once(':')
            .ok_or_else(|| ScanError::Config(format!("Header must be \"Name: value\", got {:?}", line)))?;
        let name = name.trim();
        scan_config.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        scan_config.headers.insert(name.to_string(), value.trim().to_string());
    }

    config::validate_config(&scan_config)?;
    Ok(scan_config)
}

fn print_summary(outcome: &ScanOutcome, written: &[PathBuf], elapsed: std::time::Duration) {
    let counts = outcome.count_by_verdict();
    let count = |label: &str| counts.get(label).copied().unwrap_or(0);

    println!();
    println!("{}", style("Scan summary").bold());
    println!("  Probes:         {}/{}", outcome.results.len(), outcome.total_pairs);
    println!("  Vulnerable:     {}", style(count("vulnerable")).red().bold());
    println!("  Not vulnerable: {}", count("not-vulnerable"));
    println!("  Inconclusive:   {}", count("inconclusive"));
    println!("  Errors:         {}", count("error"));
    println!("  Duration:       {}", format_duration(elapsed));
    if outcome.cancelled {
        println!("  {}", style("Scan was interrupted before all probes were submitted").yellow());
    }
    for path in written {
        println!("  Output:         {}", path.display());
    }
}
