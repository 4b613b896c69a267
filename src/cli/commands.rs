use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rwscan", version, about = "Template-driven HTTP vulnerability scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress banner and progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run POC templates against one or more targets
    Scan(ScanArgs),
    /// Check templates for errors without sending any request
    Validate(TemplateArgs),
    /// List the templates that load cleanly
    List(TemplateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    /// POC template files or directories (searched recursively)
    #[arg(short = 'p', long = "pocs", required = true, num_args = 1..)]
    pub pocs: Vec<PathBuf>,

    /// Target base URL, or a .txt file with one URL per line
    #[arg(short, long)]
    pub url: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of probes in flight at once
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Proxy URL used for both http and https
    #[arg(long)]
    pub proxy: Option<String>,

    /// Extra request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Directory for the HTML report
    #[arg(long, default_value = "report")]
    pub report_dir: PathBuf,

    /// Directory for the daily findings log
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Also write findings.json to the report directory
    #[arg(long)]
    pub json: bool,

    /// Skip the HTML report
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Args, Clone, Debug)]
pub struct TemplateArgs {
    /// Template files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}
