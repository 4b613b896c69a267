use clap::Parser;
use rwscan::{cli, errors};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    if !cli.quiet {
        cli::banner::print_banner();
    }

    let result = match cli.command {
        cli::Commands::Scan(args) => cli::scan::handle_scan(args, cli.quiet).await,
        cli::Commands::Validate(args) => cli::templates::handle_validate(args).await,
        cli::Commands::List(args) => cli::templates::handle_list(args).await,
    };

    if let Err(e) = result {
        let classification: errors::ErrorClassification = e.classify();
        eprintln!("Error [{}]: {}", classification.error_type, e);
        std::process::exit(classification.exit_code);
    }
}
