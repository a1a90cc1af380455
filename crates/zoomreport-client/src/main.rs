//! zoomreport CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use zoomreport_client::cli::{Cli, Command, ConfigAction};
use zoomreport_client::commands;
use zoomreport_client::config::ClientConfig;
use zoomreport_client::error::ReportResult;
use zoomreport_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = TracingConfig::cli(cli.debug).with_format(cli.log_format.into());
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("run failed: {:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ReportResult<()> {
    let (config, path) = match cli.config {
        Some(ref path) => (ClientConfig::load_from(path)?, path.clone()),
        None => (ClientConfig::load()?, ClientConfig::default_path()),
    };
    let config = config.with_overrides(cli.meeting_id, cli.rubric, cli.folder);

    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
        Some(Command::Report) | None => commands::report::execute(&config, cli.dry_run).await,
    }
}
