//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use zoomreport_core::TracingOutputFormat;

/// zoomreport - Zoom meeting attendance to a Google Sheet
#[derive(Debug, Parser)]
#[command(name = "zoomreport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ZOOMREPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, env = "ZOOMREPORT_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Meeting id or UUID (overrides zoom.meeting_id)
    #[arg(long, short = 'm')]
    pub meeting_id: Option<String>,

    /// Minimum attended minutes to count as present (overrides report.rubric_minutes)
    #[arg(long)]
    pub rubric: Option<f64>,

    /// Drive folder receiving the report (overrides google.folder)
    #[arg(long)]
    pub folder: Option<String>,

    /// Print the report as tab separated text instead of publishing it
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable single lines
    Compact,
    /// JSON lines
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Compact => TracingOutputFormat::Compact,
            LogFormat::Json => TracingOutputFormat::Json,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, aggregate, and publish the attendance report (default)
    Report,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration and resolve every secret
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_command_means_report() {
        let cli = Cli::try_parse_from(["zoomreport"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn log_format_selects_json() {
        let cli = Cli::try_parse_from(["zoomreport", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(TracingOutputFormat::from(cli.log_format), TracingOutputFormat::Json);
        assert!(Cli::try_parse_from(["zoomreport", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn overrides_parse() {
        let cli = Cli::try_parse_from([
            "zoomreport",
            "--meeting-id",
            "85746065432",
            "--rubric",
            "42.5",
            "--folder",
            "Zoom reports",
            "--dry-run",
            "report",
        ])
        .unwrap();
        assert_eq!(cli.meeting_id.as_deref(), Some("85746065432"));
        assert_eq!(cli.rubric, Some(42.5));
        assert_eq!(cli.folder.as_deref(), Some("Zoom reports"));
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Some(Command::Report)));
    }

    #[test]
    fn config_subcommands() {
        let cli = Cli::try_parse_from(["zoomreport", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        ));
    }

    #[test]
    fn rubric_must_be_numeric() {
        assert!(Cli::try_parse_from(["zoomreport", "--rubric", "forty"]).is_err());
    }
}
