//! Configuration commands.

use std::path::Path;

use zoomreport_providers::ServiceAccountKey;

use crate::config::ClientConfig;
use crate::error::{ReportError, ReportResult};

/// Dump the effective configuration to stdout. Secret references are
/// printed as written, never resolved.
pub fn dump(config: &ClientConfig, path: &Path) -> ReportResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ReportError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration: resolve secrets, parse the timezone, check
/// the rubric, and load the service account key.
pub fn validate(config: &ClientConfig) -> ReportResult<()> {
    let zoom = config.zoom.resolve()?;
    println!("Zoom credentials resolved (meeting {}).", zoom.meeting_id);

    let report = config.report.resolve()?;
    println!(
        "Report: rubric {} min, timezone {}.",
        report.options.rubric_minutes, report.timezone
    );

    let google = config.google.resolve()?;
    let key = ServiceAccountKey::from_file(&google.service_account_file)
        .map_err(|e| ReportError::Config(e.to_string()))?;
    println!("Google service account {} loaded.", key.client_email);

    config.http.resolve()?;

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ReportResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
