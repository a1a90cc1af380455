//! The report pipeline: token, fetch, aggregate, publish.
//!
//! [`build_report`] and [`publish_report`] take their remote ends as trait
//! objects so they can run against stubs; [`execute`] wires them to Zoom and
//! Google using the configuration.

use tracing::{debug, info};

use zoomreport_core::{ReportTable, aggregate, report_title};
use zoomreport_providers::zoom::ZoomTokenProvider;
use zoomreport_providers::{
    DriveClient, HttpSettings, ParticipantSource, PublishRequest, ReportPublisher,
    ServiceAccountAuth, ServiceAccountKey, ZoomClient, fetch_all_participants,
};

use crate::config::{ClientConfig, ResolvedGoogle, ResolvedReport};
use crate::error::{ReportError, ReportResult};

/// An aggregated, rendered report that has not been published yet.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltReport {
    pub title: String,
    pub table: ReportTable,
}

/// Fetches every session of a meeting and renders the attendance table.
///
/// # Errors
///
/// Returns [`ReportError::EmptyResult`] when the meeting had no participants.
pub async fn build_report(
    source: &dyn ParticipantSource,
    meeting_id: &str,
    report: &ResolvedReport,
) -> ReportResult<BuiltReport> {
    let sessions = fetch_all_participants(source, meeting_id)
        .await
        .map_err(ReportError::fetch)?;

    let summaries = aggregate(&sessions, &report.options);
    info!(
        "aggregated {} sessions into {} participants",
        sessions.len(),
        summaries.len()
    );

    let title = report_title(&summaries, &report.timezone, &report.title_prefix)
        .map_err(|e| ReportError::core(e, meeting_id))?;
    let table = ReportTable::render(&summaries, &report.timezone, &report.labels);

    Ok(BuiltReport { title, table })
}

/// Publishes a built report into `folder` and returns the share link.
pub async fn publish_report(
    publisher: &dyn ReportPublisher,
    built: BuiltReport,
    folder: &str,
) -> ReportResult<String> {
    let request = PublishRequest {
        folder_name: folder.to_string(),
        title: built.title,
        rows: built.table.rows,
    };
    debug!(
        "publishing '{}' ({} rows) to folder '{}'",
        request.title,
        request.rows.len(),
        request.folder_name
    );
    publisher
        .publish(&request)
        .await
        .map_err(ReportError::publish)
}

/// Runs the whole pipeline from configuration.
///
/// With `dry_run` the rendered table is printed as tab separated text and
/// Google is never contacted.
pub async fn execute(config: &ClientConfig, dry_run: bool) -> ReportResult<()> {
    let zoom = config.zoom.resolve()?;
    let report = config.report.resolve()?;
    let http = config.http.resolve()?;
    // [google] is checked before any Zoom call.
    let google = if dry_run {
        None
    } else {
        Some(config.google.resolve()?)
    };

    let token = ZoomTokenProvider::new(zoom.credentials)
        .with_ttl(zoom.token_ttl)
        .generate()
        .map_err(ReportError::fetch)?;
    let client = ZoomClient::new(&zoom.base_url, token, &http).map_err(ReportError::fetch)?;

    let built = build_report(&client, &zoom.meeting_id, &report).await?;

    match google {
        None => {
            println!("# {}", built.title);
            println!("{}", built.table.to_tsv());
        }
        Some(google) => {
            let publisher = drive_client(&google, &http).await?;
            let link = publish_report(&publisher, built, &google.folder).await?;
            println!("report ready: {}", link);
        }
    }
    Ok(())
}

async fn drive_client(google: &ResolvedGoogle, http: &HttpSettings) -> ReportResult<DriveClient> {
    let key = ServiceAccountKey::from_file(&google.service_account_file)
        .map_err(ReportError::publish)?;
    let auth = ServiceAccountAuth::new(key, http).map_err(ReportError::publish)?;
    let access_token = auth
        .access_token(&google.config.scopes)
        .await
        .map_err(ReportError::publish)?;
    DriveClient::new(access_token, &google.config, http).map_err(ReportError::publish)
}
