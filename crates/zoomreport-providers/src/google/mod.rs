//! Google Drive/Sheets publishing.
//!
//! A run authenticates once with [`ServiceAccountAuth`], then hands the
//! resulting token to a [`DriveClient`] which implements [`ReportPublisher`].

mod config;
mod drive;
mod service_account;

use zoomreport_core::Cell;

use crate::BoxFuture;
use crate::error::ProviderResult;

pub use config::{DEFAULT_SCOPES, DRIVE_API_BASE, GoogleConfig, SHEETS_API_BASE};
pub use drive::{DriveClient, FOLDER_MIME_TYPE, SPREADSHEET_MIME_TYPE, escape_query_literal};
pub use service_account::{AssertionClaims, GOOGLE_TOKEN_URL, ServiceAccountAuth, ServiceAccountKey};

/// Everything needed to publish one report.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    /// Exact name of the destination folder.
    pub folder_name: String,
    /// Title of the spreadsheet to create.
    pub title: String,
    /// Header row followed by data rows.
    pub rows: Vec<Vec<Cell>>,
}

/// Publishes a rendered report and returns its share link.
pub trait ReportPublisher: Send + Sync {
    fn publish<'a>(&'a self, request: &'a PublishRequest) -> BoxFuture<'a, ProviderResult<String>>;
}
