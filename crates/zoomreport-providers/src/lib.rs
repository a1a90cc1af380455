//! Zoom reporting client and Google Drive/Sheets publisher.
//!
//! - [`zoom`] - bearer token generation and paginated participant reports
//! - [`google`] - service account auth, folder lookup, spreadsheet creation
//! - [`ProviderError`] - error type shared by both
//!
//! # Pipeline
//!
//! ```text
//! ZoomTokenProvider ──token──▶ ZoomClient (ParticipantSource)
//!                                   │ fetch_all_participants()
//!                                   ▼
//!                        Vec<ParticipantSession>
//!                                   │ zoomreport_core::aggregate()
//!                                   ▼
//!                              ReportTable
//!                                   │ ReportPublisher::publish()
//!                                   ▼
//!                        DriveClient ──▶ webViewLink
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod error;
pub mod google;
pub mod http;
pub mod zoom;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use google::{
    DriveClient, GoogleConfig, PublishRequest, ReportPublisher, ServiceAccountAuth, ServiceAccountKey,
};
pub use http::HttpSettings;
pub use zoom::{ParticipantPage, ParticipantSource, ZoomClient, fetch_all_participants};

/// A boxed future, so the provider traits stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
