//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/zoomreport/config.toml` by default.
//!
//! Credential values (`api_key`, `api_secret`) support secret references, see
//! [`crate::secret`]. Nothing is resolved at load time; each section has a
//! `resolve` method that turns it into the typed values a run needs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use zoomreport_core::{AggregationOptions, ReportLabels, ReportTimezone};
use zoomreport_providers::google::{DEFAULT_SCOPES, DRIVE_API_BASE, GoogleConfig, SHEETS_API_BASE};
use zoomreport_providers::zoom::{ZOOM_API_BASE, ZoomCredentials, ZoomTokenProvider};
use zoomreport_providers::HttpSettings;

use crate::error::{ReportError, ReportResult};
use crate::secret;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the zoomreport client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Zoom credentials and meeting.
    pub zoom: ZoomSettings,

    /// Google service account and destination folder.
    pub google: GoogleSettings,

    /// Aggregation and rendering.
    pub report: ReportSettings,

    /// HTTP client settings.
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> ReportResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ReportError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zoomreport")
            .join("config.toml")
    }

    /// Applies command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        meeting_id: Option<String>,
        rubric_minutes: Option<f64>,
        folder: Option<String>,
    ) -> Self {
        if meeting_id.is_some() {
            self.zoom.meeting_id = meeting_id;
        }
        if let Some(rubric) = rubric_minutes {
            self.report.rubric_minutes = rubric;
        }
        if folder.is_some() {
            self.google.folder = folder;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// [zoom]
// ---------------------------------------------------------------------------

/// Zoom reporting API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    /// API key (supports secret references).
    pub api_key: Option<String>,

    /// API secret (supports secret references).
    pub api_secret: Option<String>,

    /// Meeting id or UUID to report on.
    pub meeting_id: Option<String>,

    /// Zoom API base, pointed elsewhere in tests.
    pub base_url: String,

    /// Bearer token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            meeting_id: None,
            base_url: ZOOM_API_BASE.to_string(),
            token_ttl_secs: ZoomTokenProvider::DEFAULT_TTL_SECS,
        }
    }
}

/// Zoom settings with secrets resolved.
#[derive(Debug, Clone)]
pub struct ResolvedZoom {
    pub credentials: ZoomCredentials,
    pub meeting_id: String,
    pub base_url: String,
    pub token_ttl: chrono::Duration,
}

impl ZoomSettings {
    /// Resolves secret references and checks required fields.
    pub fn resolve(&self) -> ReportResult<ResolvedZoom> {
        let api_key = secret::resolve(required(&self.api_key, "zoom.api_key")?)?;
        let api_secret = secret::resolve(required(&self.api_secret, "zoom.api_secret")?)?;
        let credentials = ZoomCredentials::new(api_key, api_secret);
        credentials
            .validate()
            .map_err(|e| ReportError::Config(format!("zoom: {}", e)))?;

        let meeting_id = required(&self.meeting_id, "zoom.meeting_id")?.trim().to_string();

        if self.token_ttl_secs <= 0 {
            return Err(ReportError::Config(format!(
                "zoom.token_ttl_secs must be positive, got {}",
                self.token_ttl_secs
            )));
        }

        Ok(ResolvedZoom {
            credentials,
            meeting_id,
            base_url: self.base_url.clone(),
            token_ttl: chrono::Duration::seconds(self.token_ttl_secs),
        })
    }
}

// ---------------------------------------------------------------------------
// [google]
// ---------------------------------------------------------------------------

/// Google Drive publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Path to the service account JSON key. `~` is expanded.
    pub service_account_file: Option<String>,

    /// Exact name of the Drive folder receiving the report.
    pub folder: Option<String>,

    /// OAuth scopes requested for the access token.
    pub scopes: Vec<String>,

    /// Drive v3 API base.
    pub drive_base: String,

    /// Sheets v4 API base.
    pub sheets_base: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            service_account_file: None,
            folder: None,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            drive_base: DRIVE_API_BASE.to_string(),
            sheets_base: SHEETS_API_BASE.to_string(),
        }
    }
}

/// Google settings with paths expanded and endpoints checked.
#[derive(Debug, Clone)]
pub struct ResolvedGoogle {
    pub service_account_file: PathBuf,
    pub folder: String,
    pub config: GoogleConfig,
}

impl GoogleSettings {
    /// Expands the key path and validates the endpoints and scopes.
    pub fn resolve(&self) -> ReportResult<ResolvedGoogle> {
        let key_file = expand_home(required(&self.service_account_file, "google.service_account_file")?);
        let folder = required(&self.folder, "google.folder")?.to_string();

        let config = GoogleConfig::default()
            .with_drive_base(&self.drive_base)
            .with_sheets_base(&self.sheets_base)
            .with_scopes(self.scopes.clone());
        config
            .validate()
            .map_err(|e| ReportError::Config(format!("google: {}", e)))?;

        Ok(ResolvedGoogle {
            service_account_file: key_file,
            folder,
            config,
        })
    }
}

// ---------------------------------------------------------------------------
// [report]
// ---------------------------------------------------------------------------

/// Aggregation and rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Minimum attended minutes for a participant to count as present.
    pub rubric_minutes: f64,

    /// IANA timezone the report times are shown in.
    pub timezone: String,

    /// Prefix of the spreadsheet title; the meeting date is appended.
    pub title_prefix: String,

    /// Column headers and status labels.
    pub labels: ReportLabels,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            rubric_minutes: 40.0,
            timezone: ReportTimezone::DEFAULT_NAME.to_string(),
            title_prefix: "zoom_report_".to_string(),
            labels: ReportLabels::default(),
        }
    }
}

/// Report settings in their typed form.
#[derive(Debug, Clone)]
pub struct ResolvedReport {
    pub options: AggregationOptions,
    pub timezone: ReportTimezone,
    pub title_prefix: String,
    pub labels: ReportLabels,
}

impl ReportSettings {
    /// Parses the timezone and checks the rubric.
    pub fn resolve(&self) -> ReportResult<ResolvedReport> {
        if !self.rubric_minutes.is_finite() || self.rubric_minutes < 0.0 {
            return Err(ReportError::Config(format!(
                "report.rubric_minutes must be a non-negative number, got {}",
                self.rubric_minutes
            )));
        }
        let timezone = self
            .timezone
            .parse::<ReportTimezone>()
            .map_err(|e| ReportError::Config(format!("report.timezone: {}", e)))?;

        Ok(ResolvedReport {
            options: AggregationOptions::new(self.rubric_minutes),
            timezone,
            title_prefix: self.title_prefix.clone(),
            labels: self.labels.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// [http]
// ---------------------------------------------------------------------------

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent override.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: HttpSettings::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Converts to provider HTTP settings.
    pub fn resolve(&self) -> ReportResult<HttpSettings> {
        if self.timeout_secs == 0 {
            return Err(ReportError::Config("http.timeout_secs must be positive".to_string()));
        }
        let mut settings = HttpSettings::default().with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ref agent) = self.user_agent {
            settings = settings.with_user_agent(agent);
        }
        Ok(settings)
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> ReportResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ReportError::Config(format!("{} is required", field))),
    }
}
