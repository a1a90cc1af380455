//! Endpoints and scopes for the Drive publisher.

/// Base URL for the Drive v3 API.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for the Sheets v4 API.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Scopes requested by default: full Drive access for the folder lookup and
/// per-file access for the sheets we create.
pub const DEFAULT_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
];

/// Where and with which scopes the publisher talks to Google.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    /// Drive API base, without trailing slash.
    pub drive_base: String,
    /// Sheets API base, without trailing slash.
    pub sheets_base: String,
    /// OAuth scopes requested for the access token.
    pub scopes: Vec<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            drive_base: DRIVE_API_BASE.to_string(),
            sheets_base: SHEETS_API_BASE.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GoogleConfig {
    /// Sets the Drive API base URL.
    pub fn with_drive_base(mut self, base: impl Into<String>) -> Self {
        self.drive_base = base.into();
        self
    }

    /// Sets the Sheets API base URL.
    pub fn with_sheets_base(mut self, base: impl Into<String>) -> Self {
        self.sheets_base = base.into();
        self
    }

    /// Replaces the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.scopes.is_empty() {
            return Err("at least one scope is required".to_string());
        }
        for (field, base) in [("drive_base", &self.drive_base), ("sheets_base", &self.sheets_base)] {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(format!("{} must be an http(s) URL, got '{}'", field, base));
            }
        }
        Ok(())
    }
}
