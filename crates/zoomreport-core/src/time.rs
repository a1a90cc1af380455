//! Report timezone handling.
//!
//! Session times arrive as UTC instants. Reports show them as local wall
//! clock times in a single configured zone, converted with the IANA rules
//! from `chrono-tz` so that daylight saving changes are respected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::CoreError;

/// Wall clock pattern used in report cells.
pub const REPORT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The timezone report times are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTimezone(Tz);

impl ReportTimezone {
    /// Default report zone name.
    pub const DEFAULT_NAME: &'static str = "US/Central";

    /// Wraps a `chrono-tz` zone.
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the IANA name of the zone.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Formats an instant as `YYYY-MM-DD HH:MM:SS` local time.
    pub fn format_local(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.0)
            .format(REPORT_DATETIME_FORMAT)
            .to_string()
    }

    /// Returns the local calendar date of an instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }
}

impl Default for ReportTimezone {
    fn default() -> Self {
        Self(chrono_tz::US::Central)
    }
}

impl FromStr for ReportTimezone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|e| CoreError::invalid_timezone(s, e.to_string()))
    }
}

impl fmt::Display for ReportTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
