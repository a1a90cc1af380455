//! Report rendering.
//!
//! Turns [`AttendanceSummary`] rows into the cell grid written to the
//! spreadsheet, and derives the report title from the meeting date.

use serde::{Deserialize, Serialize};

use crate::attendance::{AttendanceStatus, AttendanceSummary};
use crate::error::{CoreError, CoreResult};
use crate::time::ReportTimezone;

/// Column headers and status labels used in the rendered report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLabels {
    pub name: String,
    pub total_minutes: String,
    pub first_join: String,
    pub last_leave: String,
    pub status: String,
    /// Cell text for [`AttendanceStatus::Present`].
    pub present: String,
    /// Cell text for [`AttendanceStatus::Insufficient`].
    pub insufficient: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            total_minutes: "totalMinutes".to_string(),
            first_join: "firstJoin".to_string(),
            last_leave: "lastLeave".to_string(),
            status: "attendanceStatus".to_string(),
            present: "Present".to_string(),
            insufficient: "Insufficient".to_string(),
        }
    }
}

impl ReportLabels {
    /// Returns the header row in column order.
    pub fn header(&self) -> Vec<Cell> {
        [
            &self.name,
            &self.total_minutes,
            &self.first_join,
            &self.last_leave,
            &self.status,
        ]
        .into_iter()
        .map(|s| Cell::Text(s.clone()))
        .collect()
    }

    /// Returns the label for a status.
    pub fn status_label(&self, status: AttendanceStatus) -> &str {
        match status {
            AttendanceStatus::Present => &self.present,
            AttendanceStatus::Insufficient => &self.insufficient,
        }
    }
}

/// A single spreadsheet cell.
///
/// Serializes untagged, so numbers reach the sheet as numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// The rendered report: a header row followed by one row per participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    /// Renders summaries with times converted into `tz`.
    pub fn render(
        summaries: &[AttendanceSummary],
        tz: &ReportTimezone,
        labels: &ReportLabels,
    ) -> Self {
        let mut rows = Vec::with_capacity(summaries.len() + 1);
        rows.push(labels.header());
        rows.extend(summaries.iter().map(|s| {
            vec![
                Cell::Text(s.name.clone()),
                Cell::Number(s.total_minutes),
                Cell::Text(tz.format_local(s.first_join)),
                Cell::Text(tz.format_local(s.last_leave)),
                Cell::Text(labels.status_label(s.status).to_string()),
            ]
        }));
        Self { rows }
    }

    /// Number of participant rows, header excluded.
    pub fn participant_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Tab separated rendering, one line per row.
    pub fn to_tsv(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds the report title `{prefix}{YYYY-MM-DD}` from the first row's join.
///
/// The first row is the byte-order first name, not necessarily the earliest
/// join of the meeting; for a single-day meeting both give the same date.
///
/// # Errors
///
/// Returns [`CoreError::EmptyReport`] when there are no summaries.
pub fn report_title(
    summaries: &[AttendanceSummary],
    tz: &ReportTimezone,
    prefix: &str,
) -> CoreResult<String> {
    let first = summaries.first().ok_or(CoreError::EmptyReport)?;
    Ok(format!(
        "{}{}",
        prefix,
        tz.local_date(first.first_join).format("%Y-%m-%d")
    ))
}
