//! Attendance aggregation.
//!
//! This module folds raw [`ParticipantSession`]s into one
//! [`AttendanceSummary`] per display name:
//!
//! 1. Sessions are ordered by `(participant_id, name, join_time)`
//! 2. Sessions are grouped by `name` only, so reconnects under a new
//!    participant id still count towards the same person
//! 3. Each group sums its durations and keeps the earliest join and latest leave
//! 4. The total is converted to minutes (2 decimals) and classified against
//!    the rubric
//!
//! Groups are emitted in lexicographic (byte) order of the name.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::ParticipantSession;

/// Whether a participant attended long enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Attended at least the rubric.
    Present,
    /// Attended less than the rubric.
    Insufficient,
}

impl AttendanceStatus {
    /// Classifies a total against the rubric. The boundary is inclusive.
    pub fn classify(total_minutes: f64, rubric_minutes: f64) -> Self {
        if total_minutes >= rubric_minutes {
            Self::Present
        } else {
            Self::Insufficient
        }
    }
}

/// Options controlling the aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationOptions {
    /// Minimum attended minutes for [`AttendanceStatus::Present`].
    pub rubric_minutes: f64,
}

impl AggregationOptions {
    /// Creates options with the given rubric.
    pub fn new(rubric_minutes: f64) -> Self {
        Self { rubric_minutes }
    }
}

/// One consolidated row per participant name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    /// Display name (grouping key).
    pub name: String,
    /// Sum of all session durations, in seconds.
    pub total_seconds: i64,
    /// `total_seconds` in minutes, rounded to 2 decimals.
    pub total_minutes: f64,
    /// Earliest join across the name's sessions.
    pub first_join: DateTime<Utc>,
    /// Latest leave across the name's sessions.
    pub last_leave: DateTime<Utc>,
    /// Classification against the rubric.
    pub status: AttendanceStatus,
}

/// Running totals for a single name.
struct Accumulator {
    total_seconds: i64,
    first_join: DateTime<Utc>,
    last_leave: DateTime<Utc>,
}

impl Accumulator {
    fn new(session: &ParticipantSession) -> Self {
        Self {
            total_seconds: session.duration_seconds,
            first_join: session.join_time,
            last_leave: session.leave_time,
        }
    }

    fn add(&mut self, session: &ParticipantSession) {
        self.total_seconds = self.total_seconds.saturating_add(session.duration_seconds);
        self.first_join = self.first_join.min(session.join_time);
        self.last_leave = self.last_leave.max(session.leave_time);
    }

    fn finish(self, name: &str, rubric_minutes: f64) -> AttendanceSummary {
        let total_minutes = seconds_to_minutes(self.total_seconds);
        AttendanceSummary {
            name: name.to_string(),
            total_seconds: self.total_seconds,
            total_minutes,
            first_join: self.first_join,
            last_leave: self.last_leave,
            status: AttendanceStatus::classify(total_minutes, rubric_minutes),
        }
    }
}

/// Aggregates raw sessions into one summary per distinct name.
///
/// This is a pure function of its input: the result does not depend on the
/// order of `sessions`.
pub fn aggregate(
    sessions: &[ParticipantSession],
    options: &AggregationOptions,
) -> Vec<AttendanceSummary> {
    let mut ordered: Vec<&ParticipantSession> = sessions.iter().collect();
    ordered.sort_by(|a, b| {
        (a.participant_id.as_str(), a.name.as_str(), a.join_time).cmp(&(
            b.participant_id.as_str(),
            b.name.as_str(),
            b.join_time,
        ))
    });

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for session in ordered {
        groups
            .entry(session.name.as_str())
            .and_modify(|acc| acc.add(session))
            .or_insert_with(|| Accumulator::new(session));
    }

    debug!(
        "aggregated {} sessions into {} participants",
        sessions.len(),
        groups.len()
    );

    groups
        .into_iter()
        .map(|(name, acc)| acc.finish(name, options.rubric_minutes))
        .collect()
}

/// Converts seconds to minutes rounded to 2 decimals.
///
/// The division is done on integer hundredths with round-half-to-even, so the
/// result does not carry binary floating point drift from the division.
/// Hundredths are computed in `i128`, so every `i64` input is accepted.
pub fn seconds_to_minutes(seconds: i64) -> f64 {
    let hundredths = div_round_half_even(i128::from(seconds) * 100, 60);
    hundredths as f64 / 100.0
}

/// Integer division rounding to nearest, ties to even. `denominator` must be positive.
fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let twice_remainder = 2 * numerator.rem_euclid(denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}
