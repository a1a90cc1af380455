//! Raw participant sessions as reported by the meeting service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One contiguous join-to-leave interval of a participant in a meeting.
///
/// A person who reconnects produces several sessions, possibly under a
/// different `participant_id`. The display `name` is what ties them together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSession {
    /// Upstream participant identifier. May be empty for some guests.
    pub participant_id: String,
    /// Display name.
    pub name: String,
    /// When the participant joined.
    pub join_time: DateTime<Utc>,
    /// When the participant left.
    pub leave_time: DateTime<Utc>,
    /// Length of this interval in seconds.
    pub duration_seconds: i64,
}

impl ParticipantSession {
    /// Creates a new session.
    pub fn new(
        participant_id: impl Into<String>,
        name: impl Into<String>,
        join_time: DateTime<Utc>,
        leave_time: DateTime<Utc>,
        duration_seconds: i64,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            name: name.into(),
            join_time,
            leave_time,
            duration_seconds,
        }
    }
}
