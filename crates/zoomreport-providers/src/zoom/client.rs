//! Zoom reporting API client.
//!
//! Fetches one page of the past-meeting participants report at a time and
//! validates every record into a [`ParticipantSession`].

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use zoomreport_core::ParticipantSession;

use crate::BoxFuture;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{self, HttpSettings, require};

use super::{ParticipantPage, ParticipantSource};

/// Base URL for Zoom API v2.
pub const ZOOM_API_BASE: &str = "https://api.zoom.us/v2";

/// Records requested per page.
pub const PAGE_SIZE: u32 = 300;

/// Longest session duration accepted from the API (31 days).
pub const MAX_SESSION_SECONDS: i64 = 31 * 24 * 3600;

/// HTTP client for the Zoom reporting API.
#[derive(Debug)]
pub struct ZoomClient {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl ZoomClient {
    /// Creates a client that authenticates with `access_token`.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        settings: &HttpSettings,
    ) -> ProviderResult<Self> {
        Ok(Self {
            http_client: settings.build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Returns the participants report URL for a meeting.
    pub fn participants_url(&self, meeting_id: &str) -> String {
        format!(
            "{}/report/meetings/{}/participants",
            self.base_url,
            encode_meeting_id(meeting_id)
        )
    }

    async fn get_page(
        &self,
        meeting_id: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<ParticipantPage> {
        let mut request = self
            .http_client
            .get(self.participants_url(meeting_id))
            .bearer_auth(&self.access_token)
            .query(&[("page_size", PAGE_SIZE)]);

        if let Some(token) = page_token {
            request = request.query(&[("next_page_token", token)]);
        }

        let body = http::send(request, "report/meetings/participants")
            .await
            .map_err(|e| e.with_provider("zoom"))?;
        let page = parse_page(&body).map_err(|e| e.with_provider("zoom"))?;

        debug!(
            "fetched {} participant sessions for meeting {}",
            page.sessions.len(),
            meeting_id
        );
        Ok(page)
    }
}

impl ParticipantSource for ZoomClient {
    fn fetch_page<'a>(
        &'a self,
        meeting_id: &'a str,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<ParticipantPage>> {
        Box::pin(self.get_page(meeting_id, page_token))
    }
}

/// Percent-encodes a meeting id for use as a path segment.
///
/// Meeting UUIDs that start with `/` or contain `//` must be encoded twice.
pub fn encode_meeting_id(meeting_id: &str) -> String {
    let once = urlencoding::encode(meeting_id).into_owned();
    if meeting_id.starts_with('/') || meeting_id.contains("//") {
        urlencoding::encode(&once).into_owned()
    } else {
        once
    }
}

/// Parses and validates one report page.
fn parse_page(body: &str) -> ProviderResult<ParticipantPage> {
    const WHAT: &str = "participants report";

    let response: ParticipantsResponse = http::parse_json(body, WHAT)?;
    let participants = require(response.participants, "participants", WHAT)?;

    let sessions = participants
        .into_iter()
        .enumerate()
        .map(|(index, p)| convert_participant(p, index))
        .collect::<ProviderResult<Vec<_>>>()?;

    Ok(ParticipantPage {
        sessions,
        next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
    })
}

/// Converts an API record, failing on any missing or malformed field.
fn convert_participant(p: ApiParticipant, index: usize) -> ProviderResult<ParticipantSession> {
    let what = format!("participant #{}", index);

    let participant_id = require(p.id, "id", &what)?;
    let name = require(p.name, "name", &what)?;
    let join_time = parse_time(require(p.join_time, "join_time", &what)?, "join_time", &what)?;
    let leave_time = parse_time(require(p.leave_time, "leave_time", &what)?, "leave_time", &what)?;
    let duration_seconds = require(p.duration, "duration", &what)?;
    if !(0..=MAX_SESSION_SECONDS).contains(&duration_seconds) {
        return Err(ProviderError::invalid_response(format!(
            "{}: duration {} out of range 0..={}",
            what, duration_seconds, MAX_SESSION_SECONDS
        )));
    }

    Ok(ParticipantSession::new(
        participant_id,
        name,
        join_time,
        leave_time,
        duration_seconds,
    ))
}

fn parse_time(value: String, field: &str, what: &str) -> ProviderResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            ProviderError::invalid_response(format!(
                "{}: invalid {} '{}': {}",
                what, field, value, e
            ))
        })
}

/// Response from the report/meetings/{id}/participants endpoint.
#[derive(Debug, Deserialize)]
struct ParticipantsResponse {
    participants: Option<Vec<ApiParticipant>>,
    next_page_token: Option<String>,
}

/// A participant record. `attentiveness_score` and other extras are ignored.
#[derive(Debug, Deserialize)]
struct ApiParticipant {
    id: Option<String>,
    name: Option<String>,
    join_time: Option<String>,
    leave_time: Option<String>,
    duration: Option<i64>,
}
