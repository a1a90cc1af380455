//! Zoom reporting API.
//!
//! - [`ZoomTokenProvider`] signs the bearer token
//! - [`ZoomClient`] fetches single pages of the participants report
//! - [`fetch_all_participants`] follows pagination cursors to the end
//!
//! ```ignore
//! let token = ZoomTokenProvider::new(credentials).generate()?;
//! let client = ZoomClient::new(ZOOM_API_BASE, token, &HttpSettings::default())?;
//! let sessions = fetch_all_participants(&client, "85746065432").await?;
//! ```

mod client;
mod token;

use tracing::{debug, info};

use zoomreport_core::ParticipantSession;

use crate::BoxFuture;
use crate::error::{ProviderError, ProviderResult};

pub use client::{MAX_SESSION_SECONDS, PAGE_SIZE, ZOOM_API_BASE, ZoomClient, encode_meeting_id};
pub use token::{ZoomClaims, ZoomCredentials, ZoomTokenProvider};

/// One page of participant sessions.
#[derive(Debug, Clone, Default)]
pub struct ParticipantPage {
    /// Sessions in server order.
    pub sessions: Vec<ParticipantSession>,
    /// Cursor for the next page. `None` on the last page.
    pub next_page_token: Option<String>,
}

/// A paginated source of participant sessions.
pub trait ParticipantSource: Send + Sync {
    /// Fetches the page identified by `page_token`, or the first page.
    fn fetch_page<'a>(
        &'a self,
        meeting_id: &'a str,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<ParticipantPage>>;
}

/// Fetches every page for a meeting and concatenates them in page order.
///
/// Stops when a page carries no next-page token (an empty token counts as
/// none). Any page error aborts the whole fetch, as does a page that hands
/// back the token it was requested with.
pub async fn fetch_all_participants(
    source: &dyn ParticipantSource,
    meeting_id: &str,
) -> ProviderResult<Vec<ParticipantSession>> {
    let mut sessions = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.fetch_page(meeting_id, page_token.as_deref()).await?;
        pages += 1;
        debug!("page {} returned {} sessions", pages, page.sessions.len());
        sessions.extend(page.sessions);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                return Err(ProviderError::invalid_response(format!(
                    "page {} repeated next_page_token '{}'",
                    pages, token
                )));
            }
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(
        "fetched {} sessions in {} page(s) for meeting {}",
        sessions.len(),
        pages,
        meeting_id
    );
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    /// Serves canned pages and records the tokens it was asked for.
    struct StubSource {
        pages: Vec<ProviderResult<ParticipantPage>>,
        requested: Mutex<Vec<Option<String>>>,
    }

    impl StubSource {
        fn new(pages: Vec<ProviderResult<ParticipantPage>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl ParticipantSource for StubSource {
        fn fetch_page<'a>(
            &'a self,
            _meeting_id: &'a str,
            page_token: Option<&'a str>,
        ) -> BoxFuture<'a, ProviderResult<ParticipantPage>> {
            let mut requested = self.requested.lock().unwrap();
            let index = requested.len();
            requested.push(page_token.map(String::from));
            let result = match &self.pages[index] {
                Ok(page) => Ok(page.clone()),
                Err(e) => Err(ProviderError::new(e.code(), e.message())),
            };
            Box::pin(async move { result })
        }
    }

    fn session(name: &str) -> ParticipantSession {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 15, 0, 0).unwrap();
        ParticipantSession::new("id", name, t, t, 60)
    }

    fn page(names: &[&str], next: Option<&str>) -> ProviderResult<ParticipantPage> {
        Ok(ParticipantPage {
            sessions: names.iter().map(|n| session(n)).collect(),
            next_page_token: next.map(String::from),
        })
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let source = StubSource::new(vec![
            page(&["A", "B"], Some("t2")),
            page(&["C"], None),
        ]);
        let sessions = fetch_all_participants(&source, "m").await.unwrap();

        let names: Vec<_> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![None, Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_token_ends_pagination() {
        let source = StubSource::new(vec![page(&["A"], Some(""))]);
        let sessions = fetch_all_participants(&source, "m").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(source.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_pages_are_followed() {
        let source = StubSource::new(vec![
            page(&[], Some("t2")),
            page(&[], Some("t3")),
            page(&["A"], None),
        ]);
        let sessions = fetch_all_participants(&source, "m").await.unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn repeated_token_aborts() {
        let source = StubSource::new(vec![
            page(&["A"], Some("t2")),
            page(&["B"], Some("t2")),
            page(&["C"], None),
        ]);
        let err = fetch_all_participants(&source, "m").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert!(err.message().contains("t2"));
        assert_eq!(source.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn error_on_later_page_discards_partial_result() {
        let source = StubSource::new(vec![
            page(&["A"], Some("t2")),
            Err(ProviderError::server("boom")),
        ]);
        let err = fetch_all_participants(&source, "m").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
    }
}
