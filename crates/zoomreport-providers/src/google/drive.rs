//! Google Drive v3 / Sheets v4 client.
//!
//! Only the four calls the publisher needs: folder lookup by name,
//! spreadsheet creation, row append, and share link retrieval.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use zoomreport_core::Cell;

use crate::BoxFuture;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{self, HttpSettings, require};

use super::config::GoogleConfig;
use super::{PublishRequest, ReportPublisher};

/// MIME type of Drive folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME type of Google Sheets files.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Drive and Sheets client bound to one access token.
#[derive(Debug)]
pub struct DriveClient {
    http_client: Client,
    access_token: String,
    drive_base: String,
    sheets_base: String,
}

impl DriveClient {
    /// Creates a client using `access_token` and the endpoints in `config`.
    pub fn new(
        access_token: impl Into<String>,
        config: &GoogleConfig,
        settings: &HttpSettings,
    ) -> ProviderResult<Self> {
        Ok(Self {
            http_client: settings.build_client()?,
            access_token: access_token.into(),
            drive_base: config.drive_base.trim_end_matches('/').to_string(),
            sheets_base: config.sheets_base.trim_end_matches('/').to_string(),
        })
    }

    /// Finds the id of the folder named exactly `name`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no folder matches, `AmbiguousMatch` when more than one does.
    pub async fn find_folder_id(&self, name: &str) -> ProviderResult<String> {
        let query = format!(
            "mimeType='{}' and name='{}' and trashed=false",
            FOLDER_MIME_TYPE,
            escape_query_literal(name)
        );

        let mut matches = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http_client
                .get(format!("{}/files", self.drive_base))
                .bearer_auth(&self.access_token)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", "nextPageToken,files(id,name)"),
                    ("pageSize", "100"),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let body = http::send(request, "files.list").await.map_err(drive_error)?;
            let page: FileList = http::parse_json(&body, "files.list").map_err(drive_error)?;
            let files = require(page.files, "files", "files.list").map_err(drive_error)?;

            matches.extend(files.into_iter().filter(|f| f.name.as_deref() == Some(name)));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let mut ids = matches.into_iter().filter_map(|f| f.id).collect::<Vec<_>>();
        match ids.len() {
            0 => Err(drive_error(ProviderError::not_found(format!(
                "no folder named '{}'",
                name
            )))),
            1 => {
                let id = ids.remove(0);
                debug!("folder '{}' has id {}", name, id);
                Ok(id)
            }
            n => Err(drive_error(ProviderError::ambiguous(format!(
                "{} folders named '{}': {}",
                n,
                name,
                ids.join(", ")
            )))),
        }
    }

    /// Creates an empty spreadsheet named `title` inside `parent_id`.
    pub async fn create_spreadsheet(&self, title: &str, parent_id: &str) -> ProviderResult<String> {
        let metadata = NewFile {
            name: title,
            parents: vec![parent_id],
            mime_type: SPREADSHEET_MIME_TYPE,
        };
        let request = self
            .http_client
            .post(format!("{}/files", self.drive_base))
            .bearer_auth(&self.access_token)
            .query(&[("fields", "id")])
            .json(&metadata);

        let body = http::send(request, "files.create").await.map_err(drive_error)?;
        let file: DriveFile = http::parse_json(&body, "files.create").map_err(drive_error)?;
        let id = require(file.id, "id", "files.create").map_err(drive_error)?;
        info!("created spreadsheet '{}' ({})", title, id);
        Ok(id)
    }

    /// Appends `rows` starting at cell A1 of the first sheet.
    ///
    /// Returns the number of rows the API reports as written.
    pub async fn append_rows(&self, spreadsheet_id: &str, rows: &[Vec<Cell>]) -> ProviderResult<u64> {
        let url = format!(
            "{}/spreadsheets/{}/values/A1:append",
            self.sheets_base,
            urlencoding::encode(spreadsheet_id)
        );
        let request = self
            .http_client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange {
                major_dimension: "ROWS",
                values: rows,
            });

        let body = http::send(request, "values.append").await.map_err(sheets_error)?;
        let response: AppendResponse =
            http::parse_json(&body, "values.append").map_err(sheets_error)?;
        let updated = response
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or_default();
        debug!("appended {} rows to {}", updated, spreadsheet_id);
        Ok(updated)
    }

    /// Returns the browser link of a file.
    pub async fn web_view_link(&self, file_id: &str) -> ProviderResult<String> {
        let request = self
            .http_client
            .get(format!(
                "{}/files/{}",
                self.drive_base,
                urlencoding::encode(file_id)
            ))
            .bearer_auth(&self.access_token)
            .query(&[("fields", "webViewLink")]);

        let body = http::send(request, "files.get").await.map_err(drive_error)?;
        let file: DriveFile = http::parse_json(&body, "files.get").map_err(drive_error)?;
        require(file.web_view_link, "webViewLink", "files.get").map_err(drive_error)
    }

    async fn publish_report(&self, request: &PublishRequest) -> ProviderResult<String> {
        let folder_id = self.find_folder_id(&request.folder_name).await?;
        let spreadsheet_id = self.create_spreadsheet(&request.title, &folder_id).await?;
        self.append_rows(&spreadsheet_id, &request.rows).await?;
        self.web_view_link(&spreadsheet_id).await
    }
}

impl ReportPublisher for DriveClient {
    fn publish<'a>(&'a self, request: &'a PublishRequest) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.publish_report(request))
    }
}

fn drive_error(e: ProviderError) -> ProviderError {
    e.with_provider("drive")
}

fn sheets_error(e: ProviderError) -> ProviderError {
    e.with_provider("sheets")
}

/// Escapes a value for use inside a single quoted Drive query literal.
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Response from files.list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    files: Option<Vec<DriveFile>>,
    next_page_token: Option<String>,
}

/// A file resource, with only the fields we request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: Option<String>,
    name: Option<String>,
    web_view_link: Option<String>,
}

/// Request body of files.create.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFile<'a> {
    name: &'a str,
    parents: Vec<&'a str>,
    mime_type: &'a str,
}

/// Request body of values.append.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    major_dimension: &'a str,
    values: &'a [Vec<Cell>],
}

/// Response from values.append.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_rows: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use mockito::{Matcher, ServerGuard};

    fn client(server: &ServerGuard) -> DriveClient {
        let config = GoogleConfig::default()
            .with_drive_base(format!("{}/drive/v3", server.url()))
            .with_sheets_base(format!("{}/v4", server.url()));
        DriveClient::new("ya29.test", &config, &HttpSettings::default()).unwrap()
    }

    async fn mock_folders(server: &mut ServerGuard, body: serde_json::Value) -> mockito::Mock {
        server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                format!("mimeType='{}' and name='Zoom reports' and trashed=false", FOLDER_MIME_TYPE),
            ))
            .match_header("authorization", "Bearer ya29.test")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[test]
    fn escapes_query_literals() {
        assert_eq!(escape_query_literal("Ana's reports"), "Ana\\'s reports");
        assert_eq!(escape_query_literal("a\\b"), "a\\\\b");
    }

    mod folders {
        use super::*;

        #[tokio::test]
        async fn finds_unique_exact_match() {
            let mut server = mockito::Server::new_async().await;
            let _m = mock_folders(
                &mut server,
                serde_json::json!({"files": [
                    {"id": "f1", "name": "Zoom reports"},
                    {"id": "f2", "name": "zoom reports"}
                ]}),
            )
            .await;

            let id = client(&server).find_folder_id("Zoom reports").await.unwrap();
            assert_eq!(id, "f1");
        }

        #[tokio::test]
        async fn follows_pages() {
            let mut server = mockito::Server::new_async().await;
            let _first = server
                .mock("GET", "/drive/v3/files")
                .match_query(Matcher::Regex("^[^&]*(&[^&]*){2}$".into()))
                .with_status(200)
                .with_body(r#"{"files": [], "nextPageToken": "p2"}"#)
                .create_async()
                .await;
            let _second = server
                .mock("GET", "/drive/v3/files")
                .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
                .with_status(200)
                .with_body(r#"{"files": [{"id": "f9", "name": "Zoom reports"}]}"#)
                .create_async()
                .await;

            let id = client(&server).find_folder_id("Zoom reports").await.unwrap();
            assert_eq!(id, "f9");
        }

        #[tokio::test]
        async fn no_match_is_not_found() {
            let mut server = mockito::Server::new_async().await;
            let _m = mock_folders(&mut server, serde_json::json!({"files": []})).await;

            let err = client(&server).find_folder_id("Zoom reports").await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::NotFound);
            assert_eq!(err.provider(), Some("drive"));
        }

        #[tokio::test]
        async fn several_matches_are_ambiguous() {
            let mut server = mockito::Server::new_async().await;
            let _m = mock_folders(
                &mut server,
                serde_json::json!({"files": [
                    {"id": "f1", "name": "Zoom reports"},
                    {"id": "f2", "name": "Zoom reports"}
                ]}),
            )
            .await;

            let err = client(&server).find_folder_id("Zoom reports").await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::AmbiguousMatch);
            assert!(err.message().contains("f1, f2"));
        }

        #[tokio::test]
        async fn missing_files_field_is_invalid_response() {
            let mut server = mockito::Server::new_async().await;
            let _m = mock_folders(&mut server, serde_json::json!({"kind": "drive#fileList"})).await;

            let err = client(&server).find_folder_id("Zoom reports").await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        }
    }

    #[tokio::test]
    async fn publishes_report() {
        let mut server = mockito::Server::new_async().await;
        let folders = mock_folders(
            &mut server,
            serde_json::json!({"files": [{"id": "folder-1", "name": "Zoom reports"}]}),
        )
        .await;
        let create = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(serde_json::json!({
                "name": "zoom_report_2024-03-15",
                "parents": ["folder-1"],
                "mimeType": SPREADSHEET_MIME_TYPE
            })))
            .with_status(200)
            .with_body(r#"{"id": "sheet-1"}"#)
            .create_async()
            .await;
        let append = server
            .mock("POST", "/v4/spreadsheets/sheet-1/values/A1:append")
            .match_query(Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()))
            .match_body(Matcher::Json(serde_json::json!({
                "majorDimension": "ROWS",
                "values": [["name", "totalMinutes"], ["Ana", 55.0]]
            })))
            .with_status(200)
            .with_body(r#"{"spreadsheetId": "sheet-1", "updates": {"updatedRows": 2}}"#)
            .create_async()
            .await;
        let link = server
            .mock("GET", "/drive/v3/files/sheet-1")
            .match_query(Matcher::UrlEncoded("fields".into(), "webViewLink".into()))
            .with_status(200)
            .with_body(r#"{"webViewLink": "https://docs.google.com/spreadsheets/d/sheet-1/edit"}"#)
            .create_async()
            .await;

        let request = PublishRequest {
            folder_name: "Zoom reports".to_string(),
            title: "zoom_report_2024-03-15".to_string(),
            rows: vec![
                vec![Cell::Text("name".into()), Cell::Text("totalMinutes".into())],
                vec![Cell::Text("Ana".into()), Cell::Number(55.0)],
            ],
        };
        let url = client(&server).publish(&request).await.unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/sheet-1/edit");

        folders.assert_async().await;
        create.assert_async().await;
        append.assert_async().await;
        link.assert_async().await;
    }

    #[tokio::test]
    async fn append_failure_is_reported_by_sheets() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v4/spreadsheets/sheet-1/values/A1:append")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("backend error")
            .create_async()
            .await;

        let err = client(&server)
            .append_rows("sheet-1", &[vec![Cell::Text("x".into())]])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert_eq!(err.provider(), Some("sheets"));
    }

    #[tokio::test]
    async fn missing_link_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/drive/v3/files/sheet-1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let err = client(&server).web_view_link("sheet-1").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }
}
