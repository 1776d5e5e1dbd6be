use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::error::SheetsError;
use super::types::{col_letter, DriveFileList, SpreadsheetMeta, ValueRange};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com";
const DRIVE_API_URL: &str = "https://www.googleapis.com";

/// Narrow interface over the tabular store.
///
/// The dispatch engines and the scanner only ever read the full row set,
/// re-read one row, and write one cell, so that is the whole contract. Tests
/// substitute an in-memory implementation.
pub trait RowStore {
    async fn get_all_rows(&self) -> Result<Vec<Vec<String>>, SheetsError>;
    async fn get_row(&self, row: usize) -> Result<Vec<String>, SheetsError>;
    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), SheetsError>;
}

/// Google Sheets v4 client bound to one spreadsheet and one worksheet.
pub struct SheetsClient {
    http: Client,
    sheets_url: String,
    drive_url: String,
    token: String,
    spreadsheet_id: String,
    worksheet: String,
}

// Error body shape shared by the Sheets and Drive APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl SheetsClient {
    pub fn new(token: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self::with_base_urls(token, spreadsheet_id, SHEETS_API_URL, DRIVE_API_URL)
    }

    /// Create a client pointing at custom API hosts (useful for testing).
    pub fn with_base_urls(
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheets_url: impl Into<String>,
        drive_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            sheets_url: sheets_url.into(),
            drive_url: drive_url.into(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: "Sheet1".to_string(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Looks the spreadsheet up by name through the Drive API and binds the
    /// client to its id. Used when the configuration gives a name instead of
    /// an id.
    pub async fn resolve_by_name(&mut self, name: &str) -> Result<&str, SheetsError> {
        let url = format!("{}/drive/v3/files", self.drive_url);
        let query = format!(
            "name = '{name}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)"), ("pageSize", "1")])
            .send()
            .await?;
        let list: DriveFileList = Self::read_json(response).await?;
        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| SheetsError::NotFound(format!("no spreadsheet named '{name}'")))?;
        self.spreadsheet_id = file.id;
        Ok(&self.spreadsheet_id)
    }

    /// Binds the client to a worksheet: the requested title when given
    /// (verified against the spreadsheet metadata), otherwise the first
    /// sheet. Returns the resolved title.
    pub async fn resolve_worksheet(&mut self, requested: Option<&str>) -> Result<&str, SheetsError> {
        let url = format!("{}/v4/spreadsheets/{}", self.sheets_url, self.spreadsheet_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::read_json(response).await?;

        let title = match requested {
            Some(wanted) => meta
                .sheets
                .iter()
                .find(|s| s.properties.title == wanted)
                .map(|s| s.properties.title.clone())
                .ok_or_else(|| SheetsError::NotFound(format!("no worksheet titled '{wanted}'")))?,
            None => meta
                .sheets
                .first()
                .map(|s| s.properties.title.clone())
                .ok_or_else(|| SheetsError::Shape("spreadsheet has no sheets".into()))?,
        };
        self.worksheet = title;
        Ok(&self.worksheet)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.sheets_url, self.spreadsheet_id, range
        )
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SheetsError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl RowStore for SheetsClient {
    async fn get_all_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = format!("'{}'", self.worksheet);
        let response = self
            .http
            .get(self.values_url(&range))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let vr: ValueRange = Self::read_json(response).await?;
        Ok(vr.values.unwrap_or_default())
    }

    async fn get_row(&self, row: usize) -> Result<Vec<String>, SheetsError> {
        let range = format!("'{}'!{row}:{row}", self.worksheet);
        let response = self
            .http
            .get(self.values_url(&range))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let vr: ValueRange = Self::read_json(response).await?;
        Ok(vr.values.unwrap_or_default().into_iter().next().unwrap_or_default())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), SheetsError> {
        let range = format!("'{}'!{}{row}", self.worksheet, col_letter(col));
        let body = ValueRange {
            range: None,
            values: Some(vec![vec![value.to_string()]]),
        };
        let response = self
            .http
            .put(self.values_url(&range))
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SheetsClient {
        SheetsClient::with_base_urls("test-token", "sheet1", server.uri(), server.uri())
    }

    #[tokio::test]
    async fn get_all_rows_reads_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet1/values/'Sheet1'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "Sheet1!A1:B2",
                "majorDimension": "ROWS",
                "values": [["https://a.co/x", "SENT 2026-08-07 10:00:00 (msgid:1)"], ["https://b.io/y"]]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rows = client.get_all_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "https://a.co/x");
        assert_eq!(rows[1], vec!["https://b.io/y"]);
    }

    #[tokio::test]
    async fn get_all_rows_empty_sheet_yields_no_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet1/values/'Sheet1'"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"range": "Sheet1!A1:Z1000"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.get_all_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_row_reads_one_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet1/values/'Sheet1'!5:5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "values": [["https://a.co/x", "SENDING"]]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let row = client.get_row(5).await.unwrap();
        assert_eq!(row, vec!["https://a.co/x", "SENDING"]);
    }

    #[tokio::test]
    async fn write_cell_puts_raw_value() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v4/spreadsheets/sheet1/values/'Sheet1'!B5"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_json(serde_json::json!({"values": [["SENDING"]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "updatedCells": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.write_cell(5, 2, "SENDING").await.unwrap();
    }

    #[tokio::test]
    async fn api_error_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_all_rows().await.unwrap_err();
        match err {
            SheetsError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "The caller does not have permission");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_worksheet_defaults_to_first_sheet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet1"))
            .and(query_param("fields", "sheets.properties"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sheets": [
                    {"properties": {"title": "Requests"}},
                    {"properties": {"title": "Quota"}}
                ]
            })))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        let title = client.resolve_worksheet(None).await.unwrap().to_string();
        assert_eq!(title, "Requests");
        assert_eq!(client.worksheet(), "Requests");
    }

    #[tokio::test]
    async fn resolve_worksheet_verifies_requested_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sheets": [{"properties": {"title": "Requests"}}]
            })))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        assert!(client.resolve_worksheet(Some("Requests")).await.is_ok());
        let err = client.resolve_worksheet(Some("Missing")).await.unwrap_err();
        assert!(matches!(err, SheetsError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_by_name_binds_spreadsheet_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [{"id": "resolved-id-42", "name": "sheet-bot"}]
            })))
            .mount(&server)
            .await;

        let mut client = SheetsClient::with_base_urls("t", "", server.uri(), server.uri());
        client.resolve_by_name("sheet-bot").await.unwrap();
        assert_eq!(client.spreadsheet_id(), "resolved-id-42");
    }

    #[tokio::test]
    async fn resolve_by_name_errors_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})))
            .mount(&server)
            .await;

        let mut client = SheetsClient::with_base_urls("t", "", server.uri(), server.uri());
        let err = client.resolve_by_name("ghost").await.unwrap_err();
        assert!(matches!(err, SheetsError::NotFound(_)));
    }
}
