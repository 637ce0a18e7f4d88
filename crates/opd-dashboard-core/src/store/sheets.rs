//! Google Sheets worksheet as a record store (Sheets API v4).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    check_header, records_from_grid, RecordStore, ServiceAccountAuth, StoreError, StoreResult,
    SHEETS_SCOPE,
};
use crate::config::SheetsSettings;
use crate::models::{OpdRecord, RecordRow, HEADER};

/// Sheets API client bound to one worksheet.
///
/// Requests carry an access token minted from the configured service-account
/// key for the `https://www.googleapis.com/auth/spreadsheets` scope.
pub struct SheetsStore {
    base_url: String,
    sheet_id: String,
    worksheet: String,
    auth: ServiceAccountAuth,
    client: Client,
    /// Set once row 1 is known to hold [`HEADER`].
    header_ready: AtomicBool,
}

/// Request body for `values:append`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// Response body from `values.get`. `values` is absent for an empty range.
#[derive(Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsStore {
    pub fn new(settings: &SheetsSettings) -> StoreResult<Self> {
        let key = settings
            .credentials
            .as_ref()
            .ok_or(StoreError::MissingCredentials)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let auth = ServiceAccountAuth::new(key, SHEETS_SCOPE, client.clone())?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            sheet_id: settings.sheet_id.clone(),
            worksheet: settings.worksheet.clone(),
            auth,
            client,
            header_ready: AtomicBool::new(false),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{worksheet}{suffix}`, path segments encoded.
    fn values_url(&self, suffix: &str) -> StoreResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| StoreError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.sheet_id.as_str(), "values"])
            .push(&format!("{}{}", self.worksheet, suffix));
        Ok(url)
    }

    fn append_url(&self) -> StoreResult<Url> {
        let mut url = self.values_url(":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }

    /// Attach a bearer token and send. A 401 drops the cached token so the
    /// next call mints a fresh one.
    fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.bearer_auth(self.auth.access_token()?).send()?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.auth.invalidate();
        }
        check_status(response)
    }

    /// Read the worksheet (or `range` of it) as text cells.
    fn read_grid(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let response = self.send(self.client.get(self.values_url(range)?))?;
        let parsed: ValueRangeResponse = response.json()?;
        Ok(grid_from_values(parsed.values))
    }

    fn append_rows(&self, rows: &[Vec<String>]) -> StoreResult<()> {
        let body = ValueRangeBody {
            major_dimension: "ROWS",
            values: rows,
        };
        self.send(self.client.post(self.append_url()?).json(&body))?;
        Ok(())
    }
}

impl RecordStore for SheetsStore {
    /// Writes the header first when the worksheet is empty, so a record never
    /// lands in row 1.
    fn append(&self, record: &OpdRecord) -> StoreResult<()> {
        self.ensure_header()?;
        self.append_rows(&[record.to_row_values()])?;
        tracing::info!(
            sheet = %self.sheet_id,
            worksheet = %self.worksheet,
            date = %record.date,
            "Appended OPD record to sheet"
        );
        Ok(())
    }

    fn fetch_all(&self) -> StoreResult<Vec<RecordRow>> {
        let grid = self.read_grid("")?;
        let rows = records_from_grid(&grid)?;
        tracing::debug!(count = rows.len(), sheet = %self.sheet_id, "Fetched OPD records from sheet");
        Ok(rows)
    }

    fn ensure_header(&self) -> StoreResult<bool> {
        if self.header_ready.load(Ordering::Relaxed) {
            return Ok(false);
        }

        let grid = self.read_grid("!1:1")?;
        let written = match grid.first() {
            Some(header) => {
                check_header(header)?;
                false
            }
            None => {
                let header: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
                self.append_rows(&[header])?;
                tracing::info!(sheet = %self.sheet_id, "Wrote header row to empty sheet");
                true
            }
        };
        self.header_ready.store(true, Ordering::Relaxed);
        Ok(written)
    }
}

fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Flatten API cell values to text. Formatted values arrive as strings;
/// numbers and booleans are rendered as they would display.
fn grid_from_values(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect()
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => (if b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceAccountKey;

    fn settings(base_url: &str, worksheet: &str) -> SheetsSettings {
        SheetsSettings {
            sheet_id: "abc123".into(),
            credentials: Some(ServiceAccountKey {
                client_email: "opd@clinic.iam.gserviceaccount.com".into(),
                private_key: include_str!("../../tests/fixtures/test_service_account_key.pem").into(),
                private_key_id: None,
                token_uri: "https://oauth2.example.test/token".into(),
            }),
            credentials_path: None,
            worksheet: worksheet.into(),
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_values_url() {
        let store = SheetsStore::new(&settings("https://sheets.googleapis.com", "Sheet1")).unwrap();
        assert_eq!(
            store.values_url("").unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1"
        );
    }

    #[test]
    fn test_append_url_encodes_worksheet() {
        let store = SheetsStore::new(&settings("https://sheets.googleapis.com/", "OPD Log")).unwrap();
        assert_eq!(
            store.append_url().unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/OPD%20Log:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
    }

    #[test]
    fn test_header_row_url() {
        let store = SheetsStore::new(&settings("https://sheets.googleapis.com", "Sheet1")).unwrap();
        assert_eq!(
            store.values_url("!1:1").unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1!1:1"
        );
    }

    #[test]
    fn test_requires_credentials() {
        let mut settings = settings("https://sheets.googleapis.com", "Sheet1");
        settings.credentials = None;
        assert!(matches!(
            SheetsStore::new(&settings),
            Err(StoreError::MissingCredentials)
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let store = SheetsStore::new(&settings("not a url", "Sheet1")).unwrap();
        assert!(matches!(store.values_url(""), Err(StoreError::InvalidUrl(_))));
    }

    #[test]
    fn test_append_body_shape() {
        let rows = vec![vec!["2024-01-01".to_string(), "Ravi".to_string()]];
        let body = ValueRangeBody {
            major_dimension: "ROWS",
            values: &rows,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"majorDimension":"ROWS","values":[["2024-01-01","Ravi"]]}"#
        );
    }

    #[test]
    fn test_empty_sheet_response() {
        let parsed: ValueRangeResponse =
            serde_json::from_str(r#"{"range":"Sheet1!A1:Z1000","majorDimension":"ROWS"}"#).unwrap();
        assert!(grid_from_values(parsed.values).is_empty());
    }

    #[test]
    fn test_response_cells_to_text() {
        let parsed: ValueRangeResponse = serde_json::from_str(
            r#"{"values":[["Date","Age"],["2024-01-01",34],[true,null]]}"#,
        )
        .unwrap();
        let grid = grid_from_values(parsed.values);
        assert_eq!(grid[1], vec!["2024-01-01", "34"]);
        assert_eq!(grid[2], vec!["TRUE", ""]);
    }
}
