use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Credentials, SheetRange, SheetStore, SheetTemplate, SpreadsheetFile, Table};

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3/files";

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Google Sheets and Drive over their REST APIs, acting as the signed-in user.
pub struct GoogleSheets {
    client: Client,
    sheets_api_url: String,
    drive_api_url: String,
}

impl GoogleSheets {
    pub fn new(client: Client, sheets_api_url: String, drive_api_url: String) -> Self {
        Self {
            client,
            sheets_api_url: sheets_api_url.trim_end_matches('/').to_string(),
            drive_api_url: drive_api_url.trim_end_matches('/').to_string(),
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: SheetRange) -> String {
        format!("{}/{spreadsheet_id}/values/{range}", self.sheets_api_url)
    }

    /// Send the request and decode a JSON response, turning API errors into
    /// [`Error::Sheets`].
    async fn send<T: DeserializeOwned>(request: RequestBuilder, auth: &Credentials) -> Result<T> {
        let response = checked(request.bearer_auth(&auth.access_token).send().await?).await?;
        Ok(response.json().await?)
    }
}

/// Pass successful responses through; read the error body out of the rest.
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = rocket::serde::json::serde_json::from_str::<ApiErrorBody>(&body)
        .map(|body| body.error.message)
        .unwrap_or(body);
    warn!("Spreadsheet API call failed with {status}: {message}");
    Err(Error::Sheets {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// The `ValueRange` resource. Google omits `values` entirely for an empty range.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Table,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    owned_by_me: bool,
}

#[derive(Deserialize)]
struct Ignored {}

/// Request body creating a spreadsheet whose sheets start with a header row.
fn new_spreadsheet_body(title: &str, sheets: &[SheetTemplate]) -> rocket::serde::json::Value {
    let sheets: Vec<_> = sheets
        .iter()
        .map(|(name, header)| {
            let values: Vec<_> = header
                .iter()
                .map(|cell| rocket::serde::json::json!({ "userEnteredValue": { "stringValue": cell } }))
                .collect();
            rocket::serde::json::json!({
                "properties": { "title": name },
                "data": [{ "rowData": [{ "values": values }] }],
            })
        })
        .collect();
    rocket::serde::json::json!({
        "properties": { "title": title },
        "sheets": sheets,
    })
}

/// Drive query matching our spreadsheets by title prefix.
fn title_query(title_prefix: &str) -> String {
    let escaped = title_prefix.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name contains '{escaped}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false")
}

#[rocket::async_trait]
impl SheetStore for GoogleSheets {
    async fn read_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
    ) -> Result<Table> {
        debug!("Reading {range} of {spreadsheet_id}");
        let request = self.client.get(self.values_url(spreadsheet_id, range));
        let value_range: ValueRange = Self::send(request, auth).await?;
        Ok(value_range.values)
    }

    async fn write_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
        rows: Table,
    ) -> Result<()> {
        debug!("Writing {} rows to {range} of {spreadsheet_id}", rows.len());
        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: rows,
        };
        // RAW keeps cells as typed; USER_ENTERED would reinterpret dates and formulas.
        let request = self
            .client
            .put(self.values_url(spreadsheet_id, range))
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        let _: Ignored = Self::send(request, auth).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        auth: &Credentials,
        spreadsheet_id: &str,
        range: SheetRange,
        rows: Table,
    ) -> Result<()> {
        debug!("Appending {} rows to {range} of {spreadsheet_id}", rows.len());
        let body = ValueRange {
            values: rows,
            ..Default::default()
        };
        let request = self
            .client
            .post(format!("{}:append", self.values_url(spreadsheet_id, range)))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body);
        let _: Ignored = Self::send(request, auth).await?;
        Ok(())
    }

    async fn create_spreadsheet(
        &self,
        auth: &Credentials,
        title: &str,
        sheets: Vec<SheetTemplate>,
    ) -> Result<String> {
        info!("Creating spreadsheet '{title}'");
        let request = self
            .client
            .post(&self.sheets_api_url)
            .json(&new_spreadsheet_body(title, &sheets));
        let created: CreatedSpreadsheet = Self::send(request, auth).await?;
        Ok(created.spreadsheet_id)
    }

    async fn list_spreadsheets(
        &self,
        auth: &Credentials,
        title_prefix: &str,
    ) -> Result<Vec<SpreadsheetFile>> {
        let query = title_query(title_prefix);
        let request = self.client.get(&self.drive_api_url).query(&[
            ("q", query.as_str()),
            ("fields", "files(id,name,ownedByMe)"),
            ("pageSize", "1000"),
        ]);
        let list: FileList = Self::send(request, auth).await?;
        // `contains` matches anywhere in the name, so narrow it to the prefix.
        let files = list
            .files
            .into_iter()
            .filter(|file| file.name.starts_with(title_prefix))
            .map(|file| SpreadsheetFile {
                id: file.id,
                title: file.name,
                owned_by_me: file.owned_by_me,
            })
            .collect();
        Ok(files)
    }

    async fn share(&self, auth: &Credentials, spreadsheet_id: &str, email: &str) -> Result<()> {
        info!("Sharing {spreadsheet_id} with {email}");
        let body = rocket::serde::json::json!({
            "type": "user",
            "role": "writer",
            "emailAddress": email,
        });
        let request = self
            .client
            .post(format!("{}/{spreadsheet_id}/permissions", self.drive_api_url))
            .query(&[("sendNotificationEmail", "true")])
            .json(&body);
        let _: Ignored = Self::send(request, auth).await?;
        Ok(())
    }
}
