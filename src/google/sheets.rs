use super::{check_status, endpoint, ApiError, SheetProperties, SheetsApi, ValueInputOption};
use async_trait::async_trait;
use google_sheets4::api::{Spreadsheet, ValueRange};
use serde_json::Value;
use tracing::debug;

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: String) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            access_token,
        }
    }
}

/// Formatted cell values arrive as strings, but numbers and booleans can slip through
/// depending on the render option.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

fn row_value_range(range: &str, values: Vec<Vec<String>>) -> ValueRange {
    ValueRange {
        range: Some(range.to_string()),
        major_dimension: Some("ROWS".to_string()),
        values: Some(
            values
                .into_iter()
                .map(|row| row.into_iter().map(Value::String).collect())
                .collect(),
        ),
    }
}

#[async_trait]
impl SheetsApi for SheetsClient {
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, ApiError> {
        let url = endpoint(&self.base_url, &["v4", "spreadsheets", spreadsheet_id])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await?;
        let body: Spreadsheet = check_status(response).await?.json().await?;

        Ok(body
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .map(|props| SheetProperties {
                sheet_id: props.sheet_id.map(i64::from).unwrap_or_default(),
                title: props.title.unwrap_or_default(),
            })
            .collect())
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, ApiError> {
        let url = endpoint(
            &self.base_url,
            &["v4", "spreadsheets", spreadsheet_id, "values", range],
        )?;
        debug!("reading {range} from {spreadsheet_id}");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body: ValueRange = check_status(response).await?.json().await?;

        Ok(body
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        option: ValueInputOption,
    ) -> Result<(), ApiError> {
        let url = endpoint(
            &self.base_url,
            &["v4", "spreadsheets", spreadsheet_id, "values", range],
        )?;
        let body = row_value_range(range, values);
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", option.as_str())])
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
