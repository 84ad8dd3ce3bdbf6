//! Thin REST clients for the OAuth, Sheets v4 and Docs v1 endpoints.
//!
//! Each remote surface sits behind an `async_trait` so request handling can be driven by
//! in-memory fakes.

pub mod auth;
pub mod docs;
pub mod sheets;

use crate::config::Settings;
use crate::document::{Document, DocsRequest};
use crate::errors::AttendanceError;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub use docs::DocsClient;
pub use sheets::SheetsClient;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid endpoint {0}")]
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Parsed as if typed into the UI: numbers, dates and formulas are coerced.
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Tabs in spreadsheet order.
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, ApiError>;

    /// Row-major grid; trailing empty cells and rows are omitted by the server.
    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, ApiError>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        option: ValueInputOption,
    ) -> Result<(), ApiError>;
}

#[async_trait]
pub trait DocsApi: Send + Sync {
    async fn get_document(&self, document_id: &str) -> Result<Document, ApiError>;

    async fn batch_update(
        &self,
        document_id: &str,
        requests: Vec<DocsRequest>,
    ) -> Result<(), ApiError>;
}

/// Hands out an authorised Sheets client per request.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn sheets(&self) -> Result<Box<dyn SheetsApi>, AttendanceError>;
}

pub struct GoogleBackend {
    settings: Arc<Settings>,
    http: reqwest::Client,
}

impl GoogleBackend {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Backend for GoogleBackend {
    async fn sheets(&self) -> Result<Box<dyn SheetsApi>, AttendanceError> {
        let token = auth::authorize(&self.settings, &self.http).await?;
        Ok(Box::new(SheetsClient::new(
            self.http.clone(),
            &self.settings.sheets_api_base,
            token,
        )))
    }
}

/// `base` followed by percent-encoded path segments.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base).map_err(|err| ApiError::Url(format!("{base}: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Url(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Passes successful responses through and turns everything else into
/// [`ApiError::Status`] with the most useful message the body offers.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Google { error: GoogleError },
    OAuth {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Google { error }) => error.message,
        Ok(ErrorBody::OAuth {
            error,
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(ErrorBody::OAuth { error, .. }) => error,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
