use thiserror::Error;

use crate::google::ApiError;

/// Start-up configuration failures. These stop the process before it serves anything.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
    #[error("failed to read campus registry {path}: {source}")]
    CampusFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid campus registry {path}: {source}")]
    CampusFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("campus registry is empty")]
    NoCampuses,
    #[error("invalid PORT value {0:?}")]
    Port(String),
    #[error("cannot determine project root: {0}")]
    Root(#[source] std::io::Error),
}

/// Everything that can stop a page from reaching its normal state. The `Display` text is
/// what the user sees in the error box.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Credentials file not found.")]
    CredentialsMissing,
    #[error("Invalid credentials.json")]
    InvalidCredentials,
    #[error("Client secret file not found or invalid: {0}")]
    ClientSecret(String),
    #[error("Sheets API: token refresh failed: {0}")]
    Auth(#[source] ApiError),
    #[error("Sheets API: {0}")]
    Remote(#[from] ApiError),
    #[error("Sheet not found for this campus.")]
    SheetNotFound,
    #[error("Sheet has no data or only a header row.")]
    NoData,
    #[error("Row not found.")]
    RowNotFound,
    #[error("Save failed: {0}")]
    SaveFailed(#[source] ApiError),
}
