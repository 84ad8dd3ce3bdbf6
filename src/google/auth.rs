use super::{check_status, ApiError};
use crate::config::Settings;
use crate::errors::AttendanceError;
use crate::storage::{load_credentials, persist_credentials};
use chrono::{Local, Utc};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google ships OAuth clients wrapped in either an `installed` or a `web` object.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" client".to_string())
    }

    pub async fn load(path: &Path) -> Result<Self, AttendanceError> {
        let bytes = fs::read(path)
            .await
            .map_err(|err| AttendanceError::ClientSecret(format!("{}: {err}", path.display())))?;
        Self::parse(&bytes).map_err(AttendanceError::ClientSecret)
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

pub async fn refresh_access_token(
    http: &reqwest::Client,
    secret: &ClientSecret,
    refresh_token: &str,
) -> Result<RefreshedToken, ApiError> {
    let response = http
        .post(&secret.token_uri)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
        ])
        .send()
        .await?;
    Ok(check_status(response).await?.json().await?)
}

/// Returns a usable access token, refreshing and rewriting the credential file when the
/// stored one has expired. A failed rewrite is logged; the fresh token is still used.
pub async fn authorize(settings: &Settings, http: &reqwest::Client) -> Result<String, AttendanceError> {
    let mut credentials = load_credentials(&settings.credentials_path).await?;
    if !credentials.is_expired_at(Utc::now()) {
        return Ok(credentials.token);
    }

    let secret = ClientSecret::load(&settings.client_secret_path).await?;
    let refreshed = refresh_access_token(http, &secret, &credentials.refresh_token)
        .await
        .map_err(AttendanceError::Auth)?;
    credentials.apply_refresh(refreshed.access_token, refreshed.expires_in, Local::now());
    info!("refreshed access token");

    if let Err(err) = persist_credentials(&settings.credentials_path, &credentials).await {
        warn!(
            "failed to rewrite {}: {err}",
            settings.credentials_path.display()
        );
    }
    Ok(credentials.token)
}
