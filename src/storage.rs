use crate::errors::AttendanceError;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Tokens are treated as expired this long before their recorded expiry.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// The credential store. Fields other than the three we manage are kept as-is on rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredCredentials {
    /// RFC 3339, or a zone-less ISO timestamp taken as UTC.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiry.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// An unknown expiry counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_empty() {
            return true;
        }
        match self.expires_at() {
            Some(at) => at - Duration::seconds(EXPIRY_LEEWAY_SECS) <= now,
            None => true,
        }
    }

    pub fn apply_refresh(&mut self, access_token: String, expires_in: Option<i64>, now: DateTime<Local>) {
        self.token = access_token;
        // Out-of-range lifetimes leave the old expiry, so the next request refreshes again.
        let expiry = expires_in
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));
        if let Some(expiry) = expiry {
            self.expiry = Some(expiry.format("%Y-%m-%dT%H:%M:%S%:z").to_string());
        }
    }
}

pub async fn load_credentials(path: &Path) -> Result<StoredCredentials, AttendanceError> {
    let is_file = fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(AttendanceError::CredentialsMissing);
    }

    let bytes = fs::read(path).await.map_err(|err| {
        error!("failed to read credentials file: {err}");
        AttendanceError::InvalidCredentials
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        error!("failed to parse credentials file: {err}");
        AttendanceError::InvalidCredentials
    })
}

/// Pretty-printed with four-space indentation; slashes are written unescaped.
pub async fn persist_credentials(
    path: &Path,
    credentials: &StoredCredentials,
) -> Result<(), std::io::Error> {
    let mut payload = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut payload, formatter);
    credentials.serialize(&mut serializer)?;
    fs::write(path, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn temp_file(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("attendance_creds_{tag}_{}_{nanos}.json", std::process::id()));
        path
    }

    fn credentials(expiry: Option<&str>) -> StoredCredentials {
        StoredCredentials {
            token: "ya29.old".into(),
            refresh_token: "1//refresh".into(),
            expiry: expiry.map(str::to_string),
            extra: Map::new(),
        }
    }

    #[test]
    fn expiry_detection() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert!(!credentials(Some("2026-10-19T13:00:00Z")).is_expired_at(now));
        assert!(!credentials(Some("2026-10-19T13:00:00.250000")).is_expired_at(now));
        assert!(credentials(Some("2026-10-19T12:00:10+00:00")).is_expired_at(now));
        assert!(credentials(Some("2026-10-19T11:00:00Z")).is_expired_at(now));
        assert!(credentials(Some("soon")).is_expired_at(now));
        assert!(credentials(None).is_expired_at(now));
    }

    #[test]
    fn refresh_updates_token_and_expiry() {
        let mut creds = credentials(None);
        let now = Local.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        creds.apply_refresh("ya29.new".into(), Some(3600), now);
        assert_eq!(creds.token, "ya29.new");
        let expires_at = creds.expires_at().unwrap();
        assert_eq!(expires_at, (now + Duration::hours(1)).with_timezone(&Utc));
        assert_eq!(creds.refresh_token, "1//refresh");
    }

    #[test]
    fn absurd_lifetime_keeps_previous_expiry() {
        let mut creds = credentials(Some("2000-01-01T00:00:00Z"));
        let now = Local.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        creds.apply_refresh("ya29.new".into(), Some(i64::MAX), now);
        assert_eq!(creds.token, "ya29.new");
        assert_eq!(creds.expiry.as_deref(), Some("2000-01-01T00:00:00Z"));

        creds.apply_refresh("ya29.newer".into(), Some(i64::MAX / 1_000), now);
        assert_eq!(creds.expiry.as_deref(), Some("2000-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn missing_and_invalid_files() {
        let path = temp_file("missing");
        assert!(matches!(
            load_credentials(&path).await,
            Err(AttendanceError::CredentialsMissing)
        ));

        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            load_credentials(&path).await,
            Err(AttendanceError::InvalidCredentials)
        ));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn rewrite_keeps_unknown_fields_and_slashes() {
        let path = temp_file("rewrite");
        std::fs::write(
            &path,
            r#"{"token":"a","refresh_token":"1//r","expiry":"2020-01-01T00:00:00Z","token_uri":"https://oauth2.googleapis.com/token","scopes":["x"]}"#,
        )
        .unwrap();

        let mut creds = load_credentials(&path).await.unwrap();
        creds.token = "b".into();
        persist_credentials(&path, &creds).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n    \"token\": \"b\""));
        assert!(written.contains("https://oauth2.googleapis.com/token"));
        assert!(!written.contains("\\/"));

        let reloaded = load_credentials(&path).await.unwrap();
        assert_eq!(reloaded, creds);
        let _ = std::fs::remove_file(path);
    }
}
