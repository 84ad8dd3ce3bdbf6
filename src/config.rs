use crate::errors::ConfigError;
use crate::models::{Campus, CampusRegistry};
use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, warn};

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DOCS_API_BASE: &str = "https://docs.googleapis.com";
pub const DEFAULT_DONE_URL: &str = "https://crosspointchurchsv.org/gum";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub credentials_path: PathBuf,
    pub client_secret_path: PathBuf,
    pub environment: String,
    pub campuses_path: Option<PathBuf>,
    pub done_url: String,
    pub sheets_api_base: String,
    pub docs_api_base: String,
    pub port: u16,
}

impl Settings {
    /// Reads `<root>/.env` and the process environment. The root is `ATTENDANCE_ROOT` or the
    /// working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let root = match env::var("ATTENDANCE_ROOT") {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => env::current_dir().map_err(ConfigError::Root)?,
        };
        Self::from_root(root)
    }

    pub fn from_root(root: PathBuf) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(&root.join(".env"))?;
        Self::from_lookup(root, |key| {
            file_vars.get(key).cloned().or_else(|| env::var(key).ok())
        })
    }

    /// Empty values count as unset, so they fall through to the default.
    pub fn from_lookup(
        root: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(autoload) = get("AUTOLOAD_PATH") {
            debug!("ignoring AUTOLOAD_PATH={autoload}");
        }

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Port(raw))?,
            None => 8080,
        };

        Ok(Self {
            credentials_path: resolve_path(
                &get("CREDENTIALS_PATH").unwrap_or_else(|| "credentials.json".into()),
                &root,
            ),
            client_secret_path: resolve_path(
                &get("CLIENT_SECRET_PATH").unwrap_or_else(|| "client_secret.json".into()),
                &root,
            ),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            campuses_path: get("CAMPUSES_PATH").map(|path| resolve_path(&path, &root)),
            done_url: get("DONE_URL").unwrap_or_else(|| DEFAULT_DONE_URL.into()),
            sheets_api_base: get("SHEETS_API_BASE")
                .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.into()),
            docs_api_base: get("DOCS_API_BASE").unwrap_or_else(|| DEFAULT_DOCS_API_BASE.into()),
            port,
            root,
        })
    }
}

/// A missing env file is not an error; malformed lines are skipped with a warning.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let mut vars = HashMap::new();
    if !path.is_file() {
        return Ok(vars);
    }

    let iter = dotenvy::from_path_iter(path).map_err(|source| ConfigError::EnvFile {
        path: path.display().to_string(),
        source,
    })?;
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(err) => warn!("skipping env file line in {}: {err}", path.display()),
        }
    }
    Ok(vars)
}

/// Absolute paths (leading `/` or a drive letter) are kept, anything else is joined onto
/// the root.
pub fn resolve_path(path: &str, root: &Path) -> PathBuf {
    let bytes = path.as_bytes();
    if path.is_empty() || bytes[0] == b'/' || (bytes.len() > 1 && bytes[1] == b':') {
        return PathBuf::from(path);
    }
    root.join(path.trim_start_matches('/'))
}

pub async fn load_registry(settings: &Settings) -> Result<CampusRegistry, ConfigError> {
    let Some(path) = settings.campuses_path.as_deref() else {
        return Ok(CampusRegistry::builtin());
    };

    let bytes = fs::read(path).await.map_err(|source| ConfigError::CampusFile {
        path: path.display().to_string(),
        source,
    })?;
    let campuses: Vec<Campus> =
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::CampusFormat {
            path: path.display().to_string(),
            source,
        })?;
    if campuses.is_empty() {
        return Err(ConfigError::NoCampuses);
    }
    Ok(CampusRegistry::new(campuses))
}
