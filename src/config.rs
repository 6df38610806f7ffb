use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::infra::sqlite::store::SqliteStore;
use crate::usecase::ports::store::{LocalStore, API_BASE_URL_KEY};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DB_FILE_NAME: &str = "steward.sqlite";
pub const PAGE_SIZE: i64 = 500;

pub const ENV_API_URL: &str = "STEWARD_API_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "STEWARD_HTTP_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "STEWARD_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    /// `None` leaves the HTTP client's own defaults in place.
    pub http_timeout: Option<Duration>,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Environment first, then the URL remembered in local storage, then the default.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        stored_api_url: Option<String>,
        default_data_dir: PathBuf,
    ) -> Result<Self> {
        let api_base_url = lookup(ENV_API_URL)
            .filter(|url| !url.trim().is_empty())
            .or(stored_api_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            anyhow::bail!("api base url must start with http:// or https://: {api_base_url}");
        }

        let http_timeout = match lookup(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid {ENV_HTTP_TIMEOUT_SECS}: {raw}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let data_dir = lookup(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or(default_data_dir);

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            http_timeout,
            data_dir,
        })
    }
}

/// Reads the process environment and the API URL remembered in local storage.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(|key| std::env::var(key).ok(), default_data_dir)
}

/// Resolves the configuration and remembers the API URL in use for the next start.
pub fn load_config_from(
    lookup: impl Fn(&str) -> Option<String>,
    default_data_dir: impl FnOnce() -> Result<PathBuf>,
) -> Result<AppConfig> {
    let data_dir = match lookup(ENV_DATA_DIR) {
        Some(dir) => PathBuf::from(dir),
        None => default_data_dir()?,
    };

    let store = SqliteStore {
        db_path: data_dir.join(DB_FILE_NAME),
    };
    store.init().map_err(|err| anyhow!(err.to_string()))?;
    let stored_api_url = store
        .load_setting(API_BASE_URL_KEY)
        .map_err(|err| anyhow!(err.to_string()))?;

    let config = AppConfig::resolve(lookup, stored_api_url, data_dir)?;
    store
        .save_setting(API_BASE_URL_KEY, &config.api_base_url)
        .map_err(|err| anyhow!(err.to_string()))?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        data_dir = %config.data_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn default_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("io", "steward", "Steward")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().to_path_buf())
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}
