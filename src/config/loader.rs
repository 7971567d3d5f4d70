use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::ClientError;

use super::types::DEFAULT_POLL_INTERVAL_MS;
use super::{paths, Config};

const ANIMUXD_URL_ENV: &str = "ANIMUXD_API_URL";
const NIBL_URL_ENV: &str = "NIBL_API_URL";

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config_path = paths::get_config_path();
        let mut config = match Self::load_from_path(&config_path).await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.sanitize();

        info!(
            animuxd = %config.animuxd_api_url,
            nibl = %config.nibl_api_url,
            poll_interval_ms = config.poll_interval_ms,
            "Loaded configuration"
        );
        config
    }

    pub async fn load_from_path(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| ClientError::Config(format!("Failed to read config file: {err}")))?;

        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Environment values win over the file when they are not blank.
    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_blank(lookup(ANIMUXD_URL_ENV)) {
            self.animuxd_api_url = url;
        }
        if let Some(url) = non_blank(lookup(NIBL_URL_ENV)) {
            self.nibl_api_url = url;
        }
    }

    pub(crate) fn sanitize(&mut self) {
        if self.poll_interval_ms == 0 {
            warn!(
                default = DEFAULT_POLL_INTERVAL_MS,
                "poll_interval_ms must be positive, using default"
            );
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
