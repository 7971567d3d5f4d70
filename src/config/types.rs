use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration for the animux client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_animuxd_api_url")]
    pub animuxd_api_url: String,

    #[serde(default = "default_nibl_api_url")]
    pub nibl_api_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animuxd_api_url: default_animuxd_api_url(),
            nibl_api_url: default_nibl_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_animuxd_api_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_nibl_api_url() -> String {
    "https://api.nibl.co.uk/nibl".to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_request_timeout_secs() -> u64 {
    8
}
