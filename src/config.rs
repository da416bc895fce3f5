use serde::Deserialize;
use std::path::PathBuf;

use crate::services::ranking::DEFAULT_LIMIT;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Endpoint returning the recommendations envelope
    pub recommendations_url: String,

    /// Directory holding the recommendations cache file.
    /// Falls back to the per-user data directory when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of ranked titles considered before filtering
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Lets the image proxy fetch from loopback, private and link-local hosts
    #[serde(default)]
    pub allow_private_image_hosts: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_recommendation_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the display server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
