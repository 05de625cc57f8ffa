use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::services::Theme;

const LOCAL_CLIENT_HOST: &str = "localhost";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host the client pretends to be served from. `localhost` selects the
    /// local development backend.
    #[serde(default = "default_client_host")]
    pub client_host: String,

    #[serde(default = "default_local_backend_url")]
    pub local_backend_url: String,

    #[serde(default = "default_production_backend_url")]
    pub production_backend_url: String,

    /// Explicit backend override, wins over host-based selection.
    pub backend_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Unset means follow the terminal background.
    pub theme: Option<Theme>,
}

fn default_client_host() -> String {
    "tweet-sized-takeaways.netlify.app".to_string()
}

fn default_local_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_production_backend_url() -> String {
    "https://tweet-sized-takeaways.onrender.com".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_host: default_client_host(),
            local_backend_url: default_local_backend_url(),
            production_backend_url: default_production_backend_url(),
            backend_url: None,
            request_timeout_secs: default_request_timeout(),
            theme: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tweet-takeaways")
            .join("config.toml")
    }

    /// Session-only switch to the local development backend.
    pub fn use_local_host(&mut self) {
        self.client_host = LOCAL_CLIENT_HOST.to_string();
    }

    pub fn initial_theme(&self) -> Theme {
        self.theme.unwrap_or_else(Theme::from_terminal)
    }

    /// Resolve the backend base URL once, at startup.
    pub fn backend_base_url(&self) -> Result<String> {
        let base: &str = match &self.backend_url {
            Some(url) => url.as_str(),
            None if self.client_host == LOCAL_CLIENT_HOST => &self.local_backend_url,
            None => &self.production_backend_url,
        };

        // Fail at startup on a malformed base URL
        url::Url::parse(base)?;

        Ok(base.trim_end_matches('/').to_string())
    }
}
