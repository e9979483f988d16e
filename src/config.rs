use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::client::DEFAULT_API_URL;
use crate::dispatch::DEFAULT_TIMEOUT;
use crate::session::DEFAULT_GREETING_DELAY;
use crate::suggest::DEFAULT_SUGGESTIONS;

pub const API_URL_ENV: &str = "MZU_CHAT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub greeting_delay_ms: Option<u64>,
    pub suggestions: Option<Vec<String>>,
    pub session: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        Ok(config_path)
    }

    /// Environment values win over the config file.
    pub fn with_env(self) -> Self {
        self.with_env_from(API_URL_ENV)
    }

    fn with_env_from(mut self, var: &str) -> Self {
        if let Ok(url) = std::env::var(var) {
            if !url.is_empty() {
                self.api_url = Some(url);
            }
        }
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn greeting_delay(&self) -> Duration {
        self.greeting_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_GREETING_DELAY)
    }

    pub fn suggestions(&self) -> Vec<String> {
        match &self.suggestions {
            Some(list) => list.clone(),
            None => DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mzu-chat").join("config.json"))
    }
}
