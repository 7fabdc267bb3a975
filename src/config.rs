use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8001";
pub const DEFAULT_CHANNEL: &str = "general";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Username đăng nhập thành công gần nhất, điền sẵn vào form login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_username: Option<String>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            channel: default_channel(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            last_username: None,
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

pub fn persist_last_username(path: &str, username: &str) {
    let mut config = load_config(path);
    if config.last_username.as_deref() == Some(username) {
        return;
    }
    config.last_username = Some(username.to_string());

    if let Err(err) = save_config(path, &config) {
        log::error!("Failed to write config {}: {err}", path);
    } else {
        log::info!("Remembered username {} in {}", username, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("tracker-chat-{}", uuid::Uuid::new_v4()))
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(&scratch_path("absent.json"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let path = scratch_path("partial.json");
        save_config(&path, &AppConfig::default()).unwrap();
        fs::write(&path, r#"{"channel": "random"}"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.channel, "random");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = scratch_path("corrupt.json");
        save_config(&path, &AppConfig::default()).unwrap();
        fs::write(&path, "{not json").unwrap();

        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn last_username_is_persisted() {
        let path = scratch_path("nested/chat.json");
        persist_last_username(&path, "alice");

        let config = load_config(&path);
        assert_eq!(config.last_username.as_deref(), Some("alice"));
        assert_eq!(config.channel, DEFAULT_CHANNEL);
    }
}
