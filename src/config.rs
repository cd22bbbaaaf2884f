use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides the configured server URL
pub const SERVER_ENV: &str = "LINGCORP_SERVER";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub server_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Text loaded on start-up, like opening `/annotation/<text_id>`
    #[serde(default)]
    pub initial_text: Option<String>,
    #[serde(default)]
    pub start_page: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: default_timeout(),
            initial_text: None,
            start_page: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".lingcorp-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the saved config, applying the server URL override
    pub fn load() -> Option<Config> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_override(env::var(SERVER_ENV).ok());
        Some(config)
    }

    pub fn load_from(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }

        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    pub fn apply_env_override(&mut self, server: Option<String>) {
        if let Some(url) = server.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(%url, "server url overridden from environment");
            self.server_url = url.trim().to_string();
        }
    }

    /// Check that the server URL is an absolute http(s) URL
    pub fn validate(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.server_url.trim())
            .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", self.server_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            server_url: "http://corpus.local:5001".to_string(),
            request_timeout_secs: 5,
            initial_text: Some("text1".to_string()),
            start_page: Some("concordance".to_string()),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), Some(config));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"server_url": "http://localhost:5001"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.initial_text, None);
    }

    #[test]
    fn test_missing_or_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(Config::load_from(&path), None);

        fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), None);
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env_override(Some("  ".to_string()));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);

        config.apply_env_override(Some("http://other:8000".to_string()));
        assert_eq!(config.server_url, "http://other:8000");
    }

    #[rstest]
    #[case("http://127.0.0.1:5001", true)]
    #[case("https://corpus.example.org/app/", true)]
    #[case("ftp://host", false)]
    #[case("localhost:5001", false)]
    #[case("", false)]
    fn test_validate(#[case] url: &str, #[case] ok: bool) {
        let config = Config {
            server_url: url.to_string(),
            ..Config::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }
}
