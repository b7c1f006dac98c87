use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base address of the chat server, without the `/chat` or `/test` path.
    pub server_url: String,
    /// Per-request timeout. Unset means requests wait as long as the server does.
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sallgood-chat").join("config.toml"))
    }

    /// Reads `path` if given (it must exist), else the default location if
    /// present, else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_server(mut self, server: Option<&str>) -> Result<Self> {
        if let Some(server) = server {
            self.server_url = server.to_string();
            self.validate()?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.server_url)
            .with_context(|| format!("server_url is not a valid URL: {}", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("server_url must use http or https, got {}", url.scheme());
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        let cache_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(|| PathBuf::from(".cache"));
        cache_dir.join("sallgood-chat").join("sallgood-chat.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn parses_all_fields() {
        let config = Config::parse(
            r#"
            server_url = "http://10.0.2.2:8000"
            request_timeout_secs = 30
            log_file = "/tmp/chat.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.server_url, "http://10.0.2.2:8000");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/chat.log"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::parse("server = \"http://x\"").is_err());
    }

    #[test]
    fn server_override_is_validated() {
        let config = Config::default().with_server(Some("https://chat.example.com")).unwrap();
        assert_eq!(config.server_url, "https://chat.example.com");
        assert!(Config::default().with_server(Some("not a url")).is_err());
        assert!(Config::default().with_server(Some("ftp://host")).is_err());
        assert_eq!(Config::default().with_server(None).unwrap(), Config::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_log_path_lives_under_app_dir() {
        let path = Config::default().log_path();
        assert!(path.ends_with("sallgood-chat/sallgood-chat.log"));
    }
}
