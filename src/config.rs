use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Page size the web client used for its list view
pub const DEFAULT_PAGE_SIZE: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub graphql_url: String,
    pub token_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            graphql_url: "http://localhost:8000/gql".to_string(),
            token_url: "http://localhost:8000/api-token-auth/".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_env: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: Some("MSGBOARD_TOKEN".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("msgboard").join("config.toml"))
}

impl Config {
    /// Load from `path` (or the default location). A missing or broken file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Config::default(),
            },
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> crate::error::Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.list.page_size == 0 {
            config.list.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[server]
graphql_url = "https://board.example.com/gql"
token_url = "https://board.example.com/api-token-auth/"
timeout_secs = 3

[list]
page_size = 20

[auth]
token_env = "BOARD_TOKEN"
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.server.graphql_url, "https://board.example.com/gql");
        assert_eq!(config.list.page_size, 20);
        assert_eq!(config.auth.token_env.as_deref(), Some("BOARD_TOKEN"));
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config = Config::parse("[list]\npage_size = 5\n").unwrap();
        assert_eq!(config.list.page_size, 5);
        assert_eq!(config.server.graphql_url, "http://localhost:8000/gql");
        assert_eq!(config.auth.token_env.as_deref(), Some("MSGBOARD_TOKEN"));
    }

    #[test]
    fn zero_page_size_uses_default() {
        let config = Config::parse("[list]\npage_size = 0\n").unwrap();
        assert_eq!(config.list.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = Config::parse("[server\n").unwrap_err();
        assert!(matches!(err, crate::error::BoardError::Config(_)));
    }

    #[test]
    fn missing_file_uses_default() {
        let config = Config::load(Some(Path::new("/nonexistent/msgboard/config.toml")));
        assert_eq!(config.list.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let mut config = Config::default();
        config.server.timeout_secs = 0;
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }
}
