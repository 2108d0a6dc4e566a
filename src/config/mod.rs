//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `READWISE_MCP__*` environment variables, then `READWISE_TOKEN`.
//!
//! ```toml
//! [api]
//! token = "your-readwise-token"
//! base_url = "https://readwise.io/api/v3"
//!
//! [content]
//! readability_base_url = "https://r.jina.ai/"
//! user_agent = "readwise-reader-mcp/0.1.0"
//!
//! [pagination]
//! max_pages = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ReaderError;

/// Environment variable holding the Readwise access token
pub const TOKEN_ENV_VAR: &str = "READWISE_TOKEN";

/// Prefix for environment overrides (`READWISE_MCP__API__BASE_URL`, ...)
pub const ENV_PREFIX: &str = "READWISE_MCP";

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "readwise-mcp.toml";

/// Identifying user agent sent on every outbound request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Readwise access token
    #[serde(default)]
    pub token: Option<String>,

    /// Base URL of the Reader v3 API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://readwise.io/api/v3".to_string()
}

/// Content conversion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Readability service; the target URL is appended verbatim
    #[serde(default = "default_readability_base_url")]
    pub readability_base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            readability_base_url: default_readability_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_readability_base_url() -> String {
    "https://r.jina.ai/".to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

/// Pagination traversal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Upper bound on pages fetched by a single full traversal
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

fn default_max_pages() -> usize {
    1000
}

impl Config {
    /// Token, if one is configured and non-blank
    pub fn token(&self) -> Option<&str> {
        self.api
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Render as TOML with the token redacted
    pub fn to_redacted_toml(&self) -> Result<String, ReaderError> {
        let mut redacted = self.clone();
        if redacted.api.token.is_some() {
            redacted.api.token = Some("********".to_string());
        }
        toml::to_string_pretty(&redacted).map_err(|e| ReaderError::Config(e.to_string()))
    }
}

/// Load configuration from defaults, a file and the environment.
///
/// Without an explicit `path` the default locations of [`find_config_file`]
/// are tried.
pub fn load_config(path: Option<&Path>) -> Result<Config, ReaderError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path.map(Path::to_path_buf).or_else(find_config_file) {
        tracing::debug!("Using config file: {}", path.display());
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let mut config: Config = settings.try_deserialize()?;

    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            config.api.token = Some(token);
        }
    }

    Ok(config)
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("readwise-mcp").join("config.toml");
    user.is_file().then_some(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://readwise.io/api/v3");
        assert_eq!(config.content.readability_base_url, "https://r.jina.ai/");
        assert_eq!(config.pagination.max_pages, 1000);
        assert!(config.api.token.is_none());
    }

    #[test]
    fn test_blank_token_is_treated_as_missing() {
        let mut config = Config::default();
        config.api.token = Some("   ".to_string());
        assert!(config.token().is_none());
        config.api.token = Some("abc".to_string());
        assert_eq!(config.token(), Some("abc"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let toml_content = r#"
[api]
base_url = "http://localhost:9999/api/v3"

[content]
readability_base_url = "http://localhost:9998/"

[pagination]
max_pages = 7
"#;
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9999/api/v3");
        assert_eq!(config.content.readability_base_url, "http://localhost:9998/");
        assert_eq!(config.content.user_agent, USER_AGENT);
        assert_eq!(config.pagination.max_pages, 7);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(matches!(
            load_config(Some(&path)),
            Err(ReaderError::Config(_))
        ));
    }

    #[test]
    fn test_redacted_toml_hides_token() {
        let mut config = Config::default();
        config.api.token = Some("super-secret".to_string());
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[pagination]"));
    }
}
