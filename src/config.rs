//! Parser configuration
//!
//! Settings can be built in code with the `with_*` setters or loaded from a
//! TOML file:
//!
//! ```toml
//! script_path = "https://en.wikipedia.org/w"
//! fetch_templates = true
//! max_depth = 40
//!
//! [templates]
//! "Template:Greet" = "Hello {{{1}}}"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

pub const DEFAULT_SCRIPT_PATH: &str = "http://en.wikipedia.org/w";
pub const DEFAULT_SCRIPT_EXTENSION: &str = ".php";
pub const DEFAULT_MAX_DEPTH: usize = 40;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Settings for template expansion
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Base URL of the wiki's script directory
    pub script_path: String,

    /// Extension appended to script names, e.g. `.php`
    pub script_extension: String,

    /// Whether cache misses may be fetched over the network
    pub fetch_templates: bool,

    /// Maximum nesting of template expansions
    pub max_depth: usize,

    /// Request timeout for template fetches, in seconds
    pub fetch_timeout_secs: u64,

    /// User-Agent header sent with fetches
    pub user_agent: String,

    /// Template sources to preload, keyed by title
    pub templates: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            script_path: DEFAULT_SCRIPT_PATH.to_string(),
            script_extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
            fetch_templates: true,
            max_depth: DEFAULT_MAX_DEPTH,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            templates: BTreeMap::new(),
        }
    }
}

impl ParserConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    ///
    /// Missing keys take their default values.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// URL of the action API endpoint
    pub fn api_url(&self) -> String {
        format!(
            "{}/api{}",
            self.script_path.trim_end_matches('/'),
            self.script_extension
        )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Set the script path
    pub fn with_script_path(mut self, script_path: impl Into<String>) -> Self {
        self.script_path = script_path.into();
        self
    }

    /// Set the script extension
    pub fn with_script_extension(mut self, extension: impl Into<String>) -> Self {
        self.script_extension = extension.into();
        self
    }

    /// Enable or disable network fetching
    pub fn with_fetch_templates(mut self, fetch: bool) -> Self {
        self.fetch_templates = fetch;
        self
    }

    /// Set the maximum expansion depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_secs = timeout.as_secs();
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a template source to preload
    pub fn with_template(mut self, title: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(title.into(), source.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.script_path, "http://en.wikipedia.org/w");
        assert_eq!(config.script_extension, ".php");
        assert!(config.fetch_templates);
        assert_eq!(config.max_depth, 40);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("wiki-expander/"));
    }

    #[test]
    fn test_api_url() {
        let config = ParserConfig::default();
        assert_eq!(config.api_url(), "http://en.wikipedia.org/w/api.php");

        let config = ParserConfig::new()
            .with_script_path("https://wiki.example.org/w/")
            .with_script_extension("");
        assert_eq!(config.api_url(), "https://wiki.example.org/w/api");
    }

    #[test]
    fn test_from_str_partial() {
        let config = ParserConfig::from_str(
            r#"
            fetch_templates = false
            max_depth = 8

            [templates]
            "Template:Foo" = "Hello {{{1}}}"
            "#,
        )
        .unwrap();
        assert!(!config.fetch_templates);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.script_path, DEFAULT_SCRIPT_PATH);
        assert_eq!(
            config.templates.get("Template:Foo").map(String::as_str),
            Some("Hello {{{1}}}")
        );
    }

    #[test]
    fn test_from_str_rejects_unknown_keys() {
        let err = ParserConfig::from_str("scriptpath = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = ParserConfig::from_file(Path::new("/nonexistent/wiki-expander.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_builder() {
        let config = ParserConfig::new()
            .with_fetch_templates(false)
            .with_max_depth(3)
            .with_fetch_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent")
            .with_template("Template:A", "a");
        assert!(!config.fetch_templates);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.templates.len(), 1);
    }
}
