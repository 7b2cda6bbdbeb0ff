//! Workspace configuration
//!
//! Defaults, then an optional TOML file, then environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default workspace document
pub const DEFAULT_DATA_PATH: &str = "foundry.json";
/// Workspace document when running in production
pub const PRODUCTION_DATA_PATH: &str = "/tmp/foundry.json";
/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Text generation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl AiProvider {
    /// Configuration spelling
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }
}

/// Generation settings
///
/// Read by whichever [`crate::InsightGenerator`] implementation the host
/// wires into the workspace; this crate only carries the settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Provider to call
    pub provider: AiProvider,
    /// Model for structured extraction and scoring
    pub model: String,
    /// Model for latency-sensitive calls
    pub fast_model: String,
}

impl AiConfig {
    /// Default models for `provider`
    #[must_use]
    pub fn for_provider(provider: AiProvider) -> Self {
        match provider {
            AiProvider::Anthropic => Self {
                provider,
                model: "claude-3-5-haiku-20241022".to_string(),
                fast_model: "claude-3-5-haiku-20241022".to_string(),
            },
            AiProvider::OpenAi => Self {
                provider,
                model: "gpt-4o".to_string(),
                fast_model: "gpt-4o-mini".to_string(),
            },
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::for_provider(AiProvider::OpenAi)
    }
}

/// Foundry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundryConfig {
    /// Workspace JSON document
    pub data_path: PathBuf,
    /// `tracing` filter directive
    pub log_filter: String,
    /// Generation settings
    pub ai: AiConfig,
}

impl FoundryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With workspace document path
    #[inline]
    #[must_use]
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// With tracing filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// With generation settings
    #[inline]
    #[must_use]
    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = ai;
        self
    }

    /// Parse TOML; absent keys keep their defaults
    ///
    /// # Errors
    /// The text is not valid TOML for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// The file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults with process environment overrides
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup
    ///
    /// - `FOUNDRY_ENV=production` moves the default document under `/tmp`
    /// - `FOUNDRY_DATA_PATH`, `FOUNDRY_LOG` override directly
    /// - `ANTHROPIC_API_KEY` selects the Anthropic provider
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if present("FOUNDRY_ENV").as_deref() == Some("production")
            && self.data_path == Path::new(DEFAULT_DATA_PATH)
        {
            self.data_path = PathBuf::from(PRODUCTION_DATA_PATH);
        }
        if let Some(path) = present("FOUNDRY_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(filter) = present("FOUNDRY_LOG") {
            self.log_filter = filter;
        }
        if present("ANTHROPIC_API_KEY").is_some() {
            self.ai = AiConfig::for_provider(AiProvider::Anthropic);
        }
        self
    }
}

impl Default for FoundryConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            ai: AiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = FoundryConfig::new();
        assert_eq!(config.data_path, PathBuf::from("foundry.json"));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.ai.provider, AiProvider::OpenAi);
        assert_eq!(config.ai.fast_model, "gpt-4o-mini");
    }

    #[test]
    fn production_moves_data_to_tmp() {
        let config = FoundryConfig::new().with_env(env(&[("FOUNDRY_ENV", "production")]));
        assert_eq!(config.data_path, PathBuf::from("/tmp/foundry.json"));

        let explicit = FoundryConfig::new().with_env(env(&[
            ("FOUNDRY_ENV", "production"),
            ("FOUNDRY_DATA_PATH", "/srv/foundry.json"),
        ]));
        assert_eq!(explicit.data_path, PathBuf::from("/srv/foundry.json"));
    }

    #[test]
    fn anthropic_key_switches_provider() {
        let config = FoundryConfig::new().with_env(env(&[("ANTHROPIC_API_KEY", "sk-test")]));
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
        assert_eq!(config.ai.model, "claude-3-5-haiku-20241022");

        let empty = FoundryConfig::new().with_env(env(&[("ANTHROPIC_API_KEY", "")]));
        assert_eq!(empty.ai.provider, AiProvider::OpenAi);
    }

    #[test]
    fn provider_spelling_matches_config_files() {
        for provider in [AiProvider::Anthropic, AiProvider::OpenAi] {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let config = FoundryConfig::from_toml_str(
            r#"
            log_filter = "foundry_core=debug"

            [ai]
            provider = "anthropic"
            model = "claude-3-5-haiku-20241022"
            fast_model = "claude-3-5-haiku-20241022"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "foundry_core=debug");
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
    }

    #[test]
    fn load_reports_path() {
        let err = FoundryConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
