//! Configuration entities.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::{anthropic, openai};
use crate::errors::{TasksError, TasksResult};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".taskmaster/config.json";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TaskmasterConfig {
    /// Model used for prioritization
    #[serde(default)]
    pub model: ModelSettings,

    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,
}

impl TaskmasterConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config path.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> TasksResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| TasksError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| TasksError::Config {
            reason: format!("{}: {e}", path.display()),
        })
    }

    /// Load from `path` and apply `TASKMASTER_*` environment overrides.
    pub fn load_with_env(path: &Path) -> TasksResult<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("TASKMASTER_PROVIDER") {
            self.model.set_provider(provider);
        }
        if let Some(model) = lookup("TASKMASTER_MODEL") {
            self.model.model_id = model;
        }
        if let Some(url) = lookup("TASKMASTER_BASE_URL") {
            self.model.base_url = Some(url);
        }
    }
}

/// Model settings for the prioritization backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSettings {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Model ID
    #[serde(rename = "modelId")]
    pub model_id: String,

    /// Maximum tokens
    #[serde(default = "default_max_tokens", rename = "maxTokens")]
    pub max_tokens: u32,

    /// Temperature (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional base URL override
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "baseURL")]
    pub base_url: Option<String>,
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_temperature() -> f32 {
    0.2
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model_id: anthropic::default_model().to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: None,
        }
    }
}

impl ModelSettings {
    /// Switch provider. The model resets to that provider's default when the
    /// provider actually changes and a default is known.
    pub fn set_provider(&mut self, provider: impl Into<String>) {
        let provider = provider.into();
        if provider != self.provider {
            let default = match provider.as_str() {
                "anthropic" => Some(anthropic::default_model()),
                "openai" => Some(openai::default_model()),
                _ => None,
            };
            if let Some(model) = default {
                self.model_id = model.to_string();
            }
        }
        self.provider = provider;
    }
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Log level
    #[serde(default = "default_log_level", rename = "logLevel")]
    pub log_level: String,

    /// Upper bound on a single model call
    #[serde(default = "default_timeout_secs", rename = "requestTimeoutSecs")]
    pub request_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = TaskmasterConfig::default();
        assert_eq!(config.model.provider, "anthropic");
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.global.request_timeout_secs, 60);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = TaskmasterConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, TaskmasterConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model": {{"provider": "openai", "modelId": "gpt-4o-mini"}}, "global": {{"requestTimeoutSecs": 5}}}}"#
        )
        .unwrap();

        let config = TaskmasterConfig::load(file.path()).unwrap();
        assert_eq!(config.model.provider, "openai");
        assert_eq!(config.model.model_id, "gpt-4o-mini");
        assert!((config.model.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.global.request_timeout_secs, 5);
        assert_eq!(config.global.log_level, "info");
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = TaskmasterConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, TasksError::Config { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TASKMASTER_PROVIDER", "openai"),
            ("TASKMASTER_BASE_URL", "http://localhost:9999"),
        ]);
        let mut config = TaskmasterConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.model.provider, "openai");
        assert_eq!(config.model.model_id, "gpt-4o");
        assert_eq!(config.model.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn test_explicit_model_wins_over_provider_default() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TASKMASTER_PROVIDER", "openai"),
            ("TASKMASTER_MODEL", "gpt-4.1-mini"),
        ]);
        let mut config = TaskmasterConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.model.model_id, "gpt-4.1-mini");
    }

    #[test]
    fn test_same_provider_keeps_model() {
        let mut settings = ModelSettings {
            model_id: "haiku".to_string(),
            ..ModelSettings::default()
        };
        settings.set_provider("anthropic");
        assert_eq!(settings.model_id, "haiku");

        settings.set_provider("local");
        assert_eq!(settings.provider, "local");
        assert_eq!(settings.model_id, "haiku");
    }
}
