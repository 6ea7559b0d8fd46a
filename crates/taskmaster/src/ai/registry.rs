//! Provider Registry - Manages AI provider instances.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::entities::ModelSettings;
use crate::errors::{TasksError, TasksResult};

use super::anthropic::AnthropicProvider;
use super::openai::OpenAIProvider;
use super::provider::AIProvider;

/// Registry of model backends, keyed by provider name.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn AIProvider>>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the built-in providers, keys read from the environment.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(AnthropicProvider::from_env()));
        registry.register(Arc::new(OpenAIProvider::from_env()));
        registry
    }

    /// Like [`with_defaults`](Self::with_defaults), with the settings' base
    /// URL applied to the selected provider.
    pub fn for_settings(settings: &ModelSettings) -> Self {
        let registry = Self::with_defaults();
        if let Some(url) = &settings.base_url {
            match settings.provider.as_str() {
                "anthropic" => {
                    registry.register(Arc::new(AnthropicProvider::from_env().with_base_url(url)));
                }
                "openai" => {
                    registry.register(Arc::new(OpenAIProvider::from_env().with_base_url(url)));
                }
                other => tracing::warn!(provider = other, "baseURL set for unknown provider"),
            }
        }
        registry
    }

    /// Register a provider, replacing any with the same name.
    pub fn register(&self, provider: Arc<dyn AIProvider>) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(provider.name().to_string(), provider);
    }

    /// Get a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AIProvider>> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.get(name).cloned()
    }

    /// Get all registered provider names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get a configured provider by name.
    pub fn require(&self, name: &str) -> TasksResult<Arc<dyn AIProvider>> {
        let provider = self
            .get(name)
            .ok_or_else(|| TasksError::ProviderNotConfigured {
                provider: format!(
                    "{name} (unknown provider; known: {})",
                    self.provider_names().join(", ")
                ),
            })?;
        if !provider.is_configured() {
            return Err(TasksError::ProviderNotConfigured {
                provider: format!("{name} ({} not set)", provider.api_key_env_var()),
            });
        }
        Ok(provider)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = ProviderRegistry::new();
        assert!(registry.provider_names().is_empty());
        assert!(registry.get("anthropic").is_none());
    }

    #[test]
    fn test_provider_registration() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(OpenAIProvider::new("key")));

        assert_eq!(registry.provider_names(), vec!["openai"]);
        assert_eq!(registry.require("openai").unwrap().name(), "openai");
    }

    #[test]
    fn test_require_unknown_provider_lists_known_ones() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(OpenAIProvider::new("key")));
        registry.register(Arc::new(AnthropicProvider::new("key")));

        let err = registry.require("mistral").err().unwrap();
        assert_eq!(
            err,
            TasksError::ProviderNotConfigured {
                provider: "mistral (unknown provider; known: anthropic, openai)".to_string()
            }
        );
    }

    #[test]
    fn test_defaults_register_both() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.provider_names(), vec!["anthropic", "openai"]);
    }
}
