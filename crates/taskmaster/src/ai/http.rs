//! HTTP plumbing shared by the vendor backends.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{TasksError, TasksResult};

/// Pulls a human-readable message out of a vendor error body.
pub(crate) type ErrorBodyParser = fn(&str) -> Option<String>;

/// Endpoint, credentials and client for one vendor API.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    vendor: &'static str,
    key_var: &'static str,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpBackend {
    pub(crate) fn new(
        vendor: &'static str,
        key_var: &'static str,
        endpoint: &str,
        api_key: Option<String>,
    ) -> Self {
        Self {
            vendor,
            key_var,
            endpoint: endpoint.to_string(),
            api_key,
            client: Client::new(),
        }
    }

    /// Read the key from `key_var`. A blank value counts as unset.
    pub(crate) fn from_env(vendor: &'static str, key_var: &'static str, endpoint: &str) -> Self {
        let api_key = std::env::var(key_var)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(vendor, key_var, endpoint, api_key)
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub(crate) fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn key(&self) -> TasksResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| TasksError::ProviderNotConfigured {
                provider: format!("{} ({} not set)", self.vendor, self.key_var),
            })
    }

    /// POST `body` as JSON and decode a successful reply.
    ///
    /// Every failure, from connect errors to an undecodable body, comes
    /// back as `ModelResponse`.
    pub(crate) async fn post_json<B, R>(
        &self,
        headers: &[(&str, &str)],
        body: &B,
        error_message: ErrorBodyParser,
    ) -> TasksResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(&self.endpoint).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            TasksError::model_response(format!("{} request failed: {e}", self.vendor))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TasksError::model_response(format!("{} response could not be read: {e}", self.vendor))
        })?;

        if !status.is_success() {
            let detail = error_message(&text).unwrap_or(text);
            tracing::warn!(vendor = self.vendor, %status, "Model backend returned an error");
            return Err(TasksError::model_response(format!(
                "{} API error ({status}): {detail}",
                self.vendor
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            TasksError::model_response(format!("{} response was not understood: {e}", self.vendor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_names_the_variable() {
        let backend = HttpBackend::new("Example", "EXAMPLE_KEY", "http://localhost", None);
        assert!(!backend.has_key());

        let err = backend.key().unwrap_err();
        assert_eq!(
            err,
            TasksError::ProviderNotConfigured {
                provider: "Example (EXAMPLE_KEY not set)".to_string()
            }
        );
    }

    #[test]
    fn test_key_present() {
        let backend = HttpBackend::new("Example", "EXAMPLE_KEY", "http://localhost", Some("k".into()));
        assert_eq!(backend.key().unwrap(), "k");
    }
}
