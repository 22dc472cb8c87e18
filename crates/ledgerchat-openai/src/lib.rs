// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote intent classifier for OpenAI-compatible chat-completions APIs.
//!
//! [`RemoteClassifier`] implements [`ClassifierAdapter`]. The same type backs
//! both the primary (DeepSeek by default) and the secondary (OpenAI) stage;
//! only the [`ProviderConfig`] differs.

pub mod client;
pub mod parse;
pub mod prompt;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use ledgerchat_config::ProviderConfig;
use ledgerchat_core::{
    AdapterType, Availability, AvailabilityCell, ClassifierAdapter, HealthStatus, IntentResult,
    LedgerchatError, PluginAdapter, SanitizedMessage,
};
use ledgerchat_security::redact;
use tracing::{debug, info, warn};

pub use crate::client::ChatClient;
pub use crate::parse::parse_intent_reply;
pub use crate::prompt::SYSTEM_PROMPT;

/// Error text attached to failed classifications.
///
/// Fixed so that provider responses and credentials never travel further.
pub const REQUEST_FAILED: &str = "intent classification request failed";

/// Error text when a stage without a key is called directly.
pub const NOT_CONFIGURED: &str = "classifier is not configured";

/// A chat-completions backed classifier.
pub struct RemoteClassifier {
    name: String,
    /// `None` when no API key is configured.
    client: Option<ChatClient>,
    api_key: Option<String>,
    availability: AvailabilityCell,
}

impl RemoteClassifier {
    /// Build a classifier from provider settings.
    ///
    /// A missing or blank key yields a permanently unconfigured classifier
    /// rather than an error.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, LedgerchatError> {
        let Some(key) = config.credential() else {
            info!(provider = %config.name, "no API key configured, classifier disabled");
            return Ok(Self {
                name: config.name.clone(),
                client: None,
                api_key: None,
                availability: AvailabilityCell::new(Availability::Unconfigured),
            });
        };

        let client = ChatClient::new(config, key, timeout)?;
        info!(
            provider = %config.name,
            model = %client.model(),
            endpoint = %client.endpoint(),
            "remote classifier initialized"
        );
        Ok(Self {
            name: config.name.clone(),
            client: Some(client),
            api_key: Some(key.to_string()),
            availability: AvailabilityCell::new(Availability::Ready),
        })
    }

    fn redact(&self, text: &str) -> String {
        let secrets: Vec<&str> = self.api_key.as_deref().into_iter().collect();
        redact(text, &secrets)
    }
}

#[async_trait]
impl PluginAdapter for RemoteClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    /// Reports the cached availability; does not contact the provider.
    async fn health_check(&self) -> Result<HealthStatus, LedgerchatError> {
        Ok(match self.availability.get() {
            Availability::Ready => HealthStatus::Healthy,
            Availability::Unconfigured => HealthStatus::Degraded("no API key configured".into()),
            Availability::Unreachable => HealthStatus::Degraded("last request failed".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), LedgerchatError> {
        Ok(())
    }
}

#[async_trait]
impl ClassifierAdapter for RemoteClassifier {
    fn availability(&self) -> Availability {
        self.availability.get()
    }

    async fn classify(&self, message: &SanitizedMessage) -> IntentResult {
        let Some(client) = &self.client else {
            return IntentResult::failed(NOT_CONFIGURED);
        };

        match client.complete(SYSTEM_PROMPT, message.as_str()).await {
            Ok(content) => {
                self.availability.record(true);
                let result = parse_intent_reply(&content);
                debug!(provider = %self.name, intent = %result.intent.kind(), "provider verdict");
                result
            }
            Err(e) => {
                self.availability.record(false);
                warn!(
                    provider = %self.name,
                    error = %self.redact(&e.to_string()),
                    "intent classification failed"
                );
                IntentResult::failed(REQUEST_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchat_core::{Intent, Limit};
    use ledgerchat_security::sanitize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "sk-live-0123456789abcdefghij";

    fn provider(base_url: &str, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name: "primary".into(),
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            model: "deepseek-chat".into(),
            temperature: 0.1,
            json_mode: false,
        }
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    #[tokio::test]
    async fn unconfigured_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("{}"))
            .expect(0)
            .mount(&server)
            .await;

        for key in [None, Some(""), Some("   ")] {
            let classifier =
                RemoteClassifier::new(&provider(&server.uri(), key), Duration::from_secs(1))
                    .unwrap();
            assert_eq!(classifier.availability(), Availability::Unconfigured);
            let result = classifier.classify(&sanitize("top buyers")).await;
            assert!(result.is_provider_failure());
        }
    }

    #[tokio::test]
    async fn verdict_is_parsed_and_marks_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(reply(r#"{"intent":"top_debtors","parameters":{"limit":2}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let classifier =
            RemoteClassifier::new(&provider(&server.uri(), Some(KEY)), Duration::from_secs(5))
                .unwrap();
        let result = classifier.classify(&sanitize("dame los top 2 deudores")).await;
        assert_eq!(
            result.intent,
            Intent::TopDebtors {
                limit: Limit::new(2)
            }
        );
        assert!(result.error.is_none());
        assert_eq!(classifier.availability(), Availability::Ready);
    }

    #[tokio::test]
    async fn server_error_becomes_fixed_failure_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(format!(
                "internal failure while using key {KEY}"
            )))
            .expect(1)
            .mount(&server)
            .await;

        let classifier =
            RemoteClassifier::new(&provider(&server.uri(), Some(KEY)), Duration::from_secs(5))
                .unwrap();
        let result = classifier.classify(&sanitize("top buyers")).await;
        assert!(result.is_provider_failure());
        assert_eq!(result.error.as_deref(), Some(REQUEST_FAILED));
        assert_eq!(classifier.availability(), Availability::Unreachable);
        assert!(matches!(
            classifier.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[tokio::test]
    async fn recovers_to_ready_after_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(reply(r#"{"intent":"count_buyers"}"#))
            .mount(&server)
            .await;

        let classifier =
            RemoteClassifier::new(&provider(&server.uri(), Some(KEY)), Duration::from_secs(5))
                .unwrap();
        assert!(classifier.classify(&sanitize("x")).await.is_provider_failure());
        assert_eq!(classifier.availability(), Availability::Unreachable);

        // No retry inside one call: the second call is a new request.
        let result = classifier.classify(&sanitize("cuántos compradores hay")).await;
        assert_eq!(result.intent, Intent::CountBuyers);
        assert_eq!(classifier.availability(), Availability::Ready);
    }

    #[tokio::test]
    async fn unparseable_reply_is_legitimate_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("I'd rather talk about the weather."))
            .mount(&server)
            .await;

        let classifier =
            RemoteClassifier::new(&provider(&server.uri(), Some(KEY)), Duration::from_secs(5))
                .unwrap();
        let result = classifier.classify(&sanitize("hola")).await;
        assert_eq!(result.intent, Intent::Unknown);
        assert!(!result.is_provider_failure());
    }

    #[test]
    fn redaction_hides_configured_key() {
        let classifier =
            RemoteClassifier::new(&provider("http://localhost:1", Some(KEY)), Duration::from_secs(1))
                .unwrap();
        let redacted = classifier.redact(&format!("bad key {KEY} rejected"));
        assert!(!redacted.contains(KEY));
    }
}
