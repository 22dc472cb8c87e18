// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! One request per call, bounded by the client timeout. Retrying is left to
//! the cascade, which moves on to the next classifier instead.

use std::time::Duration;

use ledgerchat_config::ProviderConfig;
use ledgerchat_core::LedgerchatError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
};

/// Authenticated chat-completions client for one provider.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    json_mode: bool,
}

impl ChatClient {
    /// Build a client for `config` authenticated with `api_key`.
    pub fn new(
        config: &ProviderConfig,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, LedgerchatError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            LedgerchatError::Config(format!(
                "{}: API key contains characters not allowed in a header",
                config.name
            ))
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerchatError::Classifier {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            json_mode: config.json_mode,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body for one user message.
    pub fn build_request(&self, system: &str, user: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.temperature,
            response_format: self.json_mode.then(ResponseFormat::json_object),
        }
    }

    /// Send one completion request and return the first choice's content.
    ///
    /// Errors carry the provider's own description; callers must redact
    /// them before logging and never show them to users.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LedgerchatError> {
        let request = self.build_request(system, user);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerchatError::Classifier {
                        message: "request timed out".into(),
                        source: Some(Box::new(e)),
                    }
                } else {
                    LedgerchatError::Classifier {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| LedgerchatError::Classifier {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "API error {status} ({}): {}",
                    api_err.error.error_type.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(LedgerchatError::Classifier {
                message,
                source: None,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LedgerchatError::Classifier {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;

        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| LedgerchatError::Classifier {
                message: "response has no message content".into(),
                source: None,
            })
    }
}
