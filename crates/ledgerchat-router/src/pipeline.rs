// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end message handling: sanitize, classify, route.

use std::sync::Arc;

use ledgerchat_core::{
    Availability, ChatReply, HealthStatus, LedgerchatError, LookupAdapter, PluginAdapter,
    SanitizedMessage,
};
use ledgerchat_security::sanitize;
use tracing::{error, info};

use crate::cascade::{Classification, ClassificationCascade};
use crate::router::{IntentRouter, PROCESSING_ERROR_MESSAGE};

/// A reply together with how the message was classified.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: ChatReply,
    pub classification: Classification,
}

/// Health of every component the pipeline depends on.
#[derive(Debug, Clone)]
pub struct PipelineHealth {
    pub lookup: (String, HealthStatus),
    pub classifiers: Vec<(String, Availability)>,
}

impl PipelineHealth {
    /// The pipeline can answer as long as the lookup works; classifiers
    /// always fall back to patterns.
    pub fn is_serving(&self) -> bool {
        !matches!(self.lookup.1, HealthStatus::Unhealthy(_))
    }
}

/// Sanitizer, cascade and router wired together.
pub struct ChatPipeline {
    cascade: ClassificationCascade,
    router: IntentRouter,
}

impl ChatPipeline {
    pub fn new(cascade: ClassificationCascade, lookup: Arc<dyn LookupAdapter>) -> Self {
        Self {
            cascade,
            router: IntentRouter::new(lookup),
        }
    }

    pub fn cascade(&self) -> &ClassificationCascade {
        &self.cascade
    }

    /// Handle one message. Lookup faults are returned as errors.
    pub async fn handle(&self, raw: &str) -> Result<ChatOutcome, LedgerchatError> {
        self.handle_sanitized(sanitize(raw)).await
    }

    /// Handle a message that has already been sanitized.
    pub async fn handle_sanitized(
        &self,
        message: SanitizedMessage,
    ) -> Result<ChatOutcome, LedgerchatError> {
        let classification = self.cascade.classify_sanitized(message).await;
        let reply = self.router.route(&classification.result).await?;
        info!(
            source = %classification.source,
            status = %reply.status,
            elapsed_ms = classification.elapsed.as_millis() as u64,
            "message handled"
        );
        Ok(ChatOutcome {
            reply,
            classification,
        })
    }

    /// Handle one message, turning any fault into a generic error reply.
    pub async fn respond(&self, raw: &str) -> ChatReply {
        match self.handle(raw).await {
            Ok(outcome) => outcome.reply,
            Err(e) => {
                error!(error = %e, "failed to process message");
                ChatReply::error(PROCESSING_ERROR_MESSAGE)
            }
        }
    }

    pub async fn health(&self) -> PipelineHealth {
        let lookup = self.router.lookup();
        let status = match lookup.health_check().await {
            Ok(status) => status,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        };
        PipelineHealth {
            lookup: (lookup.name().to_string(), status),
            classifiers: self.cascade.availability(),
        }
    }

    /// Shut down every adapter, lookup last.
    pub async fn shutdown(&self) -> Result<(), LedgerchatError> {
        for stage in self.cascade.stages() {
            stage.shutdown().await?;
        }
        self.router.lookup().shutdown().await
    }
}
