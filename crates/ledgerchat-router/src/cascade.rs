// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The classification cascade.
//!
//! Remote classifiers are consulted in a fixed order chosen by
//! [`ClassifierMode`]. The first stage that returns anything other than a
//! provider failure wins; later stages are never consulted. The pattern
//! classifier is the unconditional last stage and cannot fail, so the cascade
//! as a whole always produces a verdict.
//!
//! Within one request no stage is retried. A stage that is unconfigured is
//! skipped without any I/O; a stage that failed on an earlier request is still
//! attempted once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ledgerchat_config::{ClassifierMode, STAGE_GRACE};
use ledgerchat_core::{Availability, ClassifierAdapter, IntentResult, SanitizedMessage};
use ledgerchat_security::sanitize;
use tracing::{debug, info, warn};

use crate::classifier::PatternClassifier;

/// Name reported for verdicts produced by the pattern classifier.
pub const PATTERN_STAGE: &str = "patterns";

/// A verdict and where it came from.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The message after sanitization.
    pub message: SanitizedMessage,
    pub result: IntentResult,
    /// Name of the stage that produced `result`.
    pub source: String,
    /// Remote stages that were attempted and failed before `source`.
    pub failed_stages: Vec<String>,
    pub elapsed: Duration,
}

impl Classification {
    pub fn used_fallback(&self) -> bool {
        self.source == PATTERN_STAGE
    }
}

/// Ordered remote stages followed by the pattern classifier.
pub struct ClassificationCascade {
    mode: ClassifierMode,
    stages: Vec<Arc<dyn ClassifierAdapter>>,
    terminal: PatternClassifier,
    call_timeout: Duration,
}

impl ClassificationCascade {
    /// Order `primary` and `secondary` according to `mode`.
    pub fn new(
        mode: ClassifierMode,
        primary: Arc<dyn ClassifierAdapter>,
        secondary: Arc<dyn ClassifierAdapter>,
        call_timeout: Duration,
    ) -> Self {
        let stages = match mode {
            ClassifierMode::Auto => vec![primary, secondary],
            ClassifierMode::Primary => vec![primary],
            ClassifierMode::Secondary => vec![secondary],
            ClassifierMode::Local => Vec::new(),
        };
        info!(
            mode = %mode,
            stages = ?stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "classification cascade configured"
        );
        Self {
            mode,
            stages,
            terminal: PatternClassifier::new(),
            call_timeout,
        }
    }

    /// A cascade with only the pattern classifier.
    pub fn local_only() -> Self {
        Self {
            mode: ClassifierMode::Local,
            stages: Vec::new(),
            terminal: PatternClassifier::new(),
            call_timeout: Duration::from_secs(1),
        }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Remote stages in the order they are consulted.
    pub fn stages(&self) -> &[Arc<dyn ClassifierAdapter>] {
        &self.stages
    }

    /// Availability of every stage, the pattern classifier last.
    pub fn availability(&self) -> Vec<(String, Availability)> {
        self.stages
            .iter()
            .map(|s| (s.name().to_string(), s.availability()))
            .chain(std::iter::once((
                PATTERN_STAGE.to_string(),
                Availability::Ready,
            )))
            .collect()
    }

    /// Sanitize a raw message and classify it.
    pub async fn classify(&self, raw: &str) -> Classification {
        self.classify_sanitized(sanitize(raw)).await
    }

    /// Classify a message that has already been sanitized.
    pub async fn classify_sanitized(&self, message: SanitizedMessage) -> Classification {
        let started = Instant::now();
        let mut failed_stages = Vec::new();

        for stage in &self.stages {
            let name = stage.name();
            if stage.availability() == Availability::Unconfigured {
                debug!(stage = name, "skipping unconfigured classifier");
                continue;
            }

            // The remote client enforces `call_timeout` itself; the grace lets it
            // record the failure before the stage is abandoned here.
            let budget = self.call_timeout + STAGE_GRACE;
            let result = match tokio::time::timeout(budget, stage.classify(&message)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(stage = name, timeout = ?budget, "classifier timed out");
                    failed_stages.push(name.to_string());
                    continue;
                }
            };

            if result.is_provider_failure() {
                warn!(
                    stage = name,
                    error = result.error.as_deref().unwrap_or_default(),
                    "classifier failed, falling through"
                );
                failed_stages.push(name.to_string());
                continue;
            }

            info!(
                stage = name,
                intent = %result.intent.kind(),
                confidence = ?result.confidence,
                "intent classified"
            );
            return Classification {
                message,
                result,
                source: name.to_string(),
                failed_stages,
                elapsed: started.elapsed(),
            };
        }

        let result = self.terminal.classify_message(&message);
        info!(
            stage = PATTERN_STAGE,
            intent = %result.intent.kind(),
            confidence = ?result.confidence,
            failed = failed_stages.len(),
            "intent classified"
        );
        Classification {
            message,
            result,
            source: PATTERN_STAGE.to_string(),
            failed_stages,
            elapsed: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchat_core::{Intent, PluginAdapter};
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn local_cascade_logs_pattern_verdict() {
        let cascade = ClassificationCascade::local_only();
        assert_eq!(cascade.mode(), ClassifierMode::Local);

        let c = cascade.classify("cuántos deudores hay").await;
        assert_eq!(c.result.intent, Intent::CountDebtors);
        assert!(c.used_fallback());
        assert!(logs_contain("intent classified"));
    }

    #[test]
    fn pattern_stage_is_always_reported_ready() {
        let availability = ClassificationCascade::local_only().availability();
        assert_eq!(
            availability,
            vec![(PATTERN_STAGE.to_string(), Availability::Ready)]
        );
        assert_eq!(PatternClassifier::new().name(), PATTERN_STAGE);
    }
}
