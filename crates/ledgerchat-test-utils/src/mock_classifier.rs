// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock classifier adapter for deterministic cascade tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ledgerchat_core::{
    AdapterType, Availability, AvailabilityCell, ClassifierAdapter, HealthStatus, IntentResult,
    LedgerchatError, PluginAdapter, SanitizedMessage,
};

/// How a [`MockClassifier`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Pop the next scripted result; `Unknown` once the script runs out.
    Scripted,
    /// Every call is a provider failure.
    Failing,
    /// Every call never completes.
    Hanging,
}

/// A classifier that replays pre-configured results.
///
/// Counts calls and records every message it was asked about.
pub struct MockClassifier {
    name: String,
    behavior: MockBehavior,
    results: Arc<Mutex<VecDeque<IntentResult>>>,
    seen: Arc<Mutex<Vec<String>>>,
    calls: AtomicUsize,
    availability: AvailabilityCell,
}

impl MockClassifier {
    fn build(name: &str, behavior: MockBehavior, availability: Availability) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            results: Arc::new(Mutex::new(VecDeque::new())),
            seen: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
            availability: AvailabilityCell::new(availability),
        }
    }

    /// A ready classifier with an empty script.
    pub fn new(name: &str) -> Self {
        Self::build(name, MockBehavior::Scripted, Availability::Ready)
    }

    /// A ready classifier pre-loaded with results.
    pub fn with_results(name: &str, results: Vec<IntentResult>) -> Self {
        Self {
            results: Arc::new(Mutex::new(VecDeque::from(results))),
            ..Self::new(name)
        }
    }

    pub fn failing(name: &str) -> Self {
        Self::build(name, MockBehavior::Failing, Availability::Ready)
    }

    pub fn hanging(name: &str) -> Self {
        Self::build(name, MockBehavior::Hanging, Availability::Ready)
    }

    /// A classifier with no credential. The cascade must never call it.
    pub fn unconfigured(name: &str) -> Self {
        Self::build(name, MockBehavior::Failing, Availability::Unconfigured)
    }

    pub async fn push_result(&self, result: IntentResult) {
        self.results.lock().await.push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages received so far, in order.
    pub async fn seen(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, LedgerchatError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LedgerchatError> {
        Ok(())
    }
}

#[async_trait]
impl ClassifierAdapter for MockClassifier {
    fn availability(&self) -> Availability {
        self.availability.get()
    }

    async fn classify(&self, message: &SanitizedMessage) -> IntentResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().await.push(message.as_str().to_string());

        match self.behavior {
            MockBehavior::Scripted => {
                self.availability.record(true);
                self.results
                    .lock()
                    .await
                    .pop_front()
                    .unwrap_or_else(|| IntentResult::unknown(None))
            }
            MockBehavior::Failing => {
                self.availability.record(false);
                IntentResult::failed("mock provider failure")
            }
            MockBehavior::Hanging => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchat_core::Intent;
    use ledgerchat_security::sanitize;

    #[tokio::test]
    async fn replays_script_then_unknown() {
        let mock = MockClassifier::with_results(
            "m",
            vec![IntentResult::new(Intent::CountBuyers, Some(0.9))],
        );
        assert_eq!(mock.classify(&sanitize("a")).await.intent, Intent::CountBuyers);
        let second = mock.classify(&sanitize("b")).await;
        assert_eq!(second.intent, Intent::Unknown);
        assert!(!second.is_provider_failure());
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.seen().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failing_marks_unreachable() {
        let mock = MockClassifier::failing("m");
        assert!(mock.classify(&sanitize("x")).await.is_provider_failure());
        assert_eq!(mock.availability(), Availability::Unreachable);
    }

    #[test]
    fn unconfigured_reports_unconfigured() {
        assert_eq!(
            MockClassifier::unconfigured("m").availability(),
            Availability::Unconfigured
        );
    }
}
