// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` wires mock classifiers and either a [`MockLookup`] or a
//! seeded SQLite database in a temp directory into a [`ChatPipeline`].

use std::sync::Arc;
use std::time::Duration;

use ledgerchat_config::{ClassifierMode, StorageConfig};
use ledgerchat_core::{ChatReply, LedgerchatError, LookupAdapter};
use ledgerchat_router::{ChatOutcome, ChatPipeline, ClassificationCascade};
use ledgerchat_storage::SqliteLookup;

use crate::mock_classifier::MockClassifier;
use crate::mock_lookup::MockLookup;

/// Builder for test environments.
///
/// Defaults: `auto` mode, both remote stages unconfigured, seeded SQLite.
pub struct TestHarnessBuilder {
    mode: ClassifierMode,
    primary: Option<MockClassifier>,
    secondary: Option<MockClassifier>,
    lookup: Option<MockLookup>,
    call_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            mode: ClassifierMode::Auto,
            primary: None,
            secondary: None,
            lookup: None,
            call_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_mode(mut self, mode: ClassifierMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_primary(mut self, classifier: MockClassifier) -> Self {
        self.primary = Some(classifier);
        self
    }

    pub fn with_secondary(mut self, classifier: MockClassifier) -> Self {
        self.secondary = Some(classifier);
        self
    }

    /// Use an in-memory lookup instead of SQLite.
    pub fn with_mock_lookup(mut self, lookup: MockLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub async fn build(self) -> Result<TestHarness, LedgerchatError> {
        let primary = Arc::new(
            self.primary
                .unwrap_or_else(|| MockClassifier::unconfigured("primary")),
        );
        let secondary = Arc::new(
            self.secondary
                .unwrap_or_else(|| MockClassifier::unconfigured("secondary")),
        );

        let (lookup, mock_lookup, temp_dir) = match self.lookup {
            Some(mock) => {
                let mock = Arc::new(mock);
                let lookup: Arc<dyn LookupAdapter> = mock.clone();
                (lookup, Some(mock), None)
            }
            None => {
                let temp_dir = tempfile::TempDir::new().map_err(LedgerchatError::storage)?;
                let config = StorageConfig {
                    database_path: temp_dir
                        .path()
                        .join("test.db")
                        .to_string_lossy()
                        .into_owned(),
                    ..StorageConfig::default()
                };
                let lookup: Arc<dyn LookupAdapter> = Arc::new(SqliteLookup::open(config).await?);
                (lookup, None, Some(temp_dir))
            }
        };

        let cascade = ClassificationCascade::new(
            self.mode,
            primary.clone(),
            secondary.clone(),
            self.call_timeout,
        );

        Ok(TestHarness {
            pipeline: ChatPipeline::new(cascade, lookup),
            primary,
            secondary,
            mock_lookup,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete pipeline with inspectable mocks.
pub struct TestHarness {
    pub pipeline: ChatPipeline,
    pub primary: Arc<MockClassifier>,
    pub secondary: Arc<MockClassifier>,
    /// Set when the harness was built with [`TestHarnessBuilder::with_mock_lookup`].
    pub mock_lookup: Option<Arc<MockLookup>>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a message and return the caller-facing reply.
    pub async fn send_message(&self, text: &str) -> ChatReply {
        self.pipeline.respond(text).await
    }

    /// Send a message and return the reply with its classification.
    pub async fn handle(&self, text: &str) -> Result<ChatOutcome, LedgerchatError> {
        self.pipeline.handle(text).await
    }
}
