// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared startup: tracing, storage, classifiers and the pipeline.

use std::sync::Arc;
use std::time::Duration;

use ledgerchat_config::{ClassifierMode, LedgerchatConfig, ProviderConfig};
use ledgerchat_core::{ClassifierAdapter, LedgerchatError, LookupAdapter};
use ledgerchat_openai::RemoteClassifier;
use ledgerchat_router::{ChatPipeline, ClassificationCascade};
use ledgerchat_security::mask_secret;
use ledgerchat_storage::SqliteLookup;
use tracing::{info, warn};

/// Install the global tracing subscriber. Output goes to stderr so that
/// commands printing JSON keep stdout clean.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("ledgerchat={log_level},tower_http=info,warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Log which providers have credentials, keys masked.
pub fn log_credentials(config: &LedgerchatConfig) {
    for (role, provider) in [("primary", &config.primary), ("secondary", &config.secondary)] {
        match provider.credential() {
            Some(key) => info!(
                role,
                provider = %provider.name,
                key = %mask_secret(key),
                "API key configured"
            ),
            None => warn!(role, provider = %provider.name, "API key not configured"),
        }
    }

    let single = match config.classifier.mode {
        ClassifierMode::Primary => Some(&config.primary),
        ClassifierMode::Secondary => Some(&config.secondary),
        ClassifierMode::Auto | ClassifierMode::Local => None,
    };
    if let Some(provider) = single.filter(|p| p.credential().is_none()) {
        warn!(
            mode = %config.classifier.mode,
            provider = %provider.name,
            "selected provider has no API key, every message will use the pattern classifier"
        );
    }
    info!(mode = %config.classifier.mode, "intent detection mode");
}

/// Build one remote classifier.
pub fn remote_classifier(
    provider: &ProviderConfig,
    timeout: Duration,
) -> Result<Arc<dyn ClassifierAdapter>, LedgerchatError> {
    Ok(Arc::new(RemoteClassifier::new(provider, timeout)?))
}

/// Open storage and assemble the full pipeline from configuration.
pub async fn build_pipeline(config: &LedgerchatConfig) -> Result<ChatPipeline, LedgerchatError> {
    let lookup: Arc<dyn LookupAdapter> =
        Arc::new(SqliteLookup::open(config.storage.clone()).await?);

    let timeout = Duration::from_secs(config.classifier.timeout_secs);
    let cascade = ClassificationCascade::new(
        config.classifier.mode,
        remote_classifier(&config.primary, timeout)?,
        remote_classifier(&config.secondary, timeout)?,
        timeout,
    );

    Ok(ChatPipeline::new(cascade, lookup))
}

/// Render the configuration as TOML with API keys masked.
pub fn render_config(config: &LedgerchatConfig) -> Result<String, LedgerchatError> {
    let mut shown = config.clone();
    for provider in [&mut shown.primary, &mut shown.secondary] {
        provider.api_key = provider.api_key.as_deref().map(mask_secret);
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| LedgerchatError::Internal(format!("failed to render config: {e}")))
}
