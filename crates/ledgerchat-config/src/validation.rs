// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Collects every problem instead of failing on the first one.

use std::time::Duration;

use crate::diagnostic::ConfigError;
use crate::model::{LedgerchatConfig, ProviderConfig, STAGE_GRACE};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &LedgerchatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.app.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "app.log_level `{}` must be one of: {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::validation(
            "server.bind_address must not be empty",
        ));
    } else {
        let is_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = addr
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.bind_address `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.max_body_bytes == 0 {
        errors.push(ConfigError::validation(
            "server.max_body_bytes must be greater than zero",
        ));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "server.request_timeout_secs must be greater than zero",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.classifier.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "classifier.timeout_secs must be greater than zero",
        ));
    }

    let request_budget = Duration::from_secs(config.server.request_timeout_secs);
    let worst_case = config.classifier.worst_case();
    if config.server.request_timeout_secs > 0 && request_budget <= worst_case {
        errors.push(ConfigError::validation(format!(
            "server.request_timeout_secs ({}s) must exceed the worst-case classification time \
             of {:.1}s in `{}` mode ({} remote stage(s) x classifier.timeout_secs + {}ms grace), \
             otherwise slow providers end the request before the pattern classifier runs",
            config.server.request_timeout_secs,
            worst_case.as_secs_f64(),
            config.classifier.mode,
            config.classifier.mode.remote_stages(),
            STAGE_GRACE.as_millis(),
        )));
    }

    validate_provider("primary", &config.primary, &mut errors);
    validate_provider("secondary", &config.secondary, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_provider(section: &str, provider: &ProviderConfig, errors: &mut Vec<ConfigError>) {
    if provider.name.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "{section}.name must not be empty"
        )));
    }

    let url = provider.base_url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        errors.push(ConfigError::validation(format!(
            "{section}.base_url `{url}` must start with http:// or https://"
        )));
    }

    if provider.model.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "{section}.model must not be empty"
        )));
    }

    if !(0.0..=2.0).contains(&provider.temperature) {
        errors.push(ConfigError::validation(format!(
            "{section}.temperature must be between 0 and 2, got {}",
            provider.temperature
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&LedgerchatConfig::default()).is_ok());
    }

    #[test]
    fn uppercase_log_level_is_accepted() {
        let mut config = LedgerchatConfig::default();
        config.app.log_level = "INFO".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = LedgerchatConfig::default();
        config.app.log_level = "loud".into();
        config.server.bind_address = "not an address!".into();
        config.classifier.timeout_secs = 0;
        config.primary.base_url = "ftp://example.com".into();
        config.secondary.temperature = 3.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn request_timeout_must_outlast_remote_stages() {
        let mut config = LedgerchatConfig::default();
        config.classifier.timeout_secs = 20;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("request_timeout_secs"));

        // One remote stage fits: 20.5s < 30s.
        config.classifier.mode = crate::model::ClassifierMode::Primary;
        assert!(validate_config(&config).is_ok());

        // Exactly the worst case is still too tight.
        config.classifier.mode = crate::model::ClassifierMode::Auto;
        config.classifier.timeout_secs = 14;
        config.server.request_timeout_secs = 29;
        assert!(validate_config(&config).is_err());
        config.server.request_timeout_secs = 30;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn local_mode_ignores_classifier_timeout() {
        let mut config = LedgerchatConfig::default();
        config.classifier.mode = crate::model::ClassifierMode::Local;
        config.classifier.timeout_secs = 600;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn missing_credentials_are_not_an_error() {
        let mut config = LedgerchatConfig::default();
        config.classifier.mode = crate::model::ClassifierMode::Primary;
        config.primary.api_key = None;
        assert!(validate_config(&config).is_ok());
    }
}
