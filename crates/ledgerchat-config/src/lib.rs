// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Ledgerchat.
//!
//! TOML files plus environment overrides, merged with Figment, strictly
//! deserialized (`deny_unknown_fields`), then validated. Failures come back
//! as miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use ledgerchat_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("classifier mode: {}", config.classifier.mode);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AppConfig, ClassifierConfig, ClassifierMode, LedgerchatConfig, ProviderConfig, ServerConfig,
    StorageConfig, STAGE_GRACE,
};

/// Load configuration from the standard locations and validate it.
pub fn load_and_validate() -> Result<LedgerchatConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LedgerchatConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<LedgerchatConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

fn finish(
    loaded: Result<LedgerchatConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<LedgerchatConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read the config files that exist, for source spans in diagnostics.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_file_locations()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let shown = if path.is_relative() {
                std::env::current_dir()
                    .map(|d| d.join(&path))
                    .unwrap_or_else(|_| path.clone())
            } else {
                path.clone()
            };
            Some((shown.display().to_string(), content))
        })
        .collect()
}
