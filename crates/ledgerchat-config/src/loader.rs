// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Files: `/etc/ledgerchat/ledgerchat.toml`, then the user config dir, then
//! `./ledgerchat.toml`. Environment: the unprefixed variables older
//! deployments use (`DEEPSEEK_API_KEY`, `NLP_SERVICE`, ...), then
//! `LEDGERCHAT_*` which wins over everything.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LedgerchatConfig;

/// Config file name searched in every location.
pub const CONFIG_FILE_NAME: &str = "ledgerchat.toml";

/// Unprefixed environment variables and the keys they set.
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("DEEPSEEK_API_KEY", "primary.api_key"),
    ("DEEPSEEK_MODEL", "primary.model"),
    ("OPENAI_API_KEY", "secondary.api_key"),
    ("OPENAI_MODEL", "secondary.model"),
    ("NLP_SERVICE", "classifier.mode"),
    ("LOG_LEVEL", "app.log_level"),
    ("DATABASE_PATH", "storage.database_path"),
];

const SECTIONS: &[&str] = &["app", "server", "storage", "classifier", "primary", "secondary"];

/// Candidate config files, lowest precedence first.
pub fn config_file_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/ledgerchat").join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ledgerchat").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Build the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(LedgerchatConfig::default()));
    for path in config_file_locations() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(legacy_env_provider()).merge(env_provider())
}

/// Load configuration from the standard locations with env var overrides.
pub fn load_config() -> Result<LedgerchatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only: no files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<LedgerchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LedgerchatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LedgerchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LedgerchatConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// `LEDGERCHAT_<SECTION>_<KEY>` variables.
///
/// Only the first underscore after the section name becomes a dot, so
/// `LEDGERCHAT_PRIMARY_API_KEY` maps to `primary.api_key`.
fn env_provider() -> Env {
    Env::prefixed("LEDGERCHAT_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str);
        mapped.into()
    })
}

fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV_KEYS
            .iter()
            .find(|(name, _)| key == *name)
            .map(|(_, target)| (*target).to_string())
            .unwrap_or_else(|| key.as_str().to_string())
            .into()
    })
}
