// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos in
//! `ledgerchat.toml` are rejected at startup instead of silently ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Top-level Ledgerchat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerchatConfig {
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP entrypoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite lookup store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Classification cascade settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// First remote classifier consulted (DeepSeek by default).
    #[serde(default = "ProviderConfig::primary_default")]
    pub primary: ProviderConfig,

    /// Second remote classifier consulted (OpenAI by default).
    #[serde(default = "ProviderConfig::secondary_default")]
    pub secondary: ProviderConfig,
}

impl Default for LedgerchatConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            classifier: ClassifierConfig::default(),
            primary: ProviderConfig::primary_default(),
            secondary: ProviderConfig::secondary_default(),
        }
    }
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). Case-insensitive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "ledgerchat".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Upper bound on the time spent answering one chat request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// SQLite lookup store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Insert the five demo buyers and debtors into empty tables.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
            seed_demo_data: true,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    "ledgerchat.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

/// Which classifier stages the cascade may consult before the pattern
/// classifier. The pattern classifier always runs last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClassifierMode {
    /// Primary, then secondary, then patterns.
    #[default]
    Auto,
    /// Primary only, then patterns.
    #[serde(alias = "primary_only", alias = "deepseek")]
    Primary,
    /// Secondary only, then patterns.
    #[serde(alias = "secondary_only", alias = "openai")]
    Secondary,
    /// Patterns only.
    #[serde(alias = "local_only", alias = "fallback")]
    Local,
}

impl ClassifierMode {
    /// Remote stages consulted before the pattern classifier.
    pub fn remote_stages(self) -> u32 {
        match self {
            Self::Auto => 2,
            Self::Primary | Self::Secondary => 1,
            Self::Local => 0,
        }
    }
}

/// Extra time a remote stage gets past `classifier.timeout_secs` before the
/// cascade abandons it.
pub const STAGE_GRACE: Duration = Duration::from_millis(500);

/// Cascade settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub mode: ClassifierMode,

    /// Budget for a single remote classifier call.
    #[serde(default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Auto,
            timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    /// Longest time the cascade may wait on one remote stage.
    pub fn stage_budget(&self) -> Duration {
        Duration::from_secs(self.timeout_secs) + STAGE_GRACE
    }

    /// Longest time the cascade may spend before the pattern classifier runs.
    pub fn worst_case(&self) -> Duration {
        self.stage_budget() * self.mode.remote_stages()
    }
}

fn default_classifier_timeout_secs() -> u64 {
    10
}

/// An OpenAI-compatible chat-completions endpoint used as a classifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Name used in logs and health reports.
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// API key. Absent or blank leaves the provider unconfigured.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Send `response_format: {"type": "json_object"}`.
    #[serde(default)]
    pub json_mode: bool,
}

impl ProviderConfig {
    pub fn primary_default() -> Self {
        Self {
            name: "deepseek".to_string(),
            api_key: None,
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: default_temperature(),
            json_mode: false,
        }
    }

    pub fn secondary_default() -> Self {
        Self {
            name: "openai".to_string(),
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
            json_mode: true,
        }
    }

    /// The API key, if one is set and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn default_provider_name() -> String {
    "provider".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}
