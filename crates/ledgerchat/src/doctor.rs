// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ledgerchat doctor` command implementation.
//!
//! Runs diagnostic checks against the environment: storage, provider
//! credentials, the classifier mode, and a running gateway.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use ledgerchat_config::{ClassifierMode, LedgerchatConfig, ProviderConfig};
use ledgerchat_core::{
    ClassifierAdapter, HealthStatus, LedgerchatError, LookupAdapter, PluginAdapter,
};
use ledgerchat_openai::RemoteClassifier;
use ledgerchat_security::{mask_secret, sanitize};
use ledgerchat_storage::{SqliteLookup, IN_MEMORY};

/// Message sent to each provider by `--probe`.
const PROBE_MESSAGE: &str = "¿Cuántos compradores hay?";

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `ledgerchat doctor` command.
///
/// With `--probe`, each configured provider receives one real classification
/// request. With `--plain`, colored output is disabled.
pub async fn run_doctor(
    config: &LedgerchatConfig,
    probe: bool,
    plain: bool,
) -> Result<(), LedgerchatError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config),
        check_database(config).await,
        check_provider("Primary", &config.primary, config, probe).await,
        check_provider("Secondary", &config.secondary, config, probe).await,
        check_mode(config),
        check_health_endpoint(config).await,
    ];

    println!();
    println!("  ledgerchat doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !probe {
            println!("  Run with --probe to test provider connectivity.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// The configuration was already loaded and validated by `main`.
fn check_config(config: &LedgerchatConfig) -> CheckResult {
    let start = Instant::now();
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!("valid (mode={})", config.classifier.mode),
        start,
    )
}

/// Open the database and count the records.
async fn check_database(config: &LedgerchatConfig) -> CheckResult {
    let start = Instant::now();
    let db_path = &config.storage.database_path;

    if db_path != IN_MEMORY && !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let lookup = match SqliteLookup::open(config.storage.clone()).await {
        Ok(lookup) => lookup,
        Err(e) => {
            return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };

    let result = match lookup.health_check().await {
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
        Ok(_) => match (lookup.count_buyers().await, lookup.count_debtors().await) {
            (Ok(buyers), Ok(debtors)) => {
                let status = if buyers == 0 && debtors == 0 {
                    CheckStatus::Warn
                } else {
                    CheckStatus::Pass
                };
                CheckResult::new(
                    "Database",
                    status,
                    format!("{buyers} buyers, {debtors} debtors"),
                    start,
                )
            }
            (Err(e), _) | (_, Err(e)) => {
                CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start)
            }
        },
    };

    let _ = lookup.shutdown().await;
    result
}

/// Whether `mode` ever consults the provider in the given role.
fn mode_uses(mode: ClassifierMode, role: &str) -> bool {
    match mode {
        ClassifierMode::Auto => true,
        ClassifierMode::Primary => role == "Primary",
        ClassifierMode::Secondary => role == "Secondary",
        ClassifierMode::Local => false,
    }
}

/// Credential presence, and with `probe` one live classification.
async fn check_provider(
    role: &str,
    provider: &ProviderConfig,
    config: &LedgerchatConfig,
    probe: bool,
) -> CheckResult {
    let start = Instant::now();
    let name = format!("{role} ({})", provider.name);

    if !mode_uses(config.classifier.mode, role) {
        return CheckResult::new(&name, CheckStatus::Pass, "not used in this mode", start);
    }

    let Some(key) = provider.credential() else {
        return CheckResult::new(&name, CheckStatus::Warn, "no API key configured", start);
    };

    if !probe {
        return CheckResult::new(
            &name,
            CheckStatus::Pass,
            format!("API key set ({})", mask_secret(key)),
            start,
        );
    }

    let timeout = Duration::from_secs(config.classifier.timeout_secs);
    let classifier = match RemoteClassifier::new(provider, timeout) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult::new(&name, CheckStatus::Fail, format!("client error: {e}"), start);
        }
    };

    let result = classifier.classify(&sanitize(PROBE_MESSAGE)).await;
    if result.is_provider_failure() {
        CheckResult::new(
            &name,
            CheckStatus::Fail,
            format!("unreachable ({})", classifier.availability()),
            start,
        )
    } else {
        CheckResult::new(
            &name,
            CheckStatus::Pass,
            format!("reachable (intent={})", result.intent.kind()),
            start,
        )
    }
}

/// Warn when the mode leaves only the pattern classifier in practice.
fn check_mode(config: &LedgerchatConfig) -> CheckResult {
    let start = Instant::now();
    let mode = config.classifier.mode;
    let usable = [("Primary", &config.primary), ("Secondary", &config.secondary)]
        .into_iter()
        .filter(|(role, p)| mode_uses(mode, role) && p.credential().is_some())
        .count();

    match (mode, usable) {
        (ClassifierMode::Local, _) => {
            CheckResult::new("Classifier mode", CheckStatus::Pass, "patterns only", start)
        }
        (_, 0) => CheckResult::new(
            "Classifier mode",
            CheckStatus::Warn,
            format!("{mode}: no remote stage has a key, patterns only"),
            start,
        ),
        (_, n) => CheckResult::new(
            "Classifier mode",
            CheckStatus::Pass,
            format!("{mode}: {n} remote stage(s) before patterns"),
            start,
        ),
    }
}

/// Check a running gateway's health endpoint.
async fn check_health_endpoint(config: &LedgerchatConfig) -> CheckResult {
    let start = Instant::now();
    let url = format!(
        "http://{}:{}/chatbot/health",
        config.server.bind_address, config.server.port
    );

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult::new(
                "Health endpoint",
                CheckStatus::Fail,
                format!("HTTP client error: {e}"),
                start,
            );
        }
    };

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            CheckResult::new("Health endpoint", CheckStatus::Pass, "reachable", start)
        }
        Ok(resp) => CheckResult::new(
            "Health endpoint",
            CheckStatus::Warn,
            format!("status {}", resp.status()),
            start,
        ),
        Err(_) => CheckResult::new(
            "Health endpoint",
            CheckStatus::Warn,
            format!("not reachable at {url} (server may not be running)"),
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn default_config() -> LedgerchatConfig {
        ledgerchat_config::load_and_validate_str("").unwrap()
    }

    #[test]
    fn plain_lines_use_tags() {
        let result = CheckResult::new("Database", CheckStatus::Warn, "empty", Instant::now());
        let line = format_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("Database"));
        assert!(line.contains("empty"));
    }

    #[tokio::test]
    async fn check_database_missing_warns() {
        let mut config = default_config();
        config.storage.database_path = "/nonexistent/path/ledgerchat.db".into();
        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn check_database_counts_seeded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doctor.db");
        let mut config = default_config();
        config.storage.database_path = path.to_string_lossy().into_owned();

        // Create and seed the file first.
        let lookup = SqliteLookup::open(config.storage.clone()).await.unwrap();
        lookup.shutdown().await.unwrap();
        drop(lookup);

        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "5 buyers, 5 debtors");
    }

    #[tokio::test]
    async fn check_database_in_memory_unseeded_warns() {
        let mut config = default_config();
        config.storage.database_path = IN_MEMORY.into();
        config.storage.seed_demo_data = false;
        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.message, "0 buyers, 0 debtors");
    }

    #[tokio::test]
    async fn provider_without_key_warns() {
        let mut config = default_config();
        config.primary.api_key = None;
        let result = check_provider("Primary", &config.primary.clone(), &config, false).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn provider_unused_in_mode_passes() {
        let mut config = default_config();
        config.classifier.mode = ClassifierMode::Primary;
        let result = check_provider("Secondary", &config.secondary.clone(), &config, true).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "not used in this mode");
    }

    #[tokio::test]
    async fn probe_reports_reachable_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"intent\":\"count_buyers\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = default_config();
        config.primary.base_url = server.uri();
        config.primary.api_key = Some("sk-test-0123456789abcdef".into());

        let result = check_provider("Primary", &config.primary.clone(), &config, true).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "reachable (intent=count_buyers)");
    }

    #[tokio::test]
    async fn probe_reports_failing_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut config = default_config();
        config.primary.base_url = server.uri();
        config.primary.api_key = Some("sk-test-0123456789abcdef".into());

        let result = check_provider("Primary", &config.primary.clone(), &config, true).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("unreachable"));
        assert!(!result.message.contains("sk-test"));
    }

    #[test]
    fn mode_without_keys_warns() {
        let mut config = default_config();
        config.primary.api_key = None;
        config.secondary.api_key = None;
        assert_eq!(check_mode(&config).status, CheckStatus::Warn);

        config.classifier.mode = ClassifierMode::Local;
        assert_eq!(check_mode(&config).status, CheckStatus::Pass);

        config.classifier.mode = ClassifierMode::Secondary;
        config.secondary.api_key = Some("sk-x".into());
        assert_eq!(check_mode(&config).status, CheckStatus::Pass);
    }
}
