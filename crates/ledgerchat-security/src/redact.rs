// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for log output and provider error messages.
//!
//! Provider API keys must never reach the logs. Two mechanisms cover this:
//! regex patterns for known credential shapes, and exact matching against the
//! keys the process was configured with.

use std::sync::LazyLock;

use regex::Regex;

static REDACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // OpenAI / DeepSeek style keys: sk-..., sk-proj-...
        r"sk-[A-Za-z0-9_\-]{16,}",
        // Bearer tokens echoed in headers or error bodies
        r"(?i)bearer\s+[A-Za-z0-9._\-]{10,}",
        // api_key=... in query strings
        r"(?i)api[_-]?key=[^\s&]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("redaction pattern is valid"))
    .collect()
});

/// The redaction placeholder.
pub const REDACTED: &str = "[REDACTED]";

/// Redact credentials from `input`.
///
/// `secrets` are exact values (typically the configured API keys); the longest
/// is replaced first so that overlapping values do not leave fragments.
pub fn redact(input: &str, secrets: &[&str]) -> String {
    let mut result = input.to_string();

    for pattern in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).into_owned();
    }

    let mut sorted: Vec<&str> = secrets.iter().copied().filter(|s| !s.is_empty()).collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for secret in sorted {
        result = result.replace(secret, REDACTED);
    }

    result
}

/// Mask a credential for display: the first and last four characters survive.
///
/// Short values are masked entirely. An empty value renders as `(not set)`.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 8 => "*".repeat(n),
        n => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{head}...{tail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_sk_style_key() {
        let input = "401 Unauthorized: invalid key sk-abcdefghijklmnopqrstuvwx";
        let result = redact(input, &[]);
        assert!(result.contains(REDACTED));
        assert!(!result.contains("sk-abcdefghij"));
    }

    #[test]
    fn redacts_bearer_token() {
        let result = redact("Authorization: Bearer abc.def-ghijklmnop", &[]);
        assert_eq!(result, format!("Authorization: {REDACTED}"));
    }

    #[test]
    fn redacts_query_string_key() {
        let result = redact("GET /v1?api_key=xyz123&model=m", &[]);
        assert_eq!(result, format!("GET /v1?{REDACTED}&model=m"));
    }

    #[test]
    fn redacts_configured_secrets_longest_first() {
        let result = redact("prefix short-longer suffix", &["short", "short-longer"]);
        assert_eq!(result, "prefix [REDACTED] suffix");
    }

    #[test]
    fn empty_secrets_are_ignored() {
        assert_eq!(redact("nothing to hide", &[""]), "nothing to hide");
    }

    #[test]
    fn masks_long_secret() {
        assert_eq!(mask_secret("sk-1234567890wxyz"), "sk-1...wxyz");
    }

    #[test]
    fn masks_short_secret_entirely() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "(not set)");
    }
}
