// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local pattern-based intent classification.
//!
//! No network, no model, no failure mode other than low confidence. This is
//! the terminal stage of the classification cascade.
//!
//! A message is first tested against each intent's patterns in declaration
//! order; the first hit wins with [`DIRECT_MATCH_CONFIDENCE`]. Failing that,
//! every pattern is reduced to its literal keywords and scored by the share of
//! keywords present in the message.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use ledgerchat_core::{
    AdapterType, Availability, ClassifierAdapter, HealthStatus, Intent, IntentKind, IntentResult,
    LedgerchatError, Limit, PluginAdapter, SanitizedMessage,
};
use regex::Regex;
use tracing::debug;

/// Confidence reported for a direct pattern match.
pub const DIRECT_MATCH_CONFIDENCE: f32 = 0.8;

/// A pattern's keyword score must exceed this to count at all.
pub const PARTIAL_PATTERN_THRESHOLD: f32 = 0.5;

/// The best partial score must exceed this to be accepted.
pub const ACCEPTANCE_THRESHOLD: f32 = 0.4;

const TOP_BUYERS: &[&str] = &[
    r"\bmejores\s+(?:\d+\s+)?compradores\b",
    r"\bcompradores\s+(?:con\s+)?(?:m[aá]s|mayores|mejores)\s+compras\b",
    r"\bqui[eé]nes\s+(?:son\s+)?(?:los\s+)?mejores\s+compradores\b",
    r"\bcompradores\s+(?:que\s+)?m[aá]s\s+(?:compran|gastan|pagan)\b",
    r"\btop\s+(?:\d+\s+)?compradores\b",
    r"\bcompradores\s+(?:m[aá]s|mayores)\b",
    r"\bprincipales\s+(?:\d+\s+)?compradores\b",
    r"\bm[aá]s\s+compras\b",
    r"\b(?:top|best)\s+(?:\d+\s+)?(?:buyers|customers|purchasers)\b",
    r"\b(?:buyers|customers)\s+who\s+(?:buy|spend)\s+(?:the\s+)?most\b",
];

const TOP_DEBTORS: &[&str] = &[
    r"\bdeudores\s+(?:con\s+)?(?:m[aá]s|mayores|mayor|altos|alto)\s+(?:deudas|deuda|montos|monto)\b",
    r"\bqui[eé]nes\s+(?:son\s+)?(?:los\s+)?(?:mayores\s+|principales\s+)?deudores\b",
    r"\bdeudores\s+(?:que\s+)?(?:m[aá]s|mayor)\s+(?:deben|adeudan)\b",
    r"\btop\s+(?:\d+\s+)?deudores\b",
    r"\bdeudores\s+(?:m[aá]s|mayores)\b",
    r"\bprincipales\s+(?:\d+\s+)?deudores\b",
    r"\bmayores\s+(?:\d+\s+)?(?:deudas|deudores)\b",
    r"\b(?:top|biggest|largest)\s+(?:\d+\s+)?debtors\b",
    r"\bwho\s+owes\s+(?:the\s+)?most\b",
];

const COUNT_BUYERS: &[&str] = &[
    r"\bcu[aá]ntos\s+compradores\b",
    r"\bn[uú]mero\s+(?:total\s+)?(?:de\s+)?compradores\b",
    r"\btotal\s+(?:de\s+)?compradores\b",
    r"\bcantidad\s+(?:de\s+)?compradores\b",
    r"\bcontar\s+(?:los\s+)?compradores\b",
    r"\bhow\s+many\s+(?:buyers|customers|purchasers)\b",
    r"\b(?:count|number)\s+(?:of\s+)?(?:buyers|customers)\b",
];

const COUNT_DEBTORS: &[&str] = &[
    r"\bcu[aá]ntos\s+deudores\b",
    r"\bn[uú]mero\s+(?:total\s+)?(?:de\s+)?deudores\b",
    r"\btotal\s+(?:de\s+)?deudores\b",
    r"\bcantidad\s+(?:de\s+)?deudores\b",
    r"\bcontar\s+(?:los\s+)?deudores\b",
    r"\bhow\s+many\s+debtors\b",
    r"\b(?:count|number)\s+(?:of\s+)?debtors\b",
];

/// A numeral after a quantity word: "top 5", "primeros 2", "best 4".
static QUANTITY_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:top|primeros|primeras|mejores|principales|mayores|first|best|main)\s+(\d+)\b")
        .expect("quantity pattern is valid")
});

/// A numeral after a request verb: "dame 4", "muéstrame los 2", "show me 3".
static REQUEST_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:mu[eé]strame|muestra|dame|ver|obtener|show\s+me|show|give\s+me|get)\s+(?:los\s+|las\s+|the\s+)?(\d+)\b",
    )
    .expect("request pattern is valid")
});

static REGEX_ESCAPES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[sdbw][+*?]?").expect("escape pattern is valid"));

static CHAR_CLASSES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]])[^\]]*\]").expect("class pattern is valid"));

/// One compiled pattern and the keywords used for partial matching.
struct IntentPattern {
    regex: Regex,
    keywords: HashSet<String>,
}

struct IntentPatterns {
    kind: IntentKind,
    patterns: Vec<IntentPattern>,
}

static PATTERN_TABLE: LazyLock<Vec<IntentPatterns>> = LazyLock::new(|| {
    IntentKind::RESOLVABLE
        .iter()
        .map(|&kind| {
            let sources = match kind {
                IntentKind::TopBuyers => TOP_BUYERS,
                IntentKind::TopDebtors => TOP_DEBTORS,
                IntentKind::CountBuyers => COUNT_BUYERS,
                IntentKind::CountDebtors => COUNT_DEBTORS,
                IntentKind::Unknown => &[],
            };
            IntentPatterns {
                kind,
                patterns: sources
                    .iter()
                    .map(|src| IntentPattern {
                        regex: Regex::new(src).expect("intent pattern is valid"),
                        keywords: keyword_bag(src),
                    })
                    .collect(),
            }
        })
        .collect()
});

/// Reduce a pattern to its literal words.
///
/// Escapes and group syntax become separators, character classes collapse to
/// their first member, and alternatives each contribute a keyword.
pub fn keyword_bag(pattern: &str) -> HashSet<String> {
    let no_escapes = REGEX_ESCAPES.replace_all(pattern, " ");
    let no_classes = CHAR_CLASSES.replace_all(&no_escapes, "$1");
    no_classes
        .replace("(?:", " ")
        .replace(['(', ')', '?', '*', '+', '|'], " ")
        .split_whitespace()
        .map(fold_word)
        .collect()
}

/// Words of a message, lower-cased and accent-folded.
fn message_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(fold_word)
        .collect()
}

fn fold_word(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Pull a `limit` out of a lower-cased message.
///
/// `None` when no numeral follows a quantity word or request verb. A numeral
/// that does not coerce to a positive count yields [`Limit::DEFAULT`].
pub fn extract_limit(lowered: &str) -> Option<Limit> {
    QUANTITY_LIMIT
        .captures(lowered)
        .or_else(|| REQUEST_LIMIT.captures(lowered))
        .and_then(|caps| caps.get(1))
        .map(|m| Limit::from_numeral(m.as_str()))
}

/// Regex and keyword based intent classifier.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a sanitized message. Always succeeds.
    pub fn classify_message(&self, message: &SanitizedMessage) -> IntentResult {
        let lowered = message.as_str().to_lowercase();

        for group in PATTERN_TABLE.iter() {
            if group.patterns.iter().any(|p| p.regex.is_match(&lowered)) {
                debug!(intent = %group.kind, "direct pattern match");
                return self.resolve(group.kind, &lowered, DIRECT_MATCH_CONFIDENCE);
            }
        }

        let words = message_words(&lowered);
        match best_partial_match(&words) {
            Some((kind, score)) if score > ACCEPTANCE_THRESHOLD => {
                debug!(intent = %kind, score, "partial keyword match");
                self.resolve(kind, &lowered, score)
            }
            _ => IntentResult::unknown(Some(0.0)),
        }
    }

    fn resolve(&self, kind: IntentKind, lowered: &str, confidence: f32) -> IntentResult {
        let limit = if kind.takes_limit() {
            extract_limit(lowered)
        } else {
            None
        };
        IntentResult::new(Intent::from_kind(kind, limit), Some(confidence))
    }
}

/// Best intent by keyword overlap. Ties keep the earlier intent.
fn best_partial_match(words: &HashSet<String>) -> Option<(IntentKind, f32)> {
    let mut best: Option<(IntentKind, f32)> = None;

    for group in PATTERN_TABLE.iter() {
        let score = group
            .patterns
            .iter()
            .filter(|p| !p.keywords.is_empty())
            .map(|p| p.keywords.intersection(words).count() as f32 / p.keywords.len() as f32)
            .filter(|score| *score > PARTIAL_PATTERN_THRESHOLD)
            .fold(None, |acc: Option<f32>, s| Some(acc.map_or(s, |a| a.max(s))));

        if let Some(score) = score {
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((group.kind, score));
            }
        }
    }

    best
}

#[async_trait]
impl PluginAdapter for PatternClassifier {
    fn name(&self) -> &str {
        "patterns"
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
impl ClassifierAdapter for PatternClassifier {
    fn availability(&self) -> Availability {
        Availability::Ready
    }

    async fn classify(&self, message: &SanitizedMessage) -> IntentResult {
        self.classify_message(message)
    }
}
