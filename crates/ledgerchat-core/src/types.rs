// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by classifiers, the intent router, and lookups.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is usable but something is off (e.g. no credential).
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label for JSON health reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded(_) => "degraded",
            Self::Unhealthy(_) => "unhealthy",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Healthy => None,
            Self::Degraded(d) | Self::Unhealthy(d) => Some(d),
        }
    }
}

/// Identifies the role an adapter plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Classifier,
    Lookup,
}

// --- Intents ---

/// The closed set of intents a message can be classified into.
///
/// Declaration order matters: the pattern classifier tests intents in this
/// order and breaks partial-match ties in favour of the earlier one.
///
/// Parsing accepts the legacy Spanish labels some models still emit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum IntentKind {
    #[strum(to_string = "top_buyers", serialize = "mejores_compradores")]
    TopBuyers,
    #[strum(to_string = "top_debtors", serialize = "deudores_altos")]
    TopDebtors,
    #[strum(to_string = "count_buyers", serialize = "contar_compradores")]
    CountBuyers,
    #[strum(to_string = "count_debtors", serialize = "contar_deudores")]
    CountDebtors,
    #[strum(to_string = "unknown", serialize = "desconocido")]
    Unknown,
}

impl IntentKind {
    /// Intents a classifier can resolve to, in tie-break order.
    pub const RESOLVABLE: [IntentKind; 4] = [
        IntentKind::TopBuyers,
        IntentKind::TopDebtors,
        IntentKind::CountBuyers,
        IntentKind::CountDebtors,
    ];

    /// Whether this intent carries a `limit` parameter.
    pub fn takes_limit(self) -> bool {
        matches!(self, Self::TopBuyers | Self::TopDebtors)
    }
}

/// Number of rows a top-N intent asks for.
///
/// Coercion never fails: anything non-numeric, non-positive or out of range
/// becomes [`Limit::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limit(u32);

impl Limit {
    pub const DEFAULT: Limit = Limit(3);

    /// Returns `None` for values that are not a positive `u32`.
    pub fn new(n: i64) -> Option<Self> {
        u32::try_from(n).ok().filter(|n| *n > 0).map(Limit)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Coerce a numeral string. Surrounding whitespace is ignored.
    pub fn from_numeral(s: &str) -> Self {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::new)
            .unwrap_or(Self::DEFAULT)
    }

    /// Coerce an optional JSON value. Absent and `null` give the default;
    /// floats are truncated toward zero.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        use serde_json::Value;

        match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                        .map(|f| f.trunc() as i64)
                })
                .and_then(Self::new)
                .unwrap_or(Self::DEFAULT),
            Some(Value::String(s)) => Self::from_numeral(s),
            _ => Self::DEFAULT,
        }
    }

    /// Resolve an optional limit, applying the default when unset.
    pub fn or_default(limit: Option<Limit>) -> Self {
        limit.unwrap_or(Self::DEFAULT)
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved intent with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "parameters", rename_all = "snake_case")]
pub enum Intent {
    TopBuyers {
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<Limit>,
    },
    TopDebtors {
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<Limit>,
    },
    CountBuyers,
    CountDebtors,
    Unknown,
}

impl Intent {
    /// Build an intent from its kind. `limit` is dropped for intents that take none.
    pub fn from_kind(kind: IntentKind, limit: Option<Limit>) -> Self {
        match kind {
            IntentKind::TopBuyers => Self::TopBuyers { limit },
            IntentKind::TopDebtors => Self::TopDebtors { limit },
            IntentKind::CountBuyers => Self::CountBuyers,
            IntentKind::CountDebtors => Self::CountDebtors,
            IntentKind::Unknown => Self::Unknown,
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Self::TopBuyers { .. } => IntentKind::TopBuyers,
            Self::TopDebtors { .. } => IntentKind::TopDebtors,
            Self::CountBuyers => IntentKind::CountBuyers,
            Self::CountDebtors => IntentKind::CountDebtors,
            Self::Unknown => IntentKind::Unknown,
        }
    }

    pub fn limit(&self) -> Option<Limit> {
        match self {
            Self::TopBuyers { limit } | Self::TopDebtors { limit } => *limit,
            _ => None,
        }
    }
}

/// Outcome of one classification attempt.
///
/// `intent == Unknown` together with a non-empty `error` means the classifier
/// itself failed; `Unknown` without an error is a legitimate verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentResult {
    #[serde(flatten)]
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntentResult {
    /// A successful classification. Confidence is clamped to `[0, 1]`.
    pub fn new(intent: Intent, confidence: Option<f32>) -> Self {
        Self {
            intent,
            confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
            error: None,
        }
    }

    /// The classifier looked at the message and could not place it.
    pub fn unknown(confidence: Option<f32>) -> Self {
        Self::new(Intent::Unknown, confidence)
    }

    /// The classifier failed; the cascade should try the next stage.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: None,
            error: Some(error.into()),
        }
    }

    pub fn is_provider_failure(&self) -> bool {
        self.intent == Intent::Unknown && self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

// --- Classifier availability ---

/// Availability of a classifier backend, cached for the process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    /// No credential configured. Permanent; never attempted.
    Unconfigured,
    /// Configured, and the last call (if any) succeeded.
    Ready,
    /// Configured, but the last call failed.
    Unreachable,
}

/// Lock-free holder for an [`Availability`] shared across request tasks.
#[derive(Debug)]
pub struct AvailabilityCell(AtomicU8);

impl AvailabilityCell {
    pub fn new(initial: Availability) -> Self {
        Self(AtomicU8::new(Self::encode(initial)))
    }

    pub fn get(&self) -> Availability {
        match self.0.load(Ordering::Acquire) {
            0 => Availability::Unconfigured,
            1 => Availability::Ready,
            _ => Availability::Unreachable,
        }
    }

    /// Record the outcome of a call. An unconfigured cell stays unconfigured.
    pub fn record(&self, success: bool) {
        let next = if success {
            Availability::Ready
        } else {
            Availability::Unreachable
        };
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            (current != Self::encode(Availability::Unconfigured)).then_some(Self::encode(next))
        });
    }

    fn encode(a: Availability) -> u8 {
        match a {
            Availability::Unconfigured => 0,
            Availability::Ready => 1,
            Availability::Unreachable => 2,
        }
    }
}

// --- Lookup records ---

/// A purchaser row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: i64,
    pub name: String,
    pub total_purchased: f64,
}

/// A debtor row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debtor {
    pub id: i64,
    pub name: String,
    pub amount_owed: f64,
}

// --- Replies ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Caller-facing reply envelope: `{status, message, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub status: ReplyStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ChatReply {
    pub fn success(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            status: ReplyStatus::Success,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Success
    }
}
