// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns model reply text into an [`IntentResult`].
//!
//! Models do not reliably return clean JSON. The reply is parsed as-is first,
//! then as the first complete top-level object embedded in it, ignoring any
//! prose or stray braces around it. Anything that still does not yield an
//! `intent` is a legitimate `Unknown`, not a provider failure.

use std::str::FromStr;

use ledgerchat_core::{Intent, IntentKind, IntentResult, Limit};
use serde_json::{Map, Value};
use tracing::debug;

/// Parse the content of a chat-completions reply.
pub fn parse_intent_reply(content: &str) -> IntentResult {
    let Some(object) = parse_object(content) else {
        debug!("reply is not a JSON object, treating as unknown");
        return IntentResult::unknown(None);
    };

    let Some(name) = object.get("intent").and_then(Value::as_str) else {
        debug!("reply has no intent field");
        return IntentResult::unknown(None);
    };

    let kind = IntentKind::from_str(name.trim()).unwrap_or_else(|_| {
        debug!(intent = name, "unrecognized intent name");
        IntentKind::Unknown
    });

    let limit = if kind.takes_limit() {
        object
            .get("parameters")
            .and_then(Value::as_object)
            .and_then(|params| params.get("limit").or_else(|| params.get("limite")))
            .map(|v| Limit::from_value(Some(v)))
    } else {
        None
    };

    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c as f32);

    IntentResult::new(Intent::from_kind(kind, limit), confidence)
}

fn parse_object(content: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str(content.trim()) {
        return Some(map);
    }

    // The first complete object starting at some `{`; text after it is ignored.
    content.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&content[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json() {
        let r = parse_intent_reply(r#"{"intent":"top_debtors","parameters":{"limit":2}}"#);
        assert_eq!(
            r.intent,
            Intent::TopDebtors {
                limit: Limit::new(2)
            }
        );
        assert!(r.error.is_none());
    }

    #[test]
    fn json_wrapped_in_prose_and_fences() {
        let content = "Sure! Here you go:\n```json\n{\"intent\": \"count_buyers\"}\n```\nAnything else?";
        assert_eq!(parse_intent_reply(content).intent, Intent::CountBuyers);
    }

    #[test]
    fn first_object_wins_over_trailing_braces() {
        let content =
            r#"Result: {"intent":"count_buyers","parameters":{}} (schema: {intent, parameters})"#;
        let r = parse_intent_reply(content);
        assert_eq!(r.intent, Intent::CountBuyers);
        assert!(r.error.is_none());
    }

    #[test]
    fn braced_prose_before_the_object_is_skipped() {
        let content = r#"Format {intent, parameters}: {"intent":"top_debtors","parameters":{"limit":4}}"#;
        assert_eq!(
            parse_intent_reply(content).intent,
            Intent::TopDebtors {
                limit: Limit::new(4)
            }
        );
    }

    #[test]
    fn legacy_names_and_limite() {
        let r = parse_intent_reply(
            r#"{"intent":"mejores_compradores","parameters":{"limite":"5"}}"#,
        );
        assert_eq!(
            r.intent,
            Intent::TopBuyers {
                limit: Limit::new(5)
            }
        );
        assert_eq!(
            parse_intent_reply(r#"{"intent":"contar_deudores","parameters":{}}"#).intent,
            Intent::CountDebtors
        );
    }

    #[test]
    fn bad_limit_is_coerced_absent_limit_stays_unset() {
        let r = parse_intent_reply(r#"{"intent":"top_buyers","parameters":{"limit":"abc"}}"#);
        assert_eq!(r.intent.limit(), Some(Limit::DEFAULT));
        let r = parse_intent_reply(r#"{"intent":"top_buyers","parameters":{"limit":-4}}"#);
        assert_eq!(r.intent.limit(), Some(Limit::DEFAULT));
        let r = parse_intent_reply(r#"{"intent":"top_buyers","parameters":{"limit":4.9}}"#);
        assert_eq!(r.intent.limit(), Limit::new(4));
        let r = parse_intent_reply(r#"{"intent":"top_buyers"}"#);
        assert_eq!(r.intent.limit(), None);
    }

    #[test]
    fn count_intents_ignore_limit() {
        let r = parse_intent_reply(r#"{"intent":"count_debtors","parameters":{"limit":9}}"#);
        assert_eq!(r.intent, Intent::CountDebtors);
    }

    #[test]
    fn garbage_is_unknown_without_error() {
        for content in [
            "",
            "I cannot help with that",
            "{not json}",
            "} backwards {",
            r#"{"parameters":{"limit":3}}"#,
            r#"{"intent":"delete_everything"}"#,
            r#"{"intent":42}"#,
            "[1, 2, 3]",
        ] {
            let r = parse_intent_reply(content);
            assert_eq!(r.intent, Intent::Unknown, "content: {content:?}");
            assert!(!r.is_provider_failure(), "content: {content:?}");
        }
    }

    #[test]
    fn intent_names_are_case_insensitive() {
        assert_eq!(
            parse_intent_reply(r#"{"intent":" Count_Buyers "}"#).intent,
            Intent::CountBuyers
        );
    }

    #[test]
    fn confidence_is_clamped() {
        let r = parse_intent_reply(r#"{"intent":"count_buyers","confidence":1.7}"#);
        assert_eq!(r.confidence, Some(1.0));
    }
}
