// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification and routing for Ledgerchat.
//!
//! - [`PatternClassifier`]: local regex/keyword classifier, never fails
//! - [`ClassificationCascade`]: remote classifiers in configured order, then patterns
//! - [`IntentRouter`]: one lookup per intent, formatted reply
//! - [`ChatPipeline`]: the three wired together behind the sanitizer

pub mod cascade;
pub mod classifier;
pub mod pipeline;
pub mod router;

pub use cascade::{Classification, ClassificationCascade, PATTERN_STAGE};
pub use classifier::{extract_limit, PatternClassifier};
pub use pipeline::{ChatOutcome, ChatPipeline, PipelineHealth};
pub use router::{IntentRouter, CLARIFICATION_MESSAGE, PROCESSING_ERROR_MESSAGE};
