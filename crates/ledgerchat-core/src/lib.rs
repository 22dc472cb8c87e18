// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Ledgerchat.
//!
//! Trait definitions, error types, and the intent vocabulary shared by the
//! classifiers, the intent router, and the lookup backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LedgerchatError;
pub use ledgerchat_security::SanitizedMessage;
pub use types::{
    AdapterType, Availability, AvailabilityCell, Buyer, ChatReply, Debtor, HealthStatus, Intent,
    IntentKind, IntentResult, Limit, ReplyStatus,
};

pub use traits::{ClassifierAdapter, LookupAdapter, PluginAdapter};
