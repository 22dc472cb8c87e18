// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier adapter trait for intent-classification backends.

use async_trait::async_trait;
use ledgerchat_security::SanitizedMessage;

use crate::traits::adapter::PluginAdapter;
use crate::types::{Availability, IntentResult};

/// A backend that maps a sanitized message to an [`IntentResult`].
///
/// `classify` never returns an error: failures are reported through
/// [`IntentResult::failed`] so the cascade can move on to the next stage.
#[async_trait]
pub trait ClassifierAdapter: PluginAdapter {
    /// Current availability. Must not perform I/O.
    fn availability(&self) -> Availability;

    async fn classify(&self, message: &SanitizedMessage) -> IntentResult;
}
