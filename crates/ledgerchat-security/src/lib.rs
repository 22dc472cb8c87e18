// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security boundary for Ledgerchat.
//!
//! Sanitizes inbound chat text before it reaches any classifier, and redacts
//! provider credentials from log output.

pub mod redact;
pub mod sanitize;

pub use redact::{mask_secret, redact};
pub use sanitize::{sanitize, sanitize_value, SanitizedMessage, MAX_INPUT_CHARS, REDACTION_MARKER};
