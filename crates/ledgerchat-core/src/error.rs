// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Ledgerchat.

use thiserror::Error;

/// The primary error type used across Ledgerchat adapters and the chat pipeline.
///
/// Classifier failures rarely surface as this type: remote classifiers report
/// them inside [`IntentResult`](crate::types::IntentResult) so the cascade can
/// fall through. The variant exists for construction-time failures.
#[derive(Debug, Error)]
pub enum LedgerchatError {
    /// Configuration errors (invalid TOML, failed validation, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Classifier construction errors (HTTP client build failure).
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Lookup adapter used outside its lifecycle (not initialized, already closed).
    #[error("lookup error: {message}")]
    Lookup { message: String },

    /// HTTP server errors (bind failure, serve loop failure).
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerchatError {
    /// Wraps any error as a storage fault.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
