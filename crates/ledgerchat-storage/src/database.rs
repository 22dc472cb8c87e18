// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and schema creation.
//!
//! Every statement runs on tokio-rusqlite's single background thread.

use ledgerchat_config::StorageConfig;
use ledgerchat_core::LedgerchatError;
use tracing::debug;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS buyers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    total_purchased REAL NOT NULL DEFAULT 0.0
);
CREATE TABLE IF NOT EXISTS debtors (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    amount_owed REAL NOT NULL DEFAULT 0.0
);
CREATE INDEX IF NOT EXISTS idx_buyers_total ON buyers (total_purchased DESC);
CREATE INDEX IF NOT EXISTS idx_debtors_amount ON debtors (amount_owed DESC);
";

/// Convert a tokio-rusqlite error into a storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> LedgerchatError {
    LedgerchatError::storage(e)
}

/// An open database with the lookup schema applied.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database described by `config` and apply the schema.
    pub async fn open(config: &StorageConfig) -> Result<Self, LedgerchatError> {
        let in_memory = config.database_path == IN_MEMORY;
        let conn = if in_memory {
            tokio_rusqlite::Connection::open_in_memory().await
        } else {
            tokio_rusqlite::Connection::open(config.database_path.clone()).await
        }
        .map_err(LedgerchatError::storage)?;

        let wal = config.wal_mode && !in_memory;
        let busy_timeout_ms = config.busy_timeout_ms;
        conn.call(move |conn| -> Result<_, rusqlite::Error> {
            if wal {
                // journal_mode returns the resulting mode as a row.
                let _mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            }
            conn.execute_batch(&format!(
                "PRAGMA foreign_keys = ON;\nPRAGMA busy_timeout = {busy_timeout_ms};"
            ))?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %config.database_path, wal, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}
