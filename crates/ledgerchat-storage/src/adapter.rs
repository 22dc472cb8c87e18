// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the LookupAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use ledgerchat_config::StorageConfig;
use ledgerchat_core::{
    AdapterType, Buyer, Debtor, HealthStatus, LedgerchatError, Limit, LookupAdapter,
    PluginAdapter,
};

use crate::database::{map_tr_err, Database};
use crate::{queries, seed};

/// SQLite-backed lookup adapter.
///
/// The database is opened by [`SqliteLookup::initialize`]; every query before
/// that fails with a storage error.
pub struct SqliteLookup {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteLookup {
    /// The connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, create the schema and seed demo data if enabled.
    ///
    /// Calling this twice is an error.
    pub async fn initialize(&self) -> Result<(), LedgerchatError> {
        let db = Database::open(&self.config).await?;
        if self.config.seed_demo_data {
            seed::seed_demo_data(&db).await?;
        }
        self.db.set(db).map_err(|_| LedgerchatError::Lookup {
            message: "lookup store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "lookup store initialized");
        Ok(())
    }

    /// Open and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, LedgerchatError> {
        let lookup = Self::new(config);
        lookup.initialize().await?;
        Ok(lookup)
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.get()
    }

    fn db(&self) -> Result<&Database, LedgerchatError> {
        self.db.get().ok_or_else(|| LedgerchatError::Lookup {
            message: "lookup store not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteLookup {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Lookup
    }

    async fn health_check(&self) -> Result<HealthStatus, LedgerchatError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LedgerchatError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("lookup store checkpointed");
        }
        Ok(())
    }
}

#[async_trait]
impl LookupAdapter for SqliteLookup {
    async fn top_buyers(&self, limit: Limit) -> Result<Vec<Buyer>, LedgerchatError> {
        queries::top_buyers(self.db()?, limit).await
    }

    async fn top_debtors(&self, limit: Limit) -> Result<Vec<Debtor>, LedgerchatError> {
        queries::top_debtors(self.db()?, limit).await
    }

    async fn count_buyers(&self) -> Result<u64, LedgerchatError> {
        queries::count_buyers(self.db()?).await
    }

    async fn count_debtors(&self) -> Result<u64, LedgerchatError> {
        queries::count_debtors(self.db()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn file_config(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            database_path: dir.path().join("lookup.db").to_string_lossy().into_owned(),
            ..StorageConfig::default()
        }
    }

    #[tokio::test]
    async fn queries_before_initialize_fail() {
        let lookup = SqliteLookup::new(StorageConfig::default());
        let err = lookup.count_buyers().await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
        assert!(matches!(
            lookup.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn initialize_seeds_file_database() {
        let dir = tempdir().unwrap();
        let lookup = SqliteLookup::open(file_config(&dir)).await.unwrap();

        assert_eq!(lookup.count_buyers().await.unwrap(), 5);
        assert_eq!(lookup.health_check().await.unwrap(), HealthStatus::Healthy);
        let top = lookup.top_buyers(Limit::new(1).unwrap()).await.unwrap();
        assert_eq!(top[0].name, "Ana Martínez");
        lookup.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_does_not_duplicate_seed() {
        let dir = tempdir().unwrap();
        {
            let lookup = SqliteLookup::open(file_config(&dir)).await.unwrap();
            lookup.shutdown().await.unwrap();
        }
        let lookup = SqliteLookup::open(file_config(&dir)).await.unwrap();
        assert_eq!(lookup.count_debtors().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let config = StorageConfig {
            database_path: ":memory:".into(),
            seed_demo_data: false,
            ..StorageConfig::default()
        };
        let lookup = SqliteLookup::open(config).await.unwrap();
        assert_eq!(lookup.count_buyers().await.unwrap(), 0);
        assert!(lookup.top_debtors(Limit::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let config = StorageConfig {
            database_path: ":memory:".into(),
            ..StorageConfig::default()
        };
        let lookup = SqliteLookup::open(config).await.unwrap();
        assert!(lookup.initialize().await.is_err());
    }

    #[test]
    fn identity() {
        let lookup = SqliteLookup::new(StorageConfig::default());
        assert_eq!(lookup.name(), "sqlite");
        assert_eq!(lookup.adapter_type(), AdapterType::Lookup);
    }
}
