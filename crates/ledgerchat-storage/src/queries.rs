// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read queries over the buyers and debtors tables.

use ledgerchat_core::{Buyer, Debtor, LedgerchatError, Limit};

use crate::database::{map_tr_err, Database};

pub async fn top_buyers(db: &Database, limit: Limit) -> Result<Vec<Buyer>, LedgerchatError> {
    let limit = i64::from(limit.get());
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, total_purchased FROM buyers \
                 ORDER BY total_purchased DESC, id ASC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], |row| {
                    Ok(Buyer {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        total_purchased: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn top_debtors(db: &Database, limit: Limit) -> Result<Vec<Debtor>, LedgerchatError> {
    let limit = i64::from(limit.get());
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, amount_owed FROM debtors \
                 ORDER BY amount_owed DESC, id ASC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], |row| {
                    Ok(Debtor {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        amount_owed: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_buyers(db: &Database) -> Result<u64, LedgerchatError> {
    count(db, "SELECT COUNT(*) FROM buyers").await
}

pub async fn count_debtors(db: &Database) -> Result<u64, LedgerchatError> {
    count(db, "SELECT COUNT(*) FROM debtors").await
}

async fn count(db: &Database, sql: &'static str) -> Result<u64, LedgerchatError> {
    let n: i64 = db
        .connection()
        .call(move |conn| conn.query_row(sql, [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)?;
    Ok(n.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_demo_data;
    use ledgerchat_config::StorageConfig;

    async fn memory_db() -> Database {
        let config = StorageConfig {
            database_path: ":memory:".into(),
            ..StorageConfig::default()
        };
        Database::open(&config).await.unwrap()
    }

    #[tokio::test]
    async fn top_buyers_descending_and_limited() {
        let db = memory_db().await;
        seed_demo_data(&db).await.unwrap();

        let rows = top_buyers(&db, Limit::new(3).unwrap()).await.unwrap();
        let names: Vec<_> = rows.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Ana Martínez", "María López", "Juan Pérez"]);
    }

    #[tokio::test]
    async fn limit_above_row_count_returns_everything() {
        let db = memory_db().await;
        seed_demo_data(&db).await.unwrap();

        let rows = top_debtors(&db, Limit::new(50).unwrap()).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].name, "Laura Jiménez");
        assert_eq!(rows[4].name, "Miguel Torres");
        assert!(rows.windows(2).all(|w| w[0].amount_owed >= w[1].amount_owed));
    }

    #[tokio::test]
    async fn empty_tables_give_empty_results() {
        let db = memory_db().await;
        assert!(top_buyers(&db, Limit::default()).await.unwrap().is_empty());
        assert_eq!(count_debtors(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counts_after_seed() {
        let db = memory_db().await;
        seed_demo_data(&db).await.unwrap();
        assert_eq!(count_buyers(&db).await.unwrap(), 5);
        assert_eq!(count_debtors(&db).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn ties_break_by_id() {
        let db = memory_db().await;
        db.connection()
            .call(|conn| -> Result<_, rusqlite::Error> {
                conn.execute_batch(
                    "INSERT INTO buyers (id, name, total_purchased) VALUES (7, 'B', 10.0);
                     INSERT INTO buyers (id, name, total_purchased) VALUES (3, 'A', 10.0);",
                )
            })
            .await
            .map_err(map_tr_err)
            .unwrap();
        let rows = top_buyers(&db, Limit::default()).await.unwrap();
        assert_eq!(rows[0].id, 3);
        assert_eq!(rows[1].id, 7);
    }
}
