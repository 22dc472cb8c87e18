// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demo records for a fresh database.

use ledgerchat_core::{Buyer, Debtor, LedgerchatError};
use tracing::info;

use crate::database::{map_tr_err, Database};

/// `(name, total_purchased)` for the demo buyers, in id order.
pub const DEMO_BUYERS: &[(&str, f64)] = &[
    ("Juan Pérez", 5000.50),
    ("María López", 7500.75),
    ("Carlos Gómez", 2300.25),
    ("Ana Martínez", 9800.00),
    ("Pedro Sánchez", 3200.60),
];

/// `(name, amount_owed)` for the demo debtors, in id order.
pub const DEMO_DEBTORS: &[(&str, f64)] = &[
    ("Roberto Díaz", 1500.00),
    ("Sofía Ramírez", 3000.50),
    ("Miguel Torres", 500.25),
    ("Laura Jiménez", 4200.75),
    ("Alejandro Ruiz", 2100.30),
];

pub fn demo_buyers() -> Vec<Buyer> {
    DEMO_BUYERS
        .iter()
        .zip(1..)
        .map(|(&(name, total_purchased), id)| Buyer {
            id,
            name: name.to_string(),
            total_purchased,
        })
        .collect()
}

pub fn demo_debtors() -> Vec<Debtor> {
    DEMO_DEBTORS
        .iter()
        .zip(1..)
        .map(|(&(name, amount_owed), id)| Debtor {
            id,
            name: name.to_string(),
            amount_owed,
        })
        .collect()
}

/// Rows inserted by [`seed_demo_data`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub buyers: usize,
    pub debtors: usize,
}

/// Insert the demo records into whichever tables are empty.
///
/// Tables that already hold rows are left untouched, so this is safe to run
/// on every startup.
pub async fn seed_demo_data(db: &Database) -> Result<SeedReport, LedgerchatError> {
    let report = db
        .connection()
        .call(|conn| -> Result<_, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut report = SeedReport::default();

            let buyers: i64 = tx.query_row("SELECT COUNT(*) FROM buyers", [], |row| row.get(0))?;
            if buyers == 0 {
                let mut stmt = tx
                    .prepare("INSERT INTO buyers (id, name, total_purchased) VALUES (?1, ?2, ?3)")?;
                for buyer in demo_buyers() {
                    stmt.execute(rusqlite::params![buyer.id, buyer.name, buyer.total_purchased])?;
                    report.buyers += 1;
                }
            }

            let debtors: i64 = tx.query_row("SELECT COUNT(*) FROM debtors", [], |row| row.get(0))?;
            if debtors == 0 {
                let mut stmt = tx
                    .prepare("INSERT INTO debtors (id, name, amount_owed) VALUES (?1, ?2, ?3)")?;
                for debtor in demo_debtors() {
                    stmt.execute(rusqlite::params![debtor.id, debtor.name, debtor.amount_owed])?;
                    report.debtors += 1;
                }
            }

            tx.commit()?;
            Ok(report)
        })
        .await
        .map_err(map_tr_err)?;

    if report.buyers > 0 || report.debtors > 0 {
        info!(
            buyers = report.buyers,
            debtors = report.debtors,
            "seeded demo records"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_ids_start_at_one() {
        let buyers = demo_buyers();
        assert_eq!(buyers.len(), 5);
        assert_eq!(buyers[0].id, 1);
        assert_eq!(buyers[3].name, "Ana Martínez");
        assert_eq!(demo_debtors()[4].id, 5);
    }
}
