// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup adapter trait for the buyer/debtor record store.

use async_trait::async_trait;

use crate::error::LedgerchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Buyer, Debtor, Limit};

/// Read-only queries over the buyer and debtor records.
///
/// Empty results are a normal outcome. Errors mean a genuine storage fault.
#[async_trait]
pub trait LookupAdapter: PluginAdapter {
    /// Buyers ordered by total purchased, highest first.
    async fn top_buyers(&self, limit: Limit) -> Result<Vec<Buyer>, LedgerchatError>;

    /// Debtors ordered by amount owed, highest first.
    async fn top_debtors(&self, limit: Limit) -> Result<Vec<Debtor>, LedgerchatError>;

    async fn count_buyers(&self) -> Result<u64, LedgerchatError>;

    async fn count_debtors(&self) -> Result<u64, LedgerchatError>;
}
