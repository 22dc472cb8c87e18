// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory lookup adapter with call counting and failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use ledgerchat_core::{
    AdapterType, Buyer, Debtor, HealthStatus, LedgerchatError, Limit, LookupAdapter,
    PluginAdapter,
};
use ledgerchat_storage::{demo_buyers, demo_debtors};

/// Per-query call counters.
#[derive(Debug, Default)]
struct Calls {
    top_buyers: AtomicUsize,
    top_debtors: AtomicUsize,
    count_buyers: AtomicUsize,
    count_debtors: AtomicUsize,
}

/// A lookup backed by plain vectors.
pub struct MockLookup {
    buyers: Vec<Buyer>,
    debtors: Vec<Debtor>,
    failing: AtomicBool,
    calls: Calls,
}

impl MockLookup {
    /// Holds the same five buyers and debtors a fresh database is seeded with.
    pub fn new() -> Self {
        Self::with_records(demo_buyers(), demo_debtors())
    }

    pub fn with_records(buyers: Vec<Buyer>, debtors: Vec<Debtor>) -> Self {
        Self {
            buyers,
            debtors,
            failing: AtomicBool::new(false),
            calls: Calls::default(),
        }
    }

    pub fn empty() -> Self {
        Self::with_records(Vec::new(), Vec::new())
    }

    /// Every query fails with a storage error.
    pub fn failing() -> Self {
        let lookup = Self::new();
        lookup.set_failing(true);
        lookup
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total number of queries served or refused.
    pub fn calls(&self) -> usize {
        self.top_buyers_calls()
            + self.top_debtors_calls()
            + self.count_buyers_calls()
            + self.count_debtors_calls()
    }

    pub fn top_buyers_calls(&self) -> usize {
        self.calls.top_buyers.load(Ordering::SeqCst)
    }

    pub fn top_debtors_calls(&self) -> usize {
        self.calls.top_debtors.load(Ordering::SeqCst)
    }

    pub fn count_buyers_calls(&self) -> usize {
        self.calls.count_buyers.load(Ordering::SeqCst)
    }

    pub fn count_debtors_calls(&self) -> usize {
        self.calls.count_debtors.load(Ordering::SeqCst)
    }

    fn check(&self, counter: &AtomicUsize) -> Result<(), LedgerchatError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerchatError::storage(std::io::Error::other(
                "mock lookup failure",
            )));
        }
        Ok(())
    }
}

impl Default for MockLookup {
    fn default() -> Self {
        Self::new()
    }
}

fn top_n<T: Clone>(rows: &[T], limit: Limit, key: impl Fn(&T) -> f64) -> Vec<T> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(limit.get() as usize);
    sorted
}

#[async_trait]
impl PluginAdapter for MockLookup {
    fn name(&self) -> &str {
        "mock-lookup"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Lookup
    }

    async fn health_check(&self) -> Result<HealthStatus, LedgerchatError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("mock lookup failure".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LedgerchatError> {
        Ok(())
    }
}

#[async_trait]
impl LookupAdapter for MockLookup {
    async fn top_buyers(&self, limit: Limit) -> Result<Vec<Buyer>, LedgerchatError> {
        self.check(&self.calls.top_buyers)?;
        Ok(top_n(&self.buyers, limit, |b| b.total_purchased))
    }

    async fn top_debtors(&self, limit: Limit) -> Result<Vec<Debtor>, LedgerchatError> {
        self.check(&self.calls.top_debtors)?;
        Ok(top_n(&self.debtors, limit, |d| d.amount_owed))
    }

    async fn count_buyers(&self) -> Result<u64, LedgerchatError> {
        self.check(&self.calls.count_buyers)?;
        Ok(self.buyers.len() as u64)
    }

    async fn count_debtors(&self) -> Result<u64, LedgerchatError> {
        self.check(&self.calls.count_debtors)?;
        Ok(self.debtors.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn top_n_sorts_descending() {
        let lookup = MockLookup::new();
        let rows = lookup.top_debtors(Limit::new(2).unwrap()).await.unwrap();
        assert_eq!(rows[0].name, "Laura Jiménez");
        assert_eq!(rows[1].name, "Sofía Ramírez");
        assert_eq!(lookup.top_debtors_calls(), 1);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn failing_still_counts() {
        let lookup = MockLookup::failing();
        assert!(lookup.count_buyers().await.is_err());
        assert_eq!(lookup.count_buyers_calls(), 1);
    }
}
