// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Ledgerchat integration tests.
//!
//! Mock adapters and a harness for fast, deterministic tests without
//! network access.
//!
//! # Components
//!
//! - [`MockClassifier`] - scripted classifier with failure injection and call counting
//! - [`MockLookup`] - in-memory buyers/debtors with per-query call counters
//! - [`TestHarness`] - a full pipeline wired from mocks and a temp database

pub mod harness;
pub mod mock_classifier;
pub mod mock_lookup;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_classifier::{MockBehavior, MockClassifier};
pub use mock_lookup::MockLookup;
