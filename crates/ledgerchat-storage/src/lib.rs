// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite lookup store for Ledgerchat.
//!
//! Holds the buyers and debtors tables, seeds demo records into an empty
//! database, and serves the four read queries behind [`SqliteLookup`].

pub mod adapter;
pub mod database;
pub mod queries;
pub mod seed;

pub use adapter::SqliteLookup;
pub use database::{Database, IN_MEMORY};
pub use seed::{demo_buyers, demo_debtors, seed_demo_data, SeedReport, DEMO_BUYERS, DEMO_DEBTORS};
