// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be held as trait objects.

pub mod adapter;
pub mod classifier;
pub mod lookup;

pub use adapter::PluginAdapter;
pub use classifier::ClassifierAdapter;
pub use lookup::LookupAdapter;
