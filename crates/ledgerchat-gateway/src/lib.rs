// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Ledgerchat.
//!
//! Serves the chat pipeline over JSON: `POST /chatbot` answers a message,
//! `GET /chatbot/health` reports component health and `GET /` describes the
//! service.

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState};
