// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ledgerchat serve` command implementation.
//!
//! Opens storage, builds the classification cascade, and serves the HTTP
//! gateway until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use ledgerchat_config::LedgerchatConfig;
use ledgerchat_core::LedgerchatError;
use ledgerchat_gateway::{start_server, GatewayState};
use tracing::{error, info};

use crate::bootstrap::{build_pipeline, init_tracing, log_credentials};
use crate::shutdown::install_signal_handler;

/// Run the `ledgerchat serve` command.
pub async fn run_serve(config: LedgerchatConfig) -> Result<(), LedgerchatError> {
    init_tracing(&config.app.log_level);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        name = %config.app.name,
        "starting ledgerchat"
    );
    log_credentials(&config);

    let pipeline = Arc::new(build_pipeline(&config).await?);
    let state = GatewayState::new(
        pipeline.clone(),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let cancel = install_signal_handler();
    let served = start_server(&config.server, state, cancel).await;

    if let Err(e) = pipeline.shutdown().await {
        error!(error = %e, "error during adapter shutdown");
    }
    info!("ledgerchat stopped");
    served
}
