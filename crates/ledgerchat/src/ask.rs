// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ledgerchat ask` command implementation.

use ledgerchat_config::LedgerchatConfig;
use ledgerchat_core::{ChatReply, LedgerchatError};
use ledgerchat_router::ChatPipeline;
use tracing::{error, info};

use crate::bootstrap::{build_pipeline, init_tracing, log_credentials};

/// Answer one message and print the reply envelope as pretty JSON.
pub async fn run_ask(config: LedgerchatConfig, message: &str) -> Result<(), LedgerchatError> {
    init_tracing(&config.app.log_level);
    log_credentials(&config);

    let pipeline = build_pipeline(&config).await?;
    let result = ask(&pipeline, message).await;

    if let Err(e) = pipeline.shutdown().await {
        error!(error = %e, "error during adapter shutdown");
    }

    println!("{}", render_reply(&result?)?);
    Ok(())
}

/// Run one message through the pipeline, logging which stage classified it.
pub async fn ask(pipeline: &ChatPipeline, message: &str) -> Result<ChatReply, LedgerchatError> {
    let outcome = pipeline.handle(message).await?;
    info!(
        source = %outcome.classification.source,
        failed_stages = ?outcome.classification.failed_stages,
        "classified"
    );
    Ok(outcome.reply)
}

pub fn render_reply(reply: &ChatReply) -> Result<String, LedgerchatError> {
    serde_json::to_string_pretty(reply)
        .map_err(|e| LedgerchatError::Internal(format!("failed to render reply: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchat_test_utils::{MockLookup, TestHarness};

    #[tokio::test]
    async fn ask_renders_reply_envelope() {
        let harness = TestHarness::builder()
            .with_mock_lookup(MockLookup::new())
            .build()
            .await
            .unwrap();

        let reply = ask(&harness.pipeline, "dame los top 2 deudores").await.unwrap();
        let rendered = render_reply(&reply).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
        assert_eq!(value["data"][0]["name"], "Laura Jiménez");
    }

    #[tokio::test]
    async fn ask_propagates_lookup_faults() {
        let harness = TestHarness::builder()
            .with_mock_lookup(MockLookup::failing())
            .build()
            .await
            .unwrap();

        assert!(ask(&harness.pipeline, "cuántos deudores hay").await.is_err());
    }
}
