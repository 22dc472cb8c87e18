// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps a resolved intent to a lookup and a formatted reply.

use std::sync::Arc;

use ledgerchat_core::{
    Buyer, ChatReply, Debtor, Intent, IntentResult, LedgerchatError, Limit, LookupAdapter,
};
use serde_json::json;
use tracing::{info, warn};

/// Reply for messages no classifier could place.
pub const CLARIFICATION_MESSAGE: &str = "No he entendido tu consulta. Por favor, intenta preguntar sobre los compradores o deudores de nuestra base de datos.";

/// Reply when processing fails for a reason the user cannot act on.
pub const PROCESSING_ERROR_MESSAGE: &str = "Ocurrió un error al procesar tu consulta.";

const NO_BUYERS_MESSAGE: &str = "No hay compradores registrados en el sistema.";
const NO_DEBTORS_MESSAGE: &str = "No hay deudores registrados en el sistema.";

/// Dispatches intents to the lookup backend.
///
/// Each intent results in at most one lookup call. Given the same intent and
/// unchanged data the reply is identical.
pub struct IntentRouter {
    lookup: Arc<dyn LookupAdapter>,
}

impl IntentRouter {
    pub fn new(lookup: Arc<dyn LookupAdapter>) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &Arc<dyn LookupAdapter> {
        &self.lookup
    }

    /// Build the reply for a classification result.
    ///
    /// Only lookup faults produce an error.
    pub async fn route(&self, result: &IntentResult) -> Result<ChatReply, LedgerchatError> {
        match result.intent {
            Intent::TopBuyers { limit } => {
                let limit = Limit::or_default(limit);
                info!(%limit, "querying top buyers");
                let rows = self.lookup.top_buyers(limit).await?;
                Ok(format_top_buyers(&rows))
            }
            Intent::TopDebtors { limit } => {
                let limit = Limit::or_default(limit);
                info!(%limit, "querying top debtors");
                let rows = self.lookup.top_debtors(limit).await?;
                Ok(format_top_debtors(&rows))
            }
            Intent::CountBuyers => {
                let total = self.lookup.count_buyers().await?;
                Ok(format_count(total, "compradores"))
            }
            Intent::CountDebtors => {
                let total = self.lookup.count_debtors().await?;
                Ok(format_count(total, "deudores"))
            }
            Intent::Unknown => {
                warn!("unresolved intent, asking for clarification");
                Ok(ChatReply::error(CLARIFICATION_MESSAGE))
            }
        }
    }
}

fn format_ranked<'a>(header: String, lines: impl Iterator<Item = (&'a str, f64)>) -> String {
    let mut message = header;
    for (i, (name, value)) in lines.enumerate() {
        message.push('\n');
        message.push_str(&format!("{}. {name} — ${value:.2}", i + 1));
    }
    message
}

fn format_top_buyers(rows: &[Buyer]) -> ChatReply {
    if rows.is_empty() {
        return ChatReply::success(NO_BUYERS_MESSAGE, None);
    }
    let message = format_ranked(
        format!("Los {} mejores compradores son:", rows.len()),
        rows.iter().map(|b| (b.name.as_str(), b.total_purchased)),
    );
    ChatReply::success(message, Some(json!(rows)))
}

fn format_top_debtors(rows: &[Debtor]) -> ChatReply {
    if rows.is_empty() {
        return ChatReply::success(NO_DEBTORS_MESSAGE, None);
    }
    let message = format_ranked(
        format!("Los {} deudores con montos más altos son:", rows.len()),
        rows.iter().map(|d| (d.name.as_str(), d.amount_owed)),
    );
    ChatReply::success(message, Some(json!(rows)))
}

fn format_count(total: u64, noun: &str) -> ChatReply {
    ChatReply::success(
        format!("Hay un total de {total} {noun} registrados en el sistema."),
        Some(json!({ "total": total })),
    )
}
