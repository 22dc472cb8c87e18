// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Every response body is a JSON envelope with `status` and `message`;
//! internal error text never appears in it.

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledgerchat_core::{Availability, ChatReply, ReplyStatus};
use ledgerchat_router::PROCESSING_ERROR_MESSAGE;
use ledgerchat_security::sanitize_value;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::server::GatewayState;

pub const NOT_JSON_MESSAGE: &str = "La solicitud debe ser en formato JSON";
pub const NO_DATA_MESSAGE: &str = "No se proporcionaron datos JSON";
pub const MISSING_MESSAGE_FIELD: &str = "Faltan campos requeridos: message";
pub const EMPTY_MESSAGE: &str = "El mensaje no puede estar vacío";
pub const TOO_LARGE_MESSAGE: &str = "La solicitud es demasiado grande";
pub const TIMEOUT_MESSAGE: &str = "La consulta tardó demasiado en procesarse";
pub const HEALTHY_MESSAGE: &str = "El servicio del chatbot está funcionando correctamente";
pub const UNHEALTHY_MESSAGE: &str = "El servicio del chatbot no está disponible";

/// Response body for `POST /chatbot`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub reply: ChatReply,
    /// Wall-clock handling time, e.g. `"0.12s"`.
    pub processing_time: String,
}

/// Per-component entry in the health report.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifierHealth {
    pub name: String,
    pub availability: Availability,
}

/// Response body for `GET /chatbot/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ReplyStatus,
    pub message: String,
    pub storage: ComponentHealth,
    pub classifiers: Vec<ClassifierHealth>,
    pub version: String,
    pub uptime_secs: u64,
    pub timestamp: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ChatReply::error(message))).into_response()
}

/// GET /
pub async fn get_index() -> Json<Value> {
    Json(json!({
        "status": "API funcionando correctamente",
        "endpoints": ["/chatbot", "/chatbot/health"],
        "descripción": "API para chatbot con detección de intenciones",
    }))
}

/// POST /chatbot
///
/// Expects `{"message": "..."}`. Input problems are 400s; lookup faults are
/// a generic 500; exceeding the request timeout is a 504.
pub async fn post_chatbot(
    State(state): State<GatewayState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected chat request body");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return error_response(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_MESSAGE);
            }
            return error_response(StatusCode::BAD_REQUEST, NOT_JSON_MESSAGE);
        }
    };

    let message = match validate_body(&body) {
        Ok(message) => message,
        Err(reason) => return error_response(StatusCode::BAD_REQUEST, reason),
    };

    let request_id = uuid::Uuid::new_v4().to_string();
    let started = Instant::now();
    let sanitized = sanitize_value(message);

    match tokio::time::timeout(
        state.request_timeout,
        state.pipeline.handle_sanitized(sanitized),
    )
    .await
    {
        Ok(Ok(outcome)) => {
            let elapsed = started.elapsed();
            info!(
                request_id = %request_id,
                source = %outcome.classification.source,
                intent = %outcome.classification.result.intent.kind(),
                elapsed_ms = elapsed.as_millis() as u64,
                "chat request served"
            );
            let body = ChatResponse {
                reply: outcome.reply,
                processing_time: format!("{:.2}s", elapsed.as_secs_f64()),
            };
            let mut response = (StatusCode::OK, Json(body)).into_response();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response.headers_mut().insert("x-request-id", value);
            }
            response
        }
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "chat request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR_MESSAGE)
        }
        Err(_) => {
            warn!(
                request_id = %request_id,
                timeout = ?state.request_timeout,
                "chat request timed out"
            );
            error_response(StatusCode::GATEWAY_TIMEOUT, TIMEOUT_MESSAGE)
        }
    }
}

/// Check the request shape and return the `message` value.
fn validate_body(body: &Value) -> Result<&Value, &'static str> {
    let Some(object) = body.as_object().filter(|o| !o.is_empty()) else {
        return Err(NO_DATA_MESSAGE);
    };
    let Some(message) = object.get("message") else {
        return Err(MISSING_MESSAGE_FIELD);
    };
    match message {
        Value::Null => Err(EMPTY_MESSAGE),
        Value::String(s) if s.trim().is_empty() => Err(EMPTY_MESSAGE),
        other => Ok(other),
    }
}

/// GET /chatbot/health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let health = state.pipeline.health().await;
    let serving = health.is_serving();
    let (name, status) = health.lookup;

    let body = HealthResponse {
        status: if serving {
            ReplyStatus::Success
        } else {
            ReplyStatus::Error
        },
        message: if serving {
            HEALTHY_MESSAGE
        } else {
            UNHEALTHY_MESSAGE
        }
        .to_string(),
        storage: ComponentHealth {
            name,
            status: status.label().to_string(),
            detail: status.detail().map(str::to_string),
        },
        classifiers: health
            .classifiers
            .into_iter()
            .map(|(name, availability)| ClassifierHealth { name, availability })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    let code = if serving {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_body_rejections() {
        assert_eq!(validate_body(&json!({})), Err(NO_DATA_MESSAGE));
        assert_eq!(validate_body(&json!([1])), Err(NO_DATA_MESSAGE));
        assert_eq!(validate_body(&json!({"msg": "hi"})), Err(MISSING_MESSAGE_FIELD));
        assert_eq!(validate_body(&json!({"message": "  "})), Err(EMPTY_MESSAGE));
        assert_eq!(validate_body(&json!({"message": null})), Err(EMPTY_MESSAGE));
    }

    #[test]
    fn validate_body_accepts_text_and_scalars() {
        assert_eq!(validate_body(&json!({"message": "hola"})), Ok(&json!("hola")));
        assert_eq!(validate_body(&json!({"message": 7})), Ok(&json!(7)));
    }

    #[test]
    fn chat_response_flattens_reply() {
        let resp = ChatResponse {
            reply: ChatReply::success("ok", Some(json!({"total": 1}))),
            processing_time: "0.12s".into(),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["total"], 1);
        assert_eq!(value["processing_time"], "0.12s");
    }
}
