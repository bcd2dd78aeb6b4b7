//! Webhook HTTP endpoint.
//!
//! Response policy: bad signature is 401, malformed JSON is 400, an
//! unrecognized or policy-skipped event is still 200 so the platform stops
//! redelivering it, and a processing failure is 500 so the platform's
//! redelivery retries the event.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use storebridge_core::{DispatchOutcome, EventDispatcher, WebhookEvent};
use tracing::{debug, error, warn};

use crate::gateway::verify_signature;

const SIGNATURE_HEADER: &str = "x-wix-webhook-signature";

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: Arc<EventDispatcher>,
    pub webhook_secret: String,
}

/// Build the webhook router.
pub fn webhook_router(state: WebhookState) -> Router {
    Router::new().route("/webhooks/wix", post(handle_webhook)).with_state(state)
}

async fn handle_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(&state.webhook_secret, &body, signature) {
        warn!("webhook rejected: signature verification failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid signature" })),
        )
            .into_response();
    }

    let envelope: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "webhook rejected: malformed JSON body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "malformed JSON body" })),
            )
                .into_response();
        }
    };

    let event = WebhookEvent::from_envelope(&envelope);
    match state.dispatcher.dispatch(event).await {
        Ok(DispatchOutcome::Handled) => {
            (StatusCode::OK, Json(json!({ "acknowledged": true, "handled": true })))
                .into_response()
        }
        Ok(DispatchOutcome::Ignored(reason)) => {
            debug!(reason, "webhook acknowledged without processing");
            (
                StatusCode::OK,
                Json(json!({ "acknowledged": true, "handled": false, "reason": reason })),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "webhook processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
