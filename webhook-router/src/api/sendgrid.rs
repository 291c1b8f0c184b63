use super::RelayState;
use super::utils;
use crate::markers::MALFORMED_REQUEST;
use crate::metrics_defs::WEBHOOK_RECEIVED;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{Value, json};
use shared::counter;

/// Accepts a batch of SendGrid events. Per-event failures only show up in logs.
pub async fn handle(state: &RelayState, body: &Bytes) -> Response<Bytes> {
    counter!(WEBHOOK_RECEIVED, "source" => "sendgrid").increment(1);

    let events = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(events)) => events,
        Ok(_) => {
            tracing::warn!("sendgrid payload is not an array");
            return utils::marker(StatusCode::BAD_REQUEST, MALFORMED_REQUEST);
        }
        Err(e) => {
            tracing::warn!(error = %e, "sendgrid payload is not JSON");
            return utils::marker(StatusCode::BAD_REQUEST, MALFORMED_REQUEST);
        }
    };

    let outcomes = state.sendgrid.dispatch_batch(&events).await;
    tracing::debug!(events = outcomes.len(), "sendgrid batch processed");

    utils::json(StatusCode::OK, &json!({"status": "ok"}))
}
