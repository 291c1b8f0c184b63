use super::slack::reply;
use crate::metrics_defs::WEBHOOK_RECEIVED;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::Value;
use shared::counter;

const WORK_PACKAGE_CREATED: &str = "work_package:created";

/// OpenProject webhook receiver. Only logs; nothing is forwarded.
pub fn handle(body: &Bytes) -> Response<Bytes> {
    counter!(WEBHOOK_RECEIVED, "source" => "openproject").increment(1);

    let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let Some(action) = payload.get("action").and_then(Value::as_str) else {
        return reply(StatusCode::BAD_REQUEST, "No action provided");
    };

    if action == WORK_PACKAGE_CREATED {
        let subject = payload
            .pointer("/work_package/subject")
            .and_then(Value::as_str);
        tracing::info!(action, subject, "openproject work package created");
    } else {
        tracing::debug!(action, "ignoring openproject event");
    }

    reply(StatusCode::OK, "Testing: unknown")
}
