use super::RelayState;
use super::utils;
use crate::github::GithubOutcome;
use crate::metrics_defs::WEBHOOK_RECEIVED;
use hyper::Response;
use hyper::body::Bytes;
use serde_json::Value;
use shared::counter;

pub async fn handle(state: &RelayState, body: &Bytes) -> Response<Bytes> {
    counter!(WEBHOOK_RECEIVED, "source" => "github").increment(1);

    let outcome = match serde_json::from_slice::<Value>(body) {
        Ok(payload) => state.github.dispatch(&payload).await,
        Err(e) => {
            tracing::warn!(error = %e, "github payload is not JSON");
            GithubOutcome::Malformed
        }
    };

    let (status, marker) = outcome.status_and_marker();
    utils::marker(status, marker)
}
