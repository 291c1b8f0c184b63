//! GitHub issue event dispatch.

use crate::markers::{MALFORMED_REQUEST, NO_SUCH_ENDPOINT, SLACK_UNREACHABLE, SUCCESS};
use crate::notifications::{IssueChange, NotificationSink, issue_notification};
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

/// Body GitHub sends in the `ping` delivery when a webhook is first configured.
pub const ZEN_TEST_STRING: &str = "Practicality beats purity.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GithubAction {
    Open,
    Opened,
    Closed,
    Reopen,
}

impl GithubAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "open" => Some(GithubAction::Open),
            "opened" => Some(GithubAction::Opened),
            "closed" => Some(GithubAction::Closed),
            "reopen" => Some(GithubAction::Reopen),
            _ => None,
        }
    }

    pub const fn change(&self) -> IssueChange {
        match self {
            GithubAction::Open | GithubAction::Opened => IssueChange::Opened,
            GithubAction::Closed => IssueChange::Closed,
            GithubAction::Reopen => IssueChange::Reopened,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GithubOutcome {
    /// The notification was accepted with a 200.
    Delivered(GithubAction),
    /// Webhook connectivity check.
    ZenTest,
    NoHandler(String),
    Malformed,
    /// The sink failed or answered with anything but a 200.
    Undelivered(GithubAction),
}

impl GithubOutcome {
    pub fn status_and_marker(&self) -> (StatusCode, &'static str) {
        match self {
            GithubOutcome::Delivered(_) | GithubOutcome::ZenTest => (StatusCode::OK, SUCCESS),
            GithubOutcome::NoHandler(_) => (StatusCode::BAD_REQUEST, NO_SUCH_ENDPOINT),
            GithubOutcome::Malformed => (StatusCode::BAD_REQUEST, MALFORMED_REQUEST),
            GithubOutcome::Undelivered(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SLACK_UNREACHABLE)
            }
        }
    }
}

pub struct GithubDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl GithubDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Routes one GitHub webhook payload. Every call delivers at most one
    /// notification; repeated deliveries are not deduplicated.
    pub async fn dispatch(&self, payload: &Value) -> GithubOutcome {
        let Some(event) = payload.as_object() else {
            return GithubOutcome::Malformed;
        };

        let action = match event.get("action") {
            Some(Value::String(action)) if !action.is_empty() => Some(action.as_str()),
            // Any other non-empty action can never name a handler
            Some(other) if is_set(other) => {
                tracing::info!(action = %other, "no handler for github action");
                return GithubOutcome::NoHandler(other.to_string());
            }
            _ => None,
        };

        let Some(action) = action else {
            if event.get("zen").and_then(Value::as_str) == Some(ZEN_TEST_STRING) {
                tracing::info!("github webhook connectivity test");
                return GithubOutcome::ZenTest;
            }
            return GithubOutcome::Malformed;
        };

        let Some(handler) = GithubAction::parse(action) else {
            tracing::info!(action, "no handler for github action");
            return GithubOutcome::NoHandler(action.to_string());
        };

        let Some(issue) = event.get("issue").filter(|issue| issue.is_object()) else {
            tracing::warn!(action, "github event without issue");
            return GithubOutcome::Malformed;
        };

        let notification = issue_notification(handler.change(), issue);
        match self.sink.send(&notification).await {
            Ok(StatusCode::OK) => GithubOutcome::Delivered(handler),
            Ok(status) => {
                tracing::warn!(action, status = status.as_u16(), "notification rejected");
                GithubOutcome::Undelivered(handler)
            }
            Err(e) => {
                tracing::error!(action, error = %e, "notification delivery failed");
                GithubOutcome::Undelivered(handler)
            }
        }
    }
}

/// False for null, false, zero and empty values.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(set) => *set,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::RecordingSink;
    use serde_json::json;

    fn issue_event(action: &str) -> Value {
        json!({
            "action": action,
            "issue": {"number": 7, "title": "Flaky test"},
        })
    }

    #[tokio::test]
    async fn test_known_actions_send_once() {
        for (action, verb) in [
            ("open", "opened"),
            ("opened", "opened"),
            ("closed", "closed"),
            ("reopen", "reopened"),
        ] {
            let sink = Arc::new(RecordingSink::healthy());
            let dispatcher = GithubDispatcher::new(sink.clone());

            let outcome = dispatcher.dispatch(&issue_event(action)).await;
            assert!(matches!(outcome, GithubOutcome::Delivered(_)), "{action}");
            assert_eq!(outcome.status_and_marker(), (StatusCode::OK, SUCCESS));

            let sent = sink.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].text, format!("Issue #7 {verb}: Flaky test"));
        }
    }

    #[tokio::test]
    async fn test_zen_ignores_other_fields() {
        let sink = Arc::new(RecordingSink::unreachable());
        let dispatcher = GithubDispatcher::new(sink.clone());

        let payload = json!({"zen": ZEN_TEST_STRING, "hook_id": 1, "issue": "nonsense"});
        let outcome = dispatcher.dispatch(&payload).await;
        assert_eq!(outcome, GithubOutcome::ZenTest);
        assert_eq!(outcome.status_and_marker(), (StatusCode::OK, SUCCESS));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let sink = Arc::new(RecordingSink::healthy());
        let dispatcher = GithubDispatcher::new(sink.clone());

        let outcome = dispatcher.dispatch(&issue_event("labeled")).await;
        assert_eq!(outcome, GithubOutcome::NoHandler("labeled".into()));
        assert_eq!(
            outcome.status_and_marker(),
            (StatusCode::BAD_REQUEST, NO_SUCH_ENDPOINT)
        );
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_string_action_has_no_handler() {
        let sink = Arc::new(RecordingSink::healthy());
        let dispatcher = GithubDispatcher::new(sink.clone());

        let outcome = dispatcher
            .dispatch(&json!({"action": 5, "issue": {"number": 1}}))
            .await;
        assert_eq!(outcome, GithubOutcome::NoHandler("5".into()));
        assert_eq!(
            outcome.status_and_marker(),
            (StatusCode::BAD_REQUEST, NO_SUCH_ENDPOINT)
        );

        let outcome = dispatcher.dispatch(&json!({"action": true})).await;
        assert_eq!(outcome, GithubOutcome::NoHandler("true".into()));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payloads() {
        let dispatcher = GithubDispatcher::new(Arc::new(RecordingSink::healthy()));

        for payload in [
            json!([1, 2]),
            json!({}),
            json!({"action": ""}),
            json!({"action": 0}),
            json!({"action": null}),
            json!({"zen": "Errors should never pass silently."}),
            json!({"action": "opened"}),
            json!({"action": "opened", "issue": "not an object"}),
        ] {
            let outcome = dispatcher.dispatch(&payload).await;
            assert_eq!(outcome, GithubOutcome::Malformed, "{payload}");
            assert_eq!(
                outcome.status_and_marker(),
                (StatusCode::BAD_REQUEST, MALFORMED_REQUEST)
            );
        }
    }

    #[tokio::test]
    async fn test_delivery_failures_are_unreachable() {
        for sink in [
            RecordingSink::unreachable(),
            RecordingSink::with_status(StatusCode::FORBIDDEN),
        ] {
            let dispatcher = GithubDispatcher::new(Arc::new(sink));
            let outcome = dispatcher.dispatch(&issue_event("closed")).await;
            assert_eq!(outcome, GithubOutcome::Undelivered(GithubAction::Closed));
            assert_eq!(
                outcome.status_and_marker(),
                (StatusCode::INTERNAL_SERVER_ERROR, SLACK_UNREACHABLE)
            );
        }
    }

    #[tokio::test]
    async fn test_duplicate_deliveries_are_not_suppressed() {
        let sink = Arc::new(RecordingSink::healthy());
        let dispatcher = GithubDispatcher::new(sink.clone());
        let payload = issue_event("opened");

        for _ in 0..2 {
            let outcome = dispatcher.dispatch(&payload).await;
            assert_eq!(outcome.status_and_marker().0, StatusCode::OK);
        }
        assert_eq!(sink.sent().len(), 2);
    }
}
