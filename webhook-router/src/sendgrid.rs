//! SendGrid event webhook dispatch.
//!
//! SendGrid posts batches of delivery events. Each element is handled on its
//! own and gets its own correlation id; failures never abort the batch.

use crate::notifications::{NotificationSink, sendgrid_notification};
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_REASON: &str = "no reason";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendgridEventType {
    Dropped,
    Bounce,
    Click,
    Open,
    Deferred,
    Delivered,
    SpamReport,
    Unsubscribed,
}

impl SendgridEventType {
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "dropped" => Some(SendgridEventType::Dropped),
            "bounce" => Some(SendgridEventType::Bounce),
            "click" => Some(SendgridEventType::Click),
            "open" => Some(SendgridEventType::Open),
            "deferred" => Some(SendgridEventType::Deferred),
            "delivered" => Some(SendgridEventType::Delivered),
            "spamreport" => Some(SendgridEventType::SpamReport),
            "unsubscribed" => Some(SendgridEventType::Unsubscribed),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SendgridEventType::Dropped => "dropped",
            SendgridEventType::Bounce => "bounce",
            SendgridEventType::Click => "click",
            SendgridEventType::Open => "open",
            SendgridEventType::Deferred => "deferred",
            SendgridEventType::Delivered => "delivered",
            SendgridEventType::SpamReport => "spamreport",
            SendgridEventType::Unsubscribed => "unsubscribed",
        }
    }
}

/// What happened to one element of a SendGrid batch.
#[derive(Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Notified {
        event_type: SendgridEventType,
        correlation_id: Uuid,
        status: StatusCode,
    },
    Failed {
        event_type: SendgridEventType,
        correlation_id: Uuid,
    },
    NoHandler(Option<String>),
    MissingEmail(SendgridEventType),
    NotAnObject,
}

pub struct SendgridDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl SendgridDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Handles every event of a batch in order, one handler lookup per element.
    pub async fn dispatch_batch(&self, events: &[Value]) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.dispatch_event(event).await);
        }
        outcomes
    }

    async fn dispatch_event(&self, event: &Value) -> EventOutcome {
        let Some(event) = event.as_object() else {
            tracing::warn!("skipping sendgrid event that is not an object");
            return EventOutcome::NotAnObject;
        };

        let event_name = event.get("event").and_then(Value::as_str);
        let email = event.get("email").and_then(Value::as_str);
        tracing::info!(event_type = event_name, email, "sendgrid event");
        if event_name == Some("dropped") {
            let reason = event.get("reason").and_then(Value::as_str);
            tracing::info!(reason, "sendgrid message dropped");
        }

        let Some(event_type) = event_name.and_then(SendgridEventType::parse) else {
            tracing::info!(event_type = event_name, "no handler for sendgrid event type");
            return EventOutcome::NoHandler(event_name.map(str::to_string));
        };

        let Some(email) = email else {
            tracing::warn!(event_type = event_type.as_str(), "sendgrid event without email");
            return EventOutcome::MissingEmail(event_type);
        };

        let correlation_id = Uuid::new_v4();
        self.notify(event_type, email, event, correlation_id).await
    }

    async fn notify(
        &self,
        event_type: SendgridEventType,
        email: &str,
        event: &serde_json::Map<String, Value>,
        correlation_id: Uuid,
    ) -> EventOutcome {
        let reason = event
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_REASON);

        let notification =
            sendgrid_notification(event_type.as_str(), email, reason, correlation_id);

        match self.sink.send(&notification).await {
            Ok(status) => {
                tracing::info!(
                    %correlation_id,
                    event_type = event_type.as_str(),
                    status = status.as_u16(),
                    "sendgrid notification sent"
                );
                EventOutcome::Notified {
                    event_type,
                    correlation_id,
                    status,
                }
            }
            Err(e) => {
                tracing::error!(
                    %correlation_id,
                    event_type = event_type.as_str(),
                    error = %e,
                    "sendgrid notification failed"
                );
                EventOutcome::Failed {
                    event_type,
                    correlation_id,
                }
            }
        }
    }
}
