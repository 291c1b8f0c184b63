//! Outbound Slack notifications.
//!
//! Builders turn event data into a [`Notification`]; a [`NotificationSink`]
//! delivers it and reports the HTTP status the receiver answered with.

use crate::metrics_defs::NOTIFICATION_SENT;
use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use shared::counter;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Slack incoming-webhook message
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueChange {
    Opened,
    Closed,
    Reopened,
}

impl IssueChange {
    const fn verb(&self) -> &'static str {
        match self {
            IssueChange::Opened => "opened",
            IssueChange::Closed => "closed",
            IssueChange::Reopened => "reopened",
        }
    }
}

/// Builds the channel message for a GitHub issue event from its `issue` object.
pub fn issue_notification(change: IssueChange, issue: &Value) -> Notification {
    let number = issue.get("number").and_then(Value::as_u64);
    let title = issue
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("untitled");

    let mut text = match number {
        Some(number) => format!("Issue #{number} {}: {title}", change.verb()),
        None => format!("Issue {}: {title}", change.verb()),
    };
    if let Some(login) = issue.pointer("/user/login").and_then(Value::as_str) {
        text.push_str(&format!(" (by {login})"));
    }
    if let Some(url) = issue.get("html_url").and_then(Value::as_str) {
        text.push('\n');
        text.push_str(url);
    }

    Notification { text }
}

/// Builds the channel message for one SendGrid delivery event.
pub fn sendgrid_notification(
    event_type: &str,
    email: &str,
    reason: &str,
    correlation_id: Uuid,
) -> Notification {
    Notification {
        text: format!(
            "SendGrid {event_type} event for {email}: {reason} (event id {correlation_id})"
        ),
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification. Returns the status code the receiver answered with.
    async fn send(&self, notification: &Notification) -> Result<StatusCode, NotifyError>;
}

/// Posts notifications to a Slack incoming webhook.
pub struct SlackWebhookSink {
    client: reqwest::Client,
    webhook_url: Url,
}

impl SlackWebhookSink {
    pub fn new(webhook_url: Url, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl NotificationSink for SlackWebhookSink {
    async fn send(&self, notification: &Notification) -> Result<StatusCode, NotifyError> {
        let result = self
            .client
            .post(self.webhook_url.clone())
            .json(notification)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                counter!(NOTIFICATION_SENT, "status" => status.as_u16().to_string()).increment(1);
                Ok(status)
            }
            Err(e) => {
                counter!(NOTIFICATION_SENT, "status" => "error").increment(1);
                Err(e.into())
            }
        }
    }
}
