//! Slack slash-command endpoints.

use super::RelayState;
use super::utils;
use crate::creators::ResourceCreator;
use crate::metrics_defs::{RESOURCE_CREATED, WEBHOOK_RECEIVED};
use crate::tasks::{LlmJob, LlmTaskKind};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use shared::counter;
use url::form_urlencoded;

pub const DEFAULT_ISSUE_TITLE: &str = "New Issue from Slack";
pub const DEFAULT_TASK_TITLE: &str = "New Task from Slack";
pub const DEFAULT_PROMPT: &str = "Test prompt from Slack";

const WORKING_ON_IT: &str = "Working on your request... I'll be back with an answer shortly.";
const QUEUE_REFUSED: &str = "Could not queue your request, please try again later.";

/// Fields of a slash-command form body. Missing fields are empty.
#[derive(Debug, Default, PartialEq)]
pub struct SlashCommand {
    pub command: String,
    pub text: String,
    pub user_id: String,
    pub response_url: String,
}

impl SlashCommand {
    pub fn parse(body: &[u8]) -> Self {
        let mut command = SlashCommand::default();
        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "command" => command.command = value.into_owned(),
                "text" => command.text = value.into_owned(),
                "user_id" => command.user_id = value.into_owned(),
                "response_url" => command.response_url = value.into_owned(),
                _ => {}
            }
        }
        command
    }

    /// The command text, or `fallback` when the user typed nothing.
    pub fn text_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.text.is_empty() {
            fallback
        } else {
            &self.text
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlackReply {
    pub response_type: &'static str,
    pub text: String,
}

impl SlackReply {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: "ephemeral",
            text: text.into(),
        }
    }
}

pub fn reply(status: StatusCode, text: impl Into<String>) -> Response<Bytes> {
    utils::json(status, &SlackReply::ephemeral(text))
}

pub async fn github_issue(state: &RelayState, body: &Bytes) -> Response<Bytes> {
    counter!(WEBHOOK_RECEIVED, "source" => "slack").increment(1);

    let command = SlashCommand::parse(body);
    let title = command.text_or(DEFAULT_ISSUE_TITLE);
    let issue_body = format!("Created by Slack user <@{}>", command.user_id);

    match create(state.issue_creator.as_ref(), title, &issue_body).await {
        Ok(()) => reply(
            StatusCode::OK,
            format!("Your issue was created on GitHub: {title}"),
        ),
        Err(_) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error creating issue on GitHub",
        ),
    }
}

pub async fn openproject_task(state: &RelayState, body: &Bytes) -> Response<Bytes> {
    counter!(WEBHOOK_RECEIVED, "source" => "slack").increment(1);

    let command = SlashCommand::parse(body);
    let title = command.text_or(DEFAULT_TASK_TITLE);

    match create(state.task_creator.as_ref(), title, "").await {
        Ok(()) => reply(
            StatusCode::OK,
            format!(
                "Your task {title} was created on OpenProject: {}",
                state.task_project
            ),
        ),
        Err(e) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error creating project on OpenProject: {e}"),
        ),
    }
}

/// Queues the prompt for the LLM worker and acknowledges right away.
pub fn llm(state: &RelayState, body: &Bytes, kind: LlmTaskKind) -> Response<Bytes> {
    counter!(WEBHOOK_RECEIVED, "source" => "slack").increment(1);

    let command = SlashCommand::parse(body);
    let prompt = command.text_or(DEFAULT_PROMPT).to_string();
    let job = LlmJob::new(kind, prompt, command.response_url, command.user_id);

    match state.queue.submit(job) {
        Ok(job_id) => {
            tracing::info!(%job_id, ?kind, "llm job queued");
            reply(StatusCode::OK, WORKING_ON_IT)
        }
        Err(e) => {
            tracing::warn!(?kind, error = %e, "llm job refused");
            reply(StatusCode::OK, QUEUE_REFUSED)
        }
    }
}

async fn create(
    creator: &dyn ResourceCreator,
    title: &str,
    body: &str,
) -> Result<(), crate::creators::CreateError> {
    let target = creator.target();
    match creator.create(title, body).await {
        Ok(created) => {
            counter!(RESOURCE_CREATED, "target" => target, "outcome" => "created").increment(1);
            tracing::info!(creator = target, %created, "resource created");
            Ok(())
        }
        Err(e) => {
            counter!(RESOURCE_CREATED, "target" => target, "outcome" => "failed").increment(1);
            tracing::error!(creator = target, error = %e, "resource creation failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_command() {
        let command = SlashCommand::parse(
            b"command=%2Fgithubissue&text=Fix+the+build&user_id=U123&team_id=T1&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2F1",
        );
        assert_eq!(
            command,
            SlashCommand {
                command: "/githubissue".into(),
                text: "Fix the build".into(),
                user_id: "U123".into(),
                response_url: "https://hooks.slack.com/commands/1".into(),
            }
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let command = SlashCommand::parse(b"");
        assert_eq!(command, SlashCommand::default());
        assert_eq!(command.text_or(DEFAULT_ISSUE_TITLE), DEFAULT_ISSUE_TITLE);

        let command = SlashCommand::parse(b"text=&user_id=U1");
        assert_eq!(command.text_or(DEFAULT_PROMPT), DEFAULT_PROMPT);
    }

    #[test]
    fn test_reply_is_ephemeral() {
        let response = reply(StatusCode::OK, "hi");
        assert_eq!(
            response.body().as_ref(),
            br#"{"response_type":"ephemeral","text":"hi"}"#
        );
    }
}
