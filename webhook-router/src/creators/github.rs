use super::{CreateError, ResourceCreator, ResourceRef, endpoint};
use crate::config::GithubConfig;
use async_trait::async_trait;
use http::StatusCode;
use http::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("contextrelay/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct CreatedIssue {
    number: u64,
}

/// Files issues through the GitHub REST API.
pub struct GithubIssueCreator {
    client: reqwest::Client,
    issues_url: Url,
    token: String,
}

impl GithubIssueCreator {
    pub fn new(config: &GithubConfig, timeout: Duration) -> Result<Self, CreateError> {
        let issues_url = endpoint(
            config.api_url(),
            &format!("repos/{}/{}/issues", config.owner, config.repo),
        )?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            issues_url,
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl ResourceCreator for GithubIssueCreator {
    fn target(&self) -> &'static str {
        "github"
    }

    async fn create(&self, title: &str, body: &str) -> Result<ResourceRef, CreateError> {
        let response = self
            .client
            .post(self.issues_url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&NewIssue { title, body })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %text, "error creating github issue");
            return Err(CreateError::Rejected(status));
        }

        let issue: CreatedIssue = response
            .json()
            .await
            .map_err(|e| CreateError::InvalidResponse(e.to_string()))?;
        tracing::info!(number = issue.number, "github issue created");
        Ok(ResourceRef::GithubIssue(issue.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn creator(server: &MockServer) -> GithubIssueCreator {
        let config = GithubConfig {
            api_url: Some(Url::parse(&server.base_url()).unwrap()),
            owner: "acme".into(),
            repo: "relay".into(),
            token: "ghp_test".into(),
        };
        GithubIssueCreator::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_create_issue() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/repos/acme/relay/issues")
                    .header("authorization", "Bearer ghp_test")
                    .header("accept", GITHUB_ACCEPT)
                    .json_body(json!({"title": "Broken build", "body": "Created by Slack user <@U1>"}));
                then.status(201).json_body(json!({"number": 17, "id": 9001}));
            })
            .await;

        let created = creator(&server)
            .create("Broken build", "Created by Slack user <@U1>")
            .await
            .unwrap();

        assert_eq!(created, ResourceRef::GithubIssue(17));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/repos/acme/relay/issues");
                then.status(401).json_body(json!({"message": "Bad credentials"}));
            })
            .await;

        let err = creator(&server).create("t", "b").await.unwrap_err();
        assert!(matches!(err, CreateError::Rejected(StatusCode::UNAUTHORIZED)));
    }

    #[tokio::test]
    async fn test_success_without_number() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/repos/acme/relay/issues");
                then.status(200).body("not json");
            })
            .await;

        let err = creator(&server).create("t", "b").await.unwrap_err();
        assert!(matches!(err, CreateError::InvalidResponse(_)));
    }
}
