//! Creation of remote resources (GitHub issues, OpenProject work packages).

pub mod github;
pub mod openproject;

use async_trait::async_trait;
use http::StatusCode;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CreateError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("rejected with status {0}")]
    Rejected(StatusCode),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("unknown project: {0}")]
    UnknownProject(String),
    #[error("unknown work package type: {0}")]
    UnknownType(String),
    #[error("failed to fetch project: {0}")]
    FetchProject(String),
    #[error("failed to create task: {0}")]
    CreateTask(String),
}

/// Identifier of a resource created on a remote system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceRef {
    GithubIssue(u64),
    WorkPackage(u64),
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::GithubIssue(number) => write!(f, "issue #{number}"),
            ResourceRef::WorkPackage(id) => write!(f, "work package {id}"),
        }
    }
}

#[async_trait]
pub trait ResourceCreator: Send + Sync {
    /// Short name used in logs and metric tags.
    fn target(&self) -> &'static str;

    async fn create(&self, title: &str, body: &str) -> Result<ResourceRef, CreateError>;
}

fn endpoint(base: &str, path: &str) -> Result<url::Url, CreateError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    url::Url::parse(&raw).map_err(|e| CreateError::InvalidUrl(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        assert_eq!(
            endpoint("https://ghe.example.com/api/v3/", "/repos/a/b/issues")
                .unwrap()
                .as_str(),
            "https://ghe.example.com/api/v3/repos/a/b/issues"
        );
        assert!(matches!(
            endpoint("not a url", "x"),
            Err(CreateError::InvalidUrl(_))
        ));
    }
}
