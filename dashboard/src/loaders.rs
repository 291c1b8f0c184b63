//! Issue list loaders backing the dashboard tabs.
//!
//! Each loader returns flat records whose keys are consistent across calls.
//! No ordering guarantee is made; rows are rendered in the order returned.

use crate::DashboardError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;

pub type Record = Map<String, Value>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    #[default]
    Github,
    Sentry,
    OpenProject,
}

impl IssueSource {
    pub const ALL: [IssueSource; 3] = [
        IssueSource::Github,
        IssueSource::Sentry,
        IssueSource::OpenProject,
    ];

    /// Value used in the `tab` query parameter.
    pub const fn tab(&self) -> &'static str {
        match self {
            IssueSource::Github => "github",
            IssueSource::Sentry => "sentry",
            IssueSource::OpenProject => "openproject",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            IssueSource::Github => "GitHub",
            IssueSource::Sentry => "Sentry",
            IssueSource::OpenProject => "OpenProject",
        }
    }
}

impl fmt::Display for IssueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tab())
    }
}

impl FromStr for IssueSource {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueSource::ALL
            .into_iter()
            .find(|source| source.tab() == s)
            .ok_or_else(|| DashboardError::UnknownTab(s.to_string()))
    }
}

#[async_trait]
pub trait IssueLoader: Send + Sync {
    fn source(&self) -> IssueSource;

    async fn load(&self) -> Result<Vec<Record>, DashboardError>;
}

/// Serves a fixed set of records. Used until a source is wired to its real API.
pub struct PlaceholderLoader {
    source: IssueSource,
    records: Vec<Record>,
}

impl PlaceholderLoader {
    pub fn new(source: IssueSource, records: Vec<Record>) -> Self {
        Self { source, records }
    }

    pub fn github() -> Self {
        Self::new(
            IssueSource::Github,
            records(json!([
                {"id": 101, "title": "Memory leak in worker", "state": "open",
                 "labels": "bug", "updated": "2025-06-12 14:20"},
            ])),
        )
    }

    pub fn sentry() -> Self {
        Self::new(
            IssueSource::Sentry,
            records(json!([
                {"id": "SEN-55", "event": "UnhandledPromiseRejection",
                 "env": "prod", "users": 7, "last_seen": "2025-06-13 02:03"},
            ])),
        )
    }

    pub fn openproject() -> Self {
        Self::new(
            IssueSource::OpenProject,
            records(json!([
                {"id": 2315, "subject": "Payment portal 500", "priority": "High",
                 "status": "New", "updated": "2025-06-12 23:48"},
            ])),
        )
    }
}

#[async_trait]
impl IssueLoader for PlaceholderLoader {
    fn source(&self) -> IssueSource {
        self.source
    }

    async fn load(&self) -> Result<Vec<Record>, DashboardError> {
        Ok(self.records.clone())
    }
}

fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(rows) => rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_parsing() {
        assert_eq!("github".parse::<IssueSource>().unwrap(), IssueSource::Github);
        assert_eq!(
            "openproject".parse::<IssueSource>().unwrap(),
            IssueSource::OpenProject
        );
        assert!(matches!(
            "jira".parse::<IssueSource>(),
            Err(DashboardError::UnknownTab(_))
        ));
    }

    #[tokio::test]
    async fn test_placeholder_keys_keep_insertion_order() {
        let rows = PlaceholderLoader::sentry().load().await.unwrap();
        assert_eq!(rows.len(), 1);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "event", "env", "users", "last_seen"]);
    }
}
