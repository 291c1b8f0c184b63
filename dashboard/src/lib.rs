//! Operational issue dashboard.
//!
//! Polls one issue loader per tab and renders the rows as a paginated table
//! with a refresh timestamp. Mounted by the webhook router under `/dash`.

pub mod loaders;
pub mod render;
pub mod table;

use chrono::{DateTime, Utc};
use loaders::{IssueLoader, IssueSource, PlaceholderLoader};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use table::TablePage;

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("unknown dashboard tab: {0}")]
    UnknownTab(String),
    #[error("no loader registered for {0}")]
    NoLoader(IssueSource),
    #[error("failed to load {tab} issues: {message}")]
    Load { tab: IssueSource, message: String },
    #[error("failed to render dashboard: {0}")]
    Render(#[from] minijinja::Error),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_page_size() -> usize {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            refresh_interval_secs: default_refresh_interval_secs(),
            page_size: default_page_size(),
        }
    }
}

/// A rendered snapshot of one tab.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardView {
    pub source: IssueSource,
    pub refreshed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub table: TablePage,
}

pub struct Dashboard {
    config: DashboardConfig,
    loaders: Vec<Arc<dyn IssueLoader>>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, loaders: Vec<Arc<dyn IssueLoader>>) -> Self {
        Self { config, loaders }
    }

    pub fn with_placeholder_loaders(config: DashboardConfig) -> Self {
        Self::new(
            config,
            vec![
                Arc::new(PlaceholderLoader::github()),
                Arc::new(PlaceholderLoader::sentry()),
                Arc::new(PlaceholderLoader::openproject()),
            ],
        )
    }

    /// Loads the selected tab (GitHub when unset) and slices out the requested page.
    pub async fn view(
        &self,
        tab: Option<&str>,
        page: Option<usize>,
    ) -> Result<DashboardView, DashboardError> {
        let source = match tab {
            Some(tab) => tab.parse()?,
            None => IssueSource::default(),
        };

        let loader = self
            .loaders
            .iter()
            .find(|loader| loader.source() == source)
            .ok_or(DashboardError::NoLoader(source))?;

        let records = loader.load().await?;
        tracing::debug!(%source, rows = records.len(), "dashboard loaded");

        Ok(DashboardView {
            source,
            refreshed_at: Utc::now(),
            table: TablePage::build(&records, page.unwrap_or(1), self.config.page_size),
        })
    }

    pub fn render_html(
        &self,
        base_path: &str,
        view: &DashboardView,
    ) -> Result<String, DashboardError> {
        render::render_page(
            base_path,
            view.source,
            &view.table,
            view.refreshed_at,
            self.config.refresh_interval_secs,
        )
    }
}
