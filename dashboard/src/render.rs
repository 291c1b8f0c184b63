use crate::DashboardError;
use crate::loaders::IssueSource;
use crate::table::TablePage;
use chrono::{DateTime, Utc};
use minijinja::{Environment, context};
use serde::Serialize;

pub const TITLE: &str = "RelayOps: Ops Dashboard";

const TEMPLATE_NAME: &str = "dash.html";
const TEMPLATE: &str = include_str!("../templates/dash.html");

#[derive(Serialize)]
struct TabLink {
    tab: &'static str,
    label: &'static str,
    selected: bool,
}

pub fn refresh_footer(refreshed_at: DateTime<Utc>) -> String {
    format!("Last refresh: {} UTC", refreshed_at.format("%Y-%m-%d %H:%M:%S"))
}

/// Renders the dashboard page for the selected source.
///
/// The page reloads itself every `refresh_interval_secs` through a meta
/// refresh, which keeps the selected tab and page in the URL. Cell values are
/// escaped by the template engine since the template name ends in `.html`.
pub fn render_page(
    base_path: &str,
    source: IssueSource,
    table: &TablePage,
    refreshed_at: DateTime<Utc>,
    refresh_interval_secs: u64,
) -> Result<String, DashboardError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;

    let tabs: Vec<TabLink> = IssueSource::ALL
        .into_iter()
        .map(|tab| TabLink {
            tab: tab.tab(),
            label: tab.label(),
            selected: tab == source,
        })
        .collect();

    let html = env.get_template(TEMPLATE_NAME)?.render(context! {
        title => TITLE,
        base_path => base_path,
        source => source.tab(),
        tabs => tabs,
        table => table,
        refresh_interval_secs => refresh_interval_secs,
        footer => refresh_footer(refreshed_at),
    })?;
    Ok(html)
}
