use super::RelayState;
use super::utils;
use dashboard::{DashboardError, DashboardView};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use shared::http::html_response;
use url::form_urlencoded;

pub const BASE_PATH: &str = "/dash";

#[derive(Debug, Default, PartialEq)]
struct DashQuery {
    tab: Option<String>,
    page: Option<usize>,
}

impl DashQuery {
    fn parse(query: Option<&str>) -> Self {
        let mut parsed = DashQuery::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "tab" if !value.is_empty() => parsed.tab = Some(value.into_owned()),
                // Unparsable page numbers fall back to the first page
                "page" => parsed.page = value.parse().ok(),
                _ => {}
            }
        }
        parsed
    }
}

fn unavailable(e: DashboardError) -> Response<Bytes> {
    let status = match &e {
        DashboardError::UnknownTab(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %e, "dashboard unavailable");
    utils::error(status, e.to_string())
}

async fn load(state: &RelayState, query: Option<&str>) -> Result<DashboardView, Response<Bytes>> {
    let query = DashQuery::parse(query);
    state
        .dashboard
        .view(query.tab.as_deref(), query.page)
        .await
        .map_err(unavailable)
}

pub async fn page(state: &RelayState, query: Option<&str>) -> Response<Bytes> {
    let view = match load(state, query).await {
        Ok(view) => view,
        Err(response) => return response,
    };
    match state.dashboard.render_html(BASE_PATH, &view) {
        Ok(html) => html_response(StatusCode::OK, html),
        Err(e) => unavailable(e),
    }
}

pub async fn data(state: &RelayState, query: Option<&str>) -> Response<Bytes> {
    match load(state, query).await {
        Ok(view) => utils::json(StatusCode::OK, &view),
        Err(response) => response,
    }
}
