use crate::api::{self, RelayState};
use crate::tasks::LlmTaskKind;
use http::Method;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use shared::http::{make_error_response, redirect_response};
use shared::routing::{Route, RouteTable};
use std::sync::Arc;

/// Every endpoint served on the relay listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Index,
    Endpoints,
    Login,
    Signup,
    Github,
    SlackGithubIssue,
    OpenProject,
    SlackOpenProject,
    SlackLlmCreateTask,
    SlackLlmWiki,
    SendgridEvents,
    Backups,
    OpGrid,
    Dashboard,
    Dash,
    DashData,
}

impl Endpoint {
    pub const fn name(&self) -> &'static str {
        match self {
            Endpoint::Index => "index",
            Endpoint::Endpoints => "list_routes",
            Endpoint::Login => "login",
            Endpoint::Signup => "signup",
            Endpoint::Github => "github",
            Endpoint::SlackGithubIssue => "slack_github_issue",
            Endpoint::OpenProject => "open_project",
            Endpoint::SlackOpenProject => "slack_openproject",
            Endpoint::SlackLlmCreateTask => "slack_llm_create_task",
            Endpoint::SlackLlmWiki => "slack_llm_wiki",
            Endpoint::SendgridEvents => "sendgrid_event_listener",
            Endpoint::Backups => "backups",
            Endpoint::OpGrid => "op_grid",
            Endpoint::Dashboard => "render_dashboard",
            Endpoint::Dash => "dash",
            Endpoint::DashData => "dash_data",
        }
    }
}

fn route_table() -> RouteTable<Endpoint> {
    let route = |method: Method, path: &str, endpoint: Endpoint| {
        Route::new(endpoint.name(), method, path, endpoint)
    };

    RouteTable::new(vec![
        route(Method::GET, "/", Endpoint::Index),
        route(Method::GET, "/endpoints", Endpoint::Endpoints),
        route(Method::GET, "/login", Endpoint::Login),
        route(Method::GET, "/signup", Endpoint::Signup),
        route(Method::POST, "/github", Endpoint::Github),
        route(Method::POST, "/slack/githubissue", Endpoint::SlackGithubIssue),
        route(Method::POST, "/openproject", Endpoint::OpenProject),
        route(Method::POST, "/slack/openproject", Endpoint::SlackOpenProject),
        route(Method::POST, "/slack/llm_create_task", Endpoint::SlackLlmCreateTask),
        route(Method::POST, "/slack/llm_wiki", Endpoint::SlackLlmWiki),
        route(Method::POST, "/sendgrid-events", Endpoint::SendgridEvents),
        route(Method::GET, "/backups/{folder}/{filename}", Endpoint::Backups),
        route(Method::GET, "/op_grid", Endpoint::OpGrid),
        route(Method::GET, "/dashboard", Endpoint::Dashboard),
        route(Method::GET, "/dash", Endpoint::Dash),
        route(Method::GET, "/dash/data", Endpoint::DashData),
    ])
}

/// Matches requests against the route table and runs the endpoint handler
#[derive(Clone)]
pub struct Router {
    state: Arc<RelayState>,
    routes: Arc<RouteTable<Endpoint>>,
}

impl Router {
    pub fn new(state: Arc<RelayState>) -> Self {
        Self {
            state,
            routes: Arc::new(route_table()),
        }
    }

    pub fn describe(&self) -> Vec<String> {
        self.routes.describe()
    }

    /// Returns the matched endpoint name alongside the response, for metric tags.
    pub async fn route(&self, req: Request<Bytes>) -> (&'static str, Response<Bytes>) {
        let path = req.uri().path();
        let query = req.uri().query();

        let Some(matched) = self.routes.resolve(req.method(), path) else {
            tracing::debug!(method = %req.method(), path, "no route matched");
            return ("unmatched", make_error_response(StatusCode::NOT_FOUND));
        };

        let endpoint = *matched.action;
        let state = self.state.as_ref();
        let body = req.body();

        let response = match endpoint {
            Endpoint::Index => api::pages::render(api::pages::Page::Index),
            Endpoint::Login => api::pages::render(api::pages::Page::Login),
            Endpoint::Signup => api::pages::render(api::pages::Page::Signup),
            Endpoint::OpGrid => api::pages::render(api::pages::Page::OpGrid),
            Endpoint::Endpoints => api::pages::endpoints(&self.describe()),
            Endpoint::Github => api::github::handle(state, body).await,
            Endpoint::SlackGithubIssue => api::slack::github_issue(state, body).await,
            Endpoint::OpenProject => api::openproject::handle(body),
            Endpoint::SlackOpenProject => api::slack::openproject_task(state, body).await,
            Endpoint::SlackLlmCreateTask => {
                api::slack::llm(state, body, LlmTaskKind::LlmCreateTask)
            }
            Endpoint::SlackLlmWiki => api::slack::llm(state, body, LlmTaskKind::LlmWiki),
            Endpoint::SendgridEvents => api::sendgrid::handle(state, body).await,
            Endpoint::Backups => {
                let folder = matched.params.get("folder").copied().unwrap_or_default();
                let filename = matched.params.get("filename").copied().unwrap_or_default();
                api::backups::handle(state, folder, filename).await
            }
            Endpoint::Dashboard => redirect_response(api::dashboard::BASE_PATH),
            Endpoint::Dash => api::dashboard::page(state, query).await,
            Endpoint::DashData => api::dashboard::data(state, query).await,
        };

        (endpoint.name(), response)
    }
}
