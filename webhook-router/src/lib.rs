pub mod api;
pub mod backups;
pub mod config;
pub mod creators;
pub mod errors;
pub mod github;
pub mod markers;
pub mod metrics_defs;
pub mod notifications;
pub mod router;
pub mod sendgrid;
pub mod tasks;

#[cfg(test)]
mod testutils;

use crate::api::RelayState;
use crate::backups::BackupStore;
use crate::config::Config;
use crate::creators::github::GithubIssueCreator;
use crate::creators::openproject::OpenProjectCreator;
use crate::errors::RelayError;
use crate::github::GithubDispatcher;
use crate::metrics_defs::REQUEST_DURATION;
use crate::notifications::{NotificationSink, SlackWebhookSink};
use crate::router::Router;
use crate::sendgrid::SendgridDispatcher;
use crate::tasks::{ChannelTaskQueue, TaskForwarder, TaskQueue};
use dashboard::Dashboard;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::admin_service::AdminService;
use shared::histogram;
use shared::http::{boxed, make_error_response, run_http_service};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// Starts the task forwarder, the relay listener and the admin listener.
/// Returns only when one of the listeners fails.
pub async fn run(config: Config) -> Result<(), RelayError> {
    config.validate()?;
    let timeout = config.timeouts.http_timeout();

    let sink: Arc<dyn NotificationSink> = Arc::new(SlackWebhookSink::new(
        config.notifications.slack_webhook_url.clone(),
        timeout,
    )?);
    let task_creator = OpenProjectCreator::new(&config.openproject, timeout)?;
    let task_project = task_creator.project().to_string();

    let (queue, receiver) = ChannelTaskQueue::new(config.task_queue.capacity);
    let forwarder = TaskForwarder::new(&config.task_queue, timeout, receiver)?;
    tokio::spawn(forwarder.run());

    let state = RelayState {
        github: GithubDispatcher::new(sink.clone()),
        sendgrid: SendgridDispatcher::new(sink),
        issue_creator: Arc::new(GithubIssueCreator::new(&config.github, timeout)?),
        task_creator: Arc::new(task_creator),
        task_project,
        queue: Arc::new(queue.clone()),
        backups: BackupStore::new(config.backups.base_dir.clone()),
        dashboard: Dashboard::with_placeholder_loaders(config.dashboard.clone()),
    };
    let router = Router::new(Arc::new(state));

    let relay_task = run_http_service::<_, _, RelayError>(
        &config.listener.host,
        config.listener.port,
        RelayService { router },
    );
    let admin_task = run_http_service::<_, _, RelayError>(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, Infallible>::new(move || queue.is_open()),
    );

    tokio::try_join!(relay_task, admin_task)?;
    Ok(())
}

struct RelayService {
    router: Router,
}

impl Service<Request<Incoming>> for RelayService {
    type Response = Response<BoxBody<Bytes, RelayError>>;
    type Error = RelayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = self.router.clone();

        Box::pin(async move {
            let start = Instant::now();
            let (parts, body) = req.into_parts();

            let (endpoint, response) = match body.collect().await {
                Ok(collected) => {
                    router
                        .route(Request::from_parts(parts, collected.to_bytes()))
                        .await
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read request body");
                    ("unreadable", make_error_response(StatusCode::BAD_REQUEST))
                }
            };

            histogram!(
                REQUEST_DURATION,
                "status" => response.status().as_u16().to_string(),
                "endpoint" => endpoint
            )
            .record(start.elapsed().as_secs_f64());

            Ok(response.map(boxed))
        })
    }
}
