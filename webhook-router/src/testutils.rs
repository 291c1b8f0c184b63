use crate::api::RelayState;
use crate::backups::BackupStore;
use crate::creators::{CreateError, ResourceCreator, ResourceRef};
use crate::github::GithubDispatcher;
use crate::notifications::{Notification, NotificationSink, NotifyError};
use crate::router::Router;
use crate::sendgrid::SendgridDispatcher;
use crate::tasks::{ChannelTaskQueue, LlmJob};
use async_trait::async_trait;
use dashboard::{Dashboard, DashboardConfig};
use http::StatusCode;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Notification sink that records every message and answers with a fixed status.
/// `None` simulates an unreachable receiver.
pub struct RecordingSink {
    status: Option<StatusCode>,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status: Some(status),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn unreachable() -> Self {
        Self {
            status: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, notification: &Notification) -> Result<StatusCode, NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        match self.status {
            Some(status) => Ok(status),
            None => {
                let err = reqwest::Client::new()
                    .get("not a url")
                    .build()
                    .unwrap_err();
                Err(NotifyError::Request(err))
            }
        }
    }
}

/// Resource creator that records `(title, body)` pairs.
pub struct FakeCreator {
    target: &'static str,
    fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeCreator {
    pub fn succeeding(target: &'static str) -> Self {
        Self {
            target,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(target: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::succeeding(target)
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceCreator for FakeCreator {
    fn target(&self) -> &'static str {
        self.target
    }

    async fn create(&self, title: &str, body: &str) -> Result<ResourceRef, CreateError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((title.to_string(), body.to_string()));
        if self.fail {
            return Err(CreateError::Rejected(StatusCode::BAD_GATEWAY));
        }
        Ok(ResourceRef::GithubIssue(calls.len() as u64))
    }
}

/// Relay state wired to in-memory fakes, with a temporary backup directory.
pub struct TestRelay {
    pub sink: Arc<RecordingSink>,
    pub issues: Arc<FakeCreator>,
    pub tasks: Arc<FakeCreator>,
    pub jobs: mpsc::Receiver<LlmJob>,
    backups_dir: tempfile::TempDir,
    state: Arc<RelayState>,
}

impl TestRelay {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_sink(sink: RecordingSink) -> Self {
        Self::builder().sink(sink).build()
    }

    pub fn builder() -> TestRelayBuilder {
        TestRelayBuilder {
            sink: RecordingSink::healthy(),
            issues: FakeCreator::succeeding("github"),
            tasks: FakeCreator::succeeding("openproject"),
            queue_capacity: 16,
        }
    }

    pub fn router(&self) -> Router {
        Router::new(self.state.clone())
    }

    pub fn write_backup(&self, folder: &str, filename: &str, contents: &str) {
        let dir = self.backups_dir.path().join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(filename), contents).unwrap();
    }
}

pub struct TestRelayBuilder {
    sink: RecordingSink,
    issues: FakeCreator,
    tasks: FakeCreator,
    queue_capacity: usize,
}

impl TestRelayBuilder {
    pub fn sink(mut self, sink: RecordingSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn issues(mut self, creator: FakeCreator) -> Self {
        self.issues = creator;
        self
    }

    pub fn tasks(mut self, creator: FakeCreator) -> Self {
        self.tasks = creator;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn build(self) -> TestRelay {
        let sink = Arc::new(self.sink);
        let issues = Arc::new(self.issues);
        let tasks = Arc::new(self.tasks);
        let (queue, jobs) = ChannelTaskQueue::new(self.queue_capacity);
        let backups_dir = tempfile::tempdir().unwrap();

        let state = RelayState {
            github: GithubDispatcher::new(sink.clone()),
            sendgrid: SendgridDispatcher::new(sink.clone()),
            issue_creator: issues.clone(),
            task_creator: tasks.clone(),
            task_project: "Scrum project".to_string(),
            queue: Arc::new(queue),
            backups: BackupStore::new(backups_dir.path()),
            dashboard: Dashboard::with_placeholder_loaders(DashboardConfig::default()),
        };

        TestRelay {
            sink,
            issues,
            tasks,
            jobs,
            backups_dir,
            state: Arc::new(state),
        }
    }
}

/// Log output captured from a thread-local fmt subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a subscriber for the current thread. Logs are captured until
    /// the returned guard is dropped; use with a current-thread runtime.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
