//! Background delegation of LLM jobs.
//!
//! Slash-command handlers submit jobs to a bounded in-process queue and answer
//! immediately. A [`TaskForwarder`] drains the queue and hands every job to the
//! external LLM worker, which replies to Slack through the job's `response_url`.

use crate::config::TaskQueueConfig;
use crate::metrics_defs::TASK_SUBMITTED;
use http::StatusCode;
use serde::Serialize;
use shared::counter;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use url::Url;
use uuid::Uuid;

pub type JobId = Uuid;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("task queue is full")]
    Full,
    #[error("task queue is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("worker request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("worker rejected job with status {0}")]
    Rejected(StatusCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmTaskKind {
    LlmCreateTask,
    LlmWiki,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LlmJob {
    pub id: JobId,
    #[serde(rename = "task")]
    pub kind: LlmTaskKind,
    pub prompt: String,
    pub response_url: String,
    pub user_id: String,
}

impl LlmJob {
    pub fn new(kind: LlmTaskKind, prompt: String, response_url: String, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            prompt,
            response_url,
            user_id,
        }
    }
}

pub trait TaskQueue: Send + Sync {
    /// Enqueues without waiting. A full or closed queue refuses the job.
    fn submit(&self, job: LlmJob) -> Result<JobId, QueueError>;

    /// False once the consumer side has gone away.
    fn is_open(&self) -> bool;
}

#[derive(Clone)]
pub struct ChannelTaskQueue {
    sender: mpsc::Sender<LlmJob>,
}

impl ChannelTaskQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<LlmJob>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl TaskQueue for ChannelTaskQueue {
    fn submit(&self, job: LlmJob) -> Result<JobId, QueueError> {
        let id = job.id;
        let result = self.sender.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        });

        let outcome = match &result {
            Ok(()) => "queued",
            Err(QueueError::Full) => "full",
            Err(QueueError::Closed) => "closed",
        };
        counter!(TASK_SUBMITTED, "outcome" => outcome).increment(1);

        result.map(|()| id)
    }

    fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Delivers queued jobs to the LLM worker endpoint, one at a time.
pub struct TaskForwarder {
    client: reqwest::Client,
    url: Url,
    api_key: String,
    receiver: mpsc::Receiver<LlmJob>,
}

impl TaskForwarder {
    pub fn new(
        config: &TaskQueueConfig,
        timeout: Duration,
        receiver: mpsc::Receiver<LlmJob>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            receiver,
        })
    }

    /// Runs until every queue handle is dropped. Failed jobs are logged and dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.receiver.recv().await {
            match self.forward(&job).await {
                Ok(()) => tracing::info!(job_id = %job.id, kind = ?job.kind, "job handed to worker"),
                Err(e) => tracing::error!(job_id = %job.id, error = %e, "dropping job"),
            }
        }
        tracing::info!("task forwarder stopped");
    }

    pub async fn forward(&self, job: &LlmJob) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(job)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ForwardError::Rejected(response.status()));
        }
        Ok(())
    }
}
