use dashboard::DashboardConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("HTTP timeout cannot be 0")]
    InvalidTimeout,

    #[error("Task queue capacity cannot be 0")]
    InvalidQueueCapacity,

    #[error("No OpenProject projects configured")]
    NoProjects,

    #[error("Default project is not in the project map: {0}")]
    UnknownDefaultProject(String),

    #[error("Task type '{0}' is not in the task type map")]
    MissingTaskType(&'static str),

    #[error("Invalid value for environment variable {name}: {message}")]
    InvalidEnv { name: &'static str, message: String },
}

/// Webhook relay configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for webhooks, slash commands and pages
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    pub admin_listener: Listener,
    #[serde(default)]
    pub timeouts: Timeouts,
    pub github: GithubConfig,
    pub openproject: OpenProjectConfig,
    pub notifications: NotificationsConfig,
    pub task_queue: TaskQueueConfig,
    #[serde(default)]
    pub backups: BackupsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.timeouts.http_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.task_queue.capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }

        self.openproject.validate()
    }

    /// Overrides secrets and deployment settings from the environment.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.listener.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ValidationError::InvalidEnv {
                    name: "PORT",
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(owner) = lookup("GITHUB_REPO_OWNER") {
            self.github.owner = owner;
        }
        if let Some(repo) = lookup("GITHUB_REPO_NAME") {
            self.github.repo = repo;
        }
        if let Some(token) = lookup("GITHUB_TOKEN") {
            self.github.token = token;
        }
        if let Some(url) = lookup("OPENPROJECT_URL") {
            self.openproject.url = parse_env_url("OPENPROJECT_URL", &url)?;
        }
        if let Some(api_key) = lookup("OPENPROJECT_API_KEY") {
            self.openproject.api_key = api_key;
        }
        if let Some(api_key) = lookup("LLM_API_KEY") {
            self.task_queue.api_key = api_key;
        }
        if let Some(url) = lookup("SLACK_WEBHOOK_URL") {
            self.notifications.slack_webhook_url = parse_env_url("SLACK_WEBHOOK_URL", &url)?;
        }
        Ok(())
    }
}

fn parse_env_url(name: &'static str, value: &str) -> Result<Url, ValidationError> {
    Url::parse(value).map_err(|e| ValidationError::InvalidEnv {
        name,
        message: e.to_string(),
    })
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Bounds applied to every outbound HTTP call
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Timeouts {
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Timeouts {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GithubConfig {
    /// REST API root, `https://api.github.com` when unset
    #[serde(default)]
    pub api_url: Option<Url>,
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub token: String,
}

impl GithubConfig {
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_ref()
            .map_or(DEFAULT_GITHUB_API_URL, Url::as_str)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OpenProjectConfig {
    pub url: Url,
    #[serde(default)]
    pub api_key: String,
    /// Project name to project ID
    #[serde(default = "default_projects")]
    pub projects: HashMap<String, u64>,
    /// Project that Slack-created tasks are filed under
    #[serde(default = "default_project")]
    pub default_project: String,
    /// Work package type name to type ID
    #[serde(default = "default_task_types")]
    pub task_types: HashMap<String, u64>,
    #[serde(default = "default_task_description")]
    pub task_description: String,
}

pub const TASK_TYPE: &str = "task";

fn default_projects() -> HashMap<String, u64> {
    HashMap::from([("Scrum project".to_string(), 2)])
}

fn default_project() -> String {
    "Scrum project".to_string()
}

fn default_task_types() -> HashMap<String, u64> {
    HashMap::from([(TASK_TYPE.to_string(), 1), ("milestone".to_string(), 2)])
}

fn default_task_description() -> String {
    "This is a test task.".to_string()
}

impl OpenProjectConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.projects.is_empty() {
            return Err(ValidationError::NoProjects);
        }
        if !self.projects.contains_key(&self.default_project) {
            return Err(ValidationError::UnknownDefaultProject(
                self.default_project.clone(),
            ));
        }
        if !self.task_types.contains_key(TASK_TYPE) {
            return Err(ValidationError::MissingTaskType(TASK_TYPE));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NotificationsConfig {
    /// Slack incoming webhook that receives issue and email notifications
    pub slack_webhook_url: Url,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TaskQueueConfig {
    /// Endpoint of the LLM worker that consumes queued jobs
    pub url: Url,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

fn default_queue_capacity() -> usize {
    64
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BackupsConfig {
    pub base_dir: PathBuf,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        BackupsConfig {
            base_dir: PathBuf::from("output"),
        }
    }
}
