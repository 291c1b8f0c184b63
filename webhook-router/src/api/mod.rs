pub mod backups;
pub mod dashboard;
pub mod github;
pub mod openproject;
pub mod pages;
pub mod sendgrid;
pub mod slack;
pub mod utils;

use crate::backups::BackupStore;
use crate::creators::ResourceCreator;
use crate::github::GithubDispatcher;
use crate::sendgrid::SendgridDispatcher;
use crate::tasks::TaskQueue;
use ::dashboard::Dashboard;
use std::sync::Arc;

/// Everything the endpoint handlers share. Built once at startup, read-only afterwards.
pub struct RelayState {
    pub github: GithubDispatcher,
    pub sendgrid: SendgridDispatcher,
    pub issue_creator: Arc<dyn ResourceCreator>,
    pub task_creator: Arc<dyn ResourceCreator>,
    /// OpenProject project that Slack tasks are filed under
    pub task_project: String,
    pub queue: Arc<dyn TaskQueue>,
    pub backups: BackupStore,
    pub dashboard: Dashboard,
}
