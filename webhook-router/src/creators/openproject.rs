use super::{CreateError, ResourceCreator, ResourceRef, endpoint};
use crate::config::{OpenProjectConfig, TASK_TYPE};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

const API_USER: &str = "apikey";

#[derive(Deserialize)]
struct Project {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct WorkPackage {
    id: u64,
}

/// Creates work packages through the OpenProject API v3.
///
/// Every task is filed under the configured default project with the `task`
/// type and a fixed description.
pub struct OpenProjectCreator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    projects: HashMap<String, u64>,
    task_types: HashMap<String, u64>,
    project: String,
    description: String,
}

impl OpenProjectCreator {
    pub fn new(config: &OpenProjectConfig, timeout: Duration) -> Result<Self, CreateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.url.as_str().to_string(),
            api_key: config.api_key.clone(),
            projects: config.projects.clone(),
            task_types: config.task_types.clone(),
            project: config.default_project.clone(),
            description: config.task_description.clone(),
        })
    }

    /// Name of the project new tasks are filed under.
    pub fn project(&self) -> &str {
        &self.project
    }

    pub async fn create_task(
        &self,
        title: &str,
        project_name: &str,
    ) -> Result<ResourceRef, CreateError> {
        let project_id = *self
            .projects
            .get(project_name)
            .ok_or_else(|| CreateError::UnknownProject(project_name.to_string()))?;

        let project = self
            .fetch_project(project_id)
            .await
            .map_err(|e| CreateError::FetchProject(e.to_string()))?;

        let package = self
            .post_work_package(title, &project)
            .await
            .map_err(|e| CreateError::CreateTask(e.to_string()))?;

        tracing::info!(
            work_package = package.id,
            project = %project.name,
            "openproject task created"
        );
        Ok(ResourceRef::WorkPackage(package.id))
    }

    async fn fetch_project(&self, id: u64) -> Result<Project, CreateError> {
        let url = endpoint(&self.base_url, &format!("api/v3/projects/{id}"))?;
        let response = self
            .client
            .get(url)
            .basic_auth(API_USER, Some(&self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CreateError::Rejected(response.status()));
        }
        response
            .json()
            .await
            .map_err(|e| CreateError::InvalidResponse(e.to_string()))
    }

    async fn post_work_package(
        &self,
        title: &str,
        project: &Project,
    ) -> Result<WorkPackage, CreateError> {
        let type_id = self
            .task_types
            .get(TASK_TYPE)
            .ok_or_else(|| CreateError::UnknownType(TASK_TYPE.to_string()))?;

        let payload = json!({
            "subject": title,
            "description": {"format": "markdown", "raw": self.description},
            "_links": {
                "project": {
                    "href": format!("/api/v3/projects/{}", project.id),
                    "title": project.name,
                },
                "type": {
                    "href": format!("/api/v3/types/{type_id}"),
                    "title": TASK_TYPE,
                },
            },
        });

        let url = endpoint(&self.base_url, "api/v3/work_packages")?;
        let response = self
            .client
            .post(url)
            .basic_auth(API_USER, Some(&self.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %text, "error creating work package");
            return Err(CreateError::Rejected(status));
        }
        response
            .json()
            .await
            .map_err(|e| CreateError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ResourceCreator for OpenProjectCreator {
    fn target(&self) -> &'static str {
        "openproject"
    }

    // OpenProject tasks carry the configured description; `body` is not sent.
    async fn create(&self, title: &str, _body: &str) -> Result<ResourceRef, CreateError> {
        self.create_task(title, &self.project).await
    }
}
