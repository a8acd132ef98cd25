use super::client::{map_api_request_error, ApiClient};
use crate::types::{Project, ProjectSummary};
use anyhow::Result;

impl ApiClient {
    /// Fetch the caller's project listing for the dashboard.
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let request_url = self.endpoint_url("projects");
        let response = self
            .request(reqwest::Method::GET, &request_url)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, &request_url))?;

        let projects: Vec<ProjectSummary> = response
            .json()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?;
        Ok(projects)
    }

    /// Fetch one project with its page inventory.
    pub async fn fetch_project(&self, project_id: &str) -> Result<Project> {
        let request_url = self.endpoint_url(&format!("projects/{project_id}"));
        let response = self
            .request(reqwest::Method::GET, &request_url)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, &request_url))?;

        let project: Project = response
            .json()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?;
        Ok(project)
    }

    /// Answer an `approval_required` event. The backend resumes or abandons
    /// the paused action and reports the outcome on the open event stream.
    pub async fn submit_approval(&self, approval_id: &str, approved: bool) -> Result<()> {
        let decision = if approved { "approve" } else { "deny" };
        let request_url = self.endpoint_url(&format!("approvals/{approval_id}/{decision}"));
        self.request(reqwest::Method::POST, &request_url)
            .send()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?
            .error_for_status()
            .map_err(|error| map_api_request_error(error, &request_url))?;
        Ok(())
    }
}
