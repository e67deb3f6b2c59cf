use tracing::instrument;

use crate::client::AdaptavistClient;
use crate::error::Result;
use crate::models::Project;

impl AdaptavistClient {
  /// Get all projects known to the test management plugin
  #[instrument(skip(self), level = "debug")]
  pub fn get_projects(&self) -> Result<Vec<Project>> {
    let url = self.tests_url("project");
    Ok(self.get_json(&url, &[])?.unwrap_or_default())
  }

  /// Find a project by key
  pub(crate) fn find_project(&self, project_key: &str) -> Result<Option<Project>> {
    Ok(
      self
        .get_projects()?
        .into_iter()
        .find(|project| project.key == project_key),
    )
  }
}
