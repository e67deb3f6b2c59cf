use serde::Serialize;
use tracing::{debug, instrument};

use crate::client::AdaptavistClient;
use crate::error::Result;
use crate::models::{CreatedId, Environment};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewEnvironment<'a> {
  project_key: &'a str,
  name: &'a str,
  description: &'a str,
}

impl AdaptavistClient {
  /// Get the environments of a project
  #[instrument(skip(self), level = "debug")]
  pub fn get_environments(&self, project_key: &str) -> Result<Vec<Environment>> {
    let url = self.atm_url("environments");
    let query = [("projectKey", project_key.to_string())];
    Ok(self.get_json(&url, &query)?.unwrap_or_default())
  }

  /// Create an environment, returning its id
  #[instrument(skip(self), level = "debug")]
  pub fn create_environment(&self, project_key: &str, name: &str, description: Option<&str>) -> Result<u64> {
    let url = self.atm_url("environments");
    let body = NewEnvironment {
      project_key,
      name,
      description: description.unwrap_or_default(),
    };

    debug!("Creating environment '{name}' in project '{project_key}'");
    let created: CreatedId = self.post_json(&url, &body, &format!("Project {project_key}"))?;
    Ok(created.id)
  }
}
