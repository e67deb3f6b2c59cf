use serde::Serialize;
use tracing::{debug, instrument};

use super::collect_pages;
use crate::client::AdaptavistClient;
use crate::consts::{DEFAULT_TEST_PLAN_QUERY, STATUS_APPROVED};
use crate::error::{AdaptavistError, Result};
use crate::fields::{merge_list, normalize_folder};
use crate::models::{CreatedKey, FolderType, TestPlan};
use crate::options::{TestPlanEdit, TestPlanOptions};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTestPlan<'a> {
  project_key: &'a str,
  name: &'a str,
  folder: Option<String>,
  status: &'a str,
  objective: &'a str,
  labels: &'a [String],
  issue_links: &'a [String],
  test_run_keys: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestPlanUpdate {
  name: String,
  objective: Option<String>,
  status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  folder: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  labels: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  test_runs: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  issue_links: Option<Vec<String>>,
}

impl AdaptavistClient {
  /// Get a test plan by key
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_plan(&self, test_plan_key: &str) -> Result<Option<TestPlan>> {
    let url = self.atm_url(&format!("testplan/{test_plan_key}"));
    self.get_json(&url, &[])
  }

  /// Get all test plans matching a search query, `folder <= "/"` by default
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_plans(&self, search: Option<&str>) -> Result<Vec<TestPlan>> {
    let url = self.atm_url("testplan/search");
    let search = search.unwrap_or(DEFAULT_TEST_PLAN_QUERY);

    collect_pages(|start_at| {
      debug!("Asking for test plans with search mask '{search}' starting at {}", start_at + 1);
      let query = [("query", search.to_string()), ("startAt", start_at.to_string())];
      Ok(self.get_json(&url, &query)?.unwrap_or_default())
    })
  }

  /// Create a test plan, returning its key
  #[instrument(skip(self), level = "debug")]
  pub fn create_test_plan(&self, project_key: &str, name: &str, options: TestPlanOptions) -> Result<String> {
    let folder = self.prepare_folder(project_key, FolderType::TestPlan, options.folder.as_deref())?;

    let url = self.atm_url("testplan");
    let body = NewTestPlan {
      project_key,
      name,
      folder,
      status: options.status.as_deref().unwrap_or(STATUS_APPROVED),
      objective: options.objective.as_deref().unwrap_or_default(),
      labels: &options.labels,
      issue_links: &options.issue_links,
      test_run_keys: &options.test_runs,
    };

    debug!("Creating test plan '{name}' in project '{project_key}'");
    let created: CreatedKey = self.post_json(&url, &body, &format!("Project {project_key}"))?;
    Ok(created.key)
  }

  /// Edit a test plan.
  ///
  /// Scalar fields keep their current value unless given. Labels, issue
  /// links and linked test runs are only sent when the edit changes them.
  #[instrument(skip(self), level = "debug")]
  pub fn edit_test_plan(&self, test_plan_key: &str, edit: TestPlanEdit) -> Result<()> {
    let entity = format!("Test plan {test_plan_key}");
    let test_plan = self
      .get_test_plan(test_plan_key)?
      .ok_or_else(|| AdaptavistError::NotFound(entity.clone()))?;

    let folder = match edit.folder.as_deref() {
      Some(folder) => {
        let normalized = normalize_folder(folder)?;
        if let Some(path) = normalized.as_deref() {
          self.create_folder(&test_plan.project_key, FolderType::TestPlan, path)?;
        }
        Some(normalized)
      }
      None => None,
    };

    let body = TestPlanUpdate {
      name: edit.name.clone().unwrap_or_else(|| test_plan.name.clone()),
      objective: edit.objective.clone().or_else(|| test_plan.objective.clone()),
      status: edit.status.clone().or_else(|| test_plan.status.clone()),
      folder,
      labels: edit
        .labels
        .as_ref()
        .and_then(|labels| merge_list(&test_plan.labels, labels)),
      test_runs: edit
        .test_runs
        .as_ref()
        .and_then(|runs| merge_list(&test_plan.test_run_keys(), runs)),
      issue_links: edit
        .issue_links
        .as_ref()
        .and_then(|links| merge_list(&test_plan.issue_links, links)),
    };

    debug!("Updating test plan {test_plan_key}");
    self.put_json(&self.atm_url(&format!("testplan/{test_plan_key}")), &body, &entity)
  }
}
