//! # Test Run Endpoints
//!
//! Test runs (test cycles) are read through the Adaptavist API, except the
//! lookup by name which uses the much faster Jira internal search.

use serde::Serialize;
use tracing::{debug, instrument};

use super::collect_pages;
use crate::client::AdaptavistClient;
use crate::consts::{DEFAULT_TEST_RUN_QUERY, REPORT_PAGE_SIZE, STATUS_NOT_EXECUTED, TEST_RUN_PAGE_SIZE};
use crate::error::Result;
use crate::models::{CreatedKey, FolderType, ResultsPage, TestRun, TestRunRef};
use crate::options::{CloneOptions, ListEdit, TestPlanEdit, TestRunOptions};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTestRun<'a> {
  project_key: &'a str,
  test_plan_key: Option<&'a str>,
  name: &'a str,
  folder: Option<String>,
  issue_key: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  version: Option<&'a str>,
  items: Vec<NewTestRunItem<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTestRunItem<'a> {
  test_case_key: &'a str,
  status: &'a str,
  environment: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  assigned_to: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  executed_by: Option<Option<String>>,
}

/// Escape a value for use inside a double-quoted search term
fn quote_escaped(value: &str) -> String {
  value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl AdaptavistClient {
  /// Get a test run by key
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_run(&self, test_run_key: &str) -> Result<Option<TestRun>> {
    let url = self.atm_url(&format!("testrun/{test_run_key}"));
    self.get_json(&url, &[])
  }

  /// Get the last test run with the given name
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_run_by_name(&self, test_run_name: &str) -> Result<Option<TestRunRef>> {
    let url = self.tests_url("testrun/search");
    let search = format!("testRun.name = \"{}\"", quote_escaped(test_run_name));

    let test_runs = collect_pages(|start_at| {
      debug!("Asking for {REPORT_PAGE_SIZE} test runs starting at {}", start_at + 1);
      let query = [
        ("startAt", start_at.to_string()),
        ("maxResults", REPORT_PAGE_SIZE.to_string()),
        ("query", search.clone()),
        ("fields", "id,key,name".to_string()),
      ];
      let page: Option<ResultsPage<TestRunRef>> = self.get_json(&url, &query)?;
      Ok(page.map(|page| page.results).unwrap_or_default())
    })?;

    Ok(test_runs.into_iter().last())
  }

  /// Get all test runs matching a search query, `folder = "/"` by default.
  ///
  /// `fields` restricts the returned fields (e.g. `key,name`); without it
  /// every item of every run is loaded, which can be slow.
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_runs(&self, search: Option<&str>, fields: Option<&str>) -> Result<Vec<TestRun>> {
    let url = self.atm_url("testrun/search");
    let search = search.unwrap_or(DEFAULT_TEST_RUN_QUERY);

    collect_pages(|start_at| {
      debug!("Asking for {TEST_RUN_PAGE_SIZE} test runs starting at {} using search mask {search}", start_at + 1);
      let mut query = vec![
        ("query", search.to_string()),
        ("startAt", start_at.to_string()),
        ("maxResults", TEST_RUN_PAGE_SIZE.to_string()),
      ];
      if let Some(fields) = fields {
        query.push(("fields", fields.to_string()));
      }
      Ok(self.get_json(&url, &query)?.unwrap_or_default())
    })
  }

  /// Get the test runs linked to an issue
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_run_links(&self, issue_key: &str) -> Result<Vec<TestRun>> {
    let test_runs = self.get_test_runs(None, None)?;
    debug!("Looking for test runs linked to {issue_key}");

    Ok(
      test_runs
        .into_iter()
        .filter(|test_run| test_run.issue_key.as_deref() == Some(issue_key))
        .collect(),
    )
  }

  /// Create a test run with one item per test case, returning its key
  #[instrument(skip(self), level = "debug")]
  pub fn create_test_run(&self, project_key: &str, name: &str, options: TestRunOptions) -> Result<String> {
    let folder = self.prepare_folder(project_key, FolderType::TestRun, options.folder.as_deref())?;

    let status = options.status.as_deref().unwrap_or(STATUS_NOT_EXECUTED);
    let assigned_to = options.assignee.as_ref().map(|assignee| assignee.resolve());
    let executed_by = options.executor.as_ref().map(|executor| executor.resolve());

    let items = options
      .test_cases
      .iter()
      .map(|test_case_key| NewTestRunItem {
        test_case_key,
        status,
        environment: options.environment.as_deref(),
        assigned_to: assigned_to.clone(),
        executed_by: executed_by.clone(),
      })
      .collect();

    let url = self.atm_url("testrun");
    let body = NewTestRun {
      project_key,
      test_plan_key: options.test_plan_key.as_deref(),
      name,
      folder,
      issue_key: options.issue_key.as_deref(),
      version: options.version.as_deref(),
      items,
    };

    debug!("Creating new test run in project {project_key} with name '{name}'");
    let created: CreatedKey = self.post_json(&url, &body, &format!("Project {project_key}"))?;
    Ok(created.key)
  }

  /// Clone a test run, returning the key of the clone or `None` when the
  /// source does not exist
  #[instrument(skip(self), level = "debug")]
  pub fn clone_test_run(&self, test_run_key: &str, options: CloneOptions) -> Result<Option<String>> {
    let Some(test_run) = self.get_test_run(test_run_key)? else {
      return Ok(None);
    };

    let project_key = options.project_key.clone().unwrap_or_else(|| test_run.project_key.clone());
    let name = options
      .name
      .clone()
      .unwrap_or_else(|| format!("{} (cloned from {})", test_run.name, test_run.key));
    let environment = options
      .environment
      .clone()
      .or_else(|| test_run.items.first().and_then(|item| item.environment.clone()));

    let run_options = TestRunOptions {
      folder: options.folder.clone().or_else(|| test_run.folder.clone()),
      issue_key: test_run.issue_key.clone(),
      test_plan_key: options.test_plan_key.clone(),
      test_cases: test_run.test_case_keys(),
      environment,
      version: test_run.version.clone(),
      ..Default::default()
    };
    let key = self.create_test_run(&project_key, &name, run_options)?;

    if options.test_plan_key.is_none() {
      for test_plan in self.get_test_plans(None)? {
        if test_plan.test_runs.iter().any(|run| run.key == test_run.key) {
          debug!("Adding {key} to test plan {}", test_plan.key);
          let edit = TestPlanEdit {
            test_runs: Some(ListEdit::Append(vec![key.clone()])),
            ..Default::default()
          };
          self.edit_test_plan(&test_plan.key, edit)?;
        }
      }
    }

    Ok(Some(key))
  }
}
