//! # Test Case Endpoints
//!
//! Reading, creating, editing and deleting test cases, and maintaining their
//! links to Jira issues.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{collect_pages, millis};
use crate::client::AdaptavistClient;
use crate::consts::{
  CUSTOM_FIELD_BUILD_URLS, CUSTOM_FIELD_CODE_BASES, DEFAULT_TEST_CASE_QUERY, PRIORITY_NORMAL, STATUS_APPROVED,
  STEP_TYPE_BY_STEP,
};
use crate::error::{AdaptavistError, Result};
use crate::fields::{merge_list, merge_multiline, normalize_folder};
use crate::models::{CreatedKey, FolderType, TestCase, TestCaseRef, TestScript};
use crate::options::{TestCaseEdit, TestCaseOptions};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTestCase<'a> {
  project_key: &'a str,
  name: &'a str,
  folder: Option<String>,
  status: &'a str,
  objective: &'a str,
  precondition: &'a str,
  priority: &'a str,
  estimated_time: Option<u64>,
  labels: &'a [String],
  issue_links: &'a [String],
  test_script: TestScript,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestCaseUpdate {
  name: String,
  objective: Option<String>,
  precondition: Option<String>,
  priority: Option<String>,
  estimated_time: Option<u64>,
  status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  folder: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  labels: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  issue_links: Option<Vec<String>>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  custom_fields: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueLinksUpdate<'a> {
  issue_links: &'a [String],
}

/// Custom field values of `edit` that differ from `test_case`
fn changed_custom_fields(test_case: &TestCase, edit: &TestCaseEdit) -> BTreeMap<String, Value> {
  let mut changed: BTreeMap<String, Value> = edit
    .custom_fields
    .iter()
    .filter(|(name, value)| test_case.custom_fields.get(name.as_str()) != Some(*value))
    .map(|(name, value)| (name.clone(), value.clone()))
    .collect();

  let multiline = [
    (CUSTOM_FIELD_BUILD_URLS, &edit.build_urls),
    (CUSTOM_FIELD_CODE_BASES, &edit.code_bases),
  ];
  for (name, list_edit) in multiline {
    if let Some(list_edit) = list_edit
      && let Some(content) = merge_multiline(test_case.custom_field_text(name), list_edit)
    {
      changed.insert(name.to_string(), Value::String(content));
    }
  }

  changed
}

impl AdaptavistClient {
  /// Get a test case by key
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_case(&self, test_case_key: &str) -> Result<Option<TestCase>> {
    let url = self.atm_url(&format!("testcase/{test_case_key}"));
    self.get_json(&url, &[])
  }

  /// Get all test cases matching a search query, `folder <= "/"` by default
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_cases(&self, search: Option<&str>) -> Result<Vec<TestCase>> {
    let url = self.atm_url("testcase/search");
    let search = search.unwrap_or(DEFAULT_TEST_CASE_QUERY);

    collect_pages(|start_at| {
      debug!("Asking for test cases with search mask '{search}' starting at {}", start_at + 1);
      let query = [("query", search.to_string()), ("startAt", start_at.to_string())];
      Ok(self.get_json(&url, &query)?.unwrap_or_default())
    })
  }

  /// Create a test case, returning its key
  #[instrument(skip(self), level = "debug")]
  pub fn create_test_case(&self, project_key: &str, name: &str, options: TestCaseOptions) -> Result<String> {
    let folder = self.prepare_folder(project_key, FolderType::TestCase, options.folder.as_deref())?;

    let url = self.atm_url("testcase");
    let body = NewTestCase {
      project_key,
      name,
      folder,
      status: options.status.as_deref().unwrap_or(STATUS_APPROVED),
      objective: options.objective.as_deref().unwrap_or_default(),
      precondition: options.precondition.as_deref().unwrap_or_default(),
      priority: options.priority.as_deref().unwrap_or(PRIORITY_NORMAL),
      estimated_time: options.estimated_time.map(millis).filter(|time| *time > 0),
      labels: &options.labels,
      issue_links: &options.issue_links,
      test_script: TestScript {
        script_type: STEP_TYPE_BY_STEP.to_string(),
        steps: options.steps.clone(),
        text: None,
      },
    };

    debug!("Creating test case '{name}' in project '{project_key}'");
    let created: CreatedKey = self.post_json(&url, &body, &format!("Project {project_key}"))?;
    Ok(created.key)
  }

  /// Edit a test case.
  ///
  /// Scalar fields keep their current value unless given. List fields and
  /// custom fields are only sent when the edit changes them.
  #[instrument(skip(self), level = "debug")]
  pub fn edit_test_case(&self, test_case_key: &str, edit: TestCaseEdit) -> Result<()> {
    let entity = format!("Test case {test_case_key}");
    let test_case = self
      .get_test_case(test_case_key)?
      .ok_or_else(|| AdaptavistError::NotFound(entity.clone()))?;

    let folder = match edit.folder.as_deref() {
      Some(folder) => {
        let normalized = normalize_folder(folder)?;
        if let Some(path) = normalized.as_deref() {
          self.create_folder(&test_case.project_key, FolderType::TestCase, path)?;
        }
        Some(normalized)
      }
      None => None,
    };

    let body = TestCaseUpdate {
      name: edit.name.clone().unwrap_or_else(|| test_case.name.clone()),
      objective: edit.objective.clone().or_else(|| test_case.objective.clone()),
      precondition: edit.precondition.clone().or_else(|| test_case.precondition.clone()),
      priority: edit.priority.clone().or_else(|| test_case.priority.clone()),
      estimated_time: edit.estimated_time.map(millis).or(test_case.estimated_time),
      status: edit.status.clone().or_else(|| test_case.status.clone()),
      folder,
      labels: edit
        .labels
        .as_ref()
        .and_then(|labels| merge_list(&test_case.labels, labels)),
      issue_links: edit
        .issue_links
        .as_ref()
        .and_then(|links| merge_list(&test_case.issue_links, links)),
      custom_fields: changed_custom_fields(&test_case, &edit),
    };

    debug!("Updating data of test case '{test_case_key}'");
    self.put_json(&self.atm_url(&format!("testcase/{test_case_key}")), &body, &entity)
  }

  /// Delete a test case
  #[instrument(skip(self), level = "debug")]
  pub fn delete_test_case(&self, test_case_key: &str) -> Result<()> {
    let url = self.atm_url(&format!("testcase/{test_case_key}"));
    self.delete(&url, &format!("Test case {test_case_key}"))
  }

  /// Get the test cases linked to an issue
  #[instrument(skip(self), level = "debug")]
  pub fn get_test_case_links(&self, issue_key: &str) -> Result<Vec<TestCaseRef>> {
    let url = self.atm_url(&format!("issuelink/{issue_key}/testcases"));
    Ok(self.get_json(&url, &[])?.unwrap_or_default())
  }

  /// Link test cases to an issue. Missing test cases are skipped.
  #[instrument(skip(self), level = "debug")]
  pub fn link_test_cases(&self, issue_key: &str, test_case_keys: &[String]) -> Result<()> {
    self.update_issue_links(issue_key, test_case_keys, |links| {
      if links.iter().any(|link| link == issue_key) {
        false
      } else {
        links.push(issue_key.to_string());
        true
      }
    })
  }

  /// Unlink test cases from an issue. Missing test cases are skipped.
  #[instrument(skip(self), level = "debug")]
  pub fn unlink_test_cases(&self, issue_key: &str, test_case_keys: &[String]) -> Result<()> {
    self.update_issue_links(issue_key, test_case_keys, |links| {
      let before = links.len();
      links.retain(|link| link != issue_key);
      links.len() != before
    })
  }

  /// Apply `change` to the issue links of each test case, writing only those
  /// where it reports a change
  fn update_issue_links<F>(&self, issue_key: &str, test_case_keys: &[String], change: F) -> Result<()>
  where
    F: Fn(&mut Vec<String>) -> bool,
  {
    for test_case_key in test_case_keys {
      let Some(test_case) = self.get_test_case(test_case_key)? else {
        warn!("Test case {test_case_key} was not found");
        continue;
      };

      let mut links = test_case.issue_links;
      if !change(&mut links) {
        debug!("Links of test case {test_case_key} to {issue_key} are up to date");
        continue;
      }

      debug!("Updating links of test case {test_case_key}");
      self.put_json(
        &self.atm_url(&format!("testcase/{test_case_key}")),
        &IssueLinksUpdate { issue_links: &links },
        &format!("Test case {test_case_key}"),
      )?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use adaptavist_test_utils::MockJira;
  use serde_json::json;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, ResponseTemplate};

  use super::*;
  use crate::models::TestStep;
  use crate::options::ListEdit;
  use crate::testing::{client, mount_get, mount_write};

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
  }

  fn test_case_json() -> Value {
    json!({
        "key": "JQA-T1",
        "projectKey": "JQA",
        "name": "Login works",
        "status": "Draft",
        "priority": "High",
        "objective": "Check the login",
        "estimatedTime": 60000,
        "folder": "/Smoke",
        "labels": ["smoke"],
        "issueLinks": ["JQA-1"],
        "customFields": {
            "ci_server_url": "https://ci/1",
            "component": "auth"
        }
    })
  }

  #[test]
  fn test_get_test_case() {
    let server = MockJira::start();
    mount_get(&server, "/rest/atm/1.0/testcase/JQA-T1", test_case_json());

    let client = client(&server);
    let test_case = client.get_test_case("JQA-T1").unwrap().unwrap();
    assert_eq!(test_case.name, "Login works");
    assert_eq!(test_case.labels, vec!["smoke"]);

    assert!(client.get_test_case("JQA-T404").unwrap().is_none());
  }

  #[test]
  fn test_get_test_cases_uses_default_query() {
    let server = MockJira::start();
    server.mount(
      Mock::given(method("GET"))
        .and(path("/rest/atm/1.0/testcase/search"))
        .and(query_param("query", r#"folder <= "/""#))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"key": "JQA-T1"}, {"key": "JQA-T2"}]))),
    );
    server.mount(
      Mock::given(method("GET"))
        .and(path("/rest/atm/1.0/testcase/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([]))),
    );

    let test_cases = client(&server).get_test_cases(None).unwrap();
    let keys: Vec<_> = test_cases.iter().map(|test_case| test_case.key.as_str()).collect();
    assert_eq!(keys, vec!["JQA-T1", "JQA-T2"]);
  }

  #[test]
  fn test_create_test_case_in_root_folder() {
    let server = MockJira::start();
    mount_write(&server, "POST", "/rest/atm/1.0/testcase", json!({"key": "JQA-T9"}));

    let key = client(&server)
      .create_test_case("JQA", "New case", TestCaseOptions::default())
      .unwrap();
    assert_eq!(key, "JQA-T9");

    let bodies = server.json_bodies("POST", "/rest/atm/1.0/testcase");
    assert_eq!(
      bodies,
      vec![json!({
          "projectKey": "JQA",
          "name": "New case",
          "folder": null,
          "status": "Approved",
          "objective": "",
          "precondition": "",
          "priority": "Normal",
          "estimatedTime": null,
          "labels": [],
          "issueLinks": [],
          "testScript": {"type": "STEP_BY_STEP", "steps": []}
      })]
    );
    // no folder handling for the root folder
    assert!(server.requests_to("GET", "/rest/tests/1.0/project").is_empty());
  }

  #[test]
  fn test_create_test_case_creates_folder() {
    let server = MockJira::start();
    mount_get(
      &server,
      "/rest/tests/1.0/project",
      json!([{"id": 10100, "key": "JQA", "name": "Jira QA"}]),
    );
    mount_get(
      &server,
      "/rest/tests/1.0/project/10100/foldertree/testcase",
      json!({"name": "", "children": []}),
    );
    mount_write(&server, "POST", "/rest/atm/1.0/folder", json!({"id": 5}));
    mount_write(&server, "POST", "/rest/atm/1.0/testcase", json!({"key": "JQA-T10"}));

    let options = TestCaseOptions {
      folder: Some("Smoke".to_string()),
      estimated_time: Some(Duration::from_secs(90)),
      labels: strings(&["smoke"]),
      steps: vec![TestStep::new("Open the page", "Login form is shown")],
      ..Default::default()
    };
    client(&server).create_test_case("JQA", "Stepped", options).unwrap();

    let folders = server.json_bodies("POST", "/rest/atm/1.0/folder");
    assert_eq!(folders[0]["name"], "/Smoke");
    assert_eq!(folders[0]["type"], "TEST_CASE");

    let body = &server.json_bodies("POST", "/rest/atm/1.0/testcase")[0];
    assert_eq!(body["folder"], "/Smoke");
    assert_eq!(body["estimatedTime"], 90000);
    assert_eq!(body["labels"], json!(["smoke"]));
    assert_eq!(
      body["testScript"]["steps"],
      json!([{"description": "Open the page", "expectedResult": "Login form is shown"}])
    );
  }

  #[test]
  fn test_create_test_case_rejects_empty_folder() {
    let server = MockJira::start();

    let options = TestCaseOptions {
      folder: Some(String::new()),
      ..Default::default()
    };
    let error = client(&server).create_test_case("JQA", "Nowhere", options).unwrap_err();
    assert!(matches!(error, AdaptavistError::Validation(_)));
    assert!(server.received_requests().is_empty());
  }

  #[test]
  fn test_edit_test_case_sends_only_changes() {
    let server = MockJira::start();
    mount_get(&server, "/rest/atm/1.0/testcase/JQA-T1", test_case_json());
    mount_write(&server, "PUT", "/rest/atm/1.0/testcase/JQA-T1", json!({}));

    let mut custom_fields = BTreeMap::new();
    custom_fields.insert("component".to_string(), json!("auth"));
    custom_fields.insert("team".to_string(), json!("qa"));

    let edit = TestCaseEdit {
      objective: Some("Check the login again".to_string()),
      labels: Some(ListEdit::Append(strings(&["smoke"]))),
      issue_links: Some(ListEdit::Append(strings(&["JQA-2"]))),
      build_urls: Some(ListEdit::Append(strings(&["https://ci/2"]))),
      code_bases: Some(ListEdit::Append(Vec::new())),
      custom_fields,
      ..Default::default()
    };
    client(&server).edit_test_case("JQA-T1", edit).unwrap();

    let bodies = server.json_bodies("PUT", "/rest/atm/1.0/testcase/JQA-T1");
    assert_eq!(
      bodies,
      vec![json!({
          "name": "Login works",
          "objective": "Check the login again",
          "precondition": null,
          "priority": "High",
          "estimatedTime": 60000,
          "status": "Draft",
          "issueLinks": ["JQA-1", "JQA-2"],
          "customFields": {
              "ci_server_url": "https://ci/1<br>https://ci/2",
              "team": "qa"
          }
      })]
    );
  }

  #[test]
  fn test_edit_test_case_moves_to_root_folder() {
    let server = MockJira::start();
    mount_get(&server, "/rest/atm/1.0/testcase/JQA-T1", test_case_json());
    mount_write(&server, "PUT", "/rest/atm/1.0/testcase/JQA-T1", json!({}));

    let client = client(&server);
    let edit = TestCaseEdit {
      folder: Some("/".to_string()),
      labels: Some(ListEdit::Replace(Vec::new())),
      ..Default::default()
    };
    client.edit_test_case("JQA-T1", edit).unwrap();

    let body = &server.json_bodies("PUT", "/rest/atm/1.0/testcase/JQA-T1")[0];
    assert_eq!(body["folder"], Value::Null);
    assert_eq!(body["labels"], json!([]));
    assert!(body.get("customFields").is_none());

    let edit = TestCaseEdit {
      folder: Some(String::new()),
      ..Default::default()
    };
    let error = client.edit_test_case("JQA-T1", edit).unwrap_err();
    assert!(matches!(error, AdaptavistError::Validation(_)));
    assert_eq!(server.requests_to("PUT", "/rest/atm/1.0/testcase/JQA-T1").len(), 1);
  }

  #[test]
  fn test_edit_missing_test_case() {
    let server = MockJira::start();

    let error = client(&server)
      .edit_test_case("JQA-T404", TestCaseEdit::default())
      .unwrap_err();
    assert!(matches!(error, AdaptavistError::NotFound(_)));
    assert!(server.requests_to("PUT", "/rest/atm/1.0/testcase/JQA-T404").is_empty());
  }

  #[test]
  fn test_delete_test_case() {
    let server = MockJira::start();
    server.mount(
      Mock::given(method("DELETE"))
        .and(path("/rest/atm/1.0/testcase/JQA-T1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1),
    );

    let client = client(&server);
    client.delete_test_case("JQA-T1").unwrap();
    server.verify();

    let error = client.delete_test_case("JQA-T404").unwrap_err();
    assert!(matches!(error, AdaptavistError::NotFound(_)));
  }

  #[test]
  fn test_get_test_case_links() {
    let server = MockJira::start();
    mount_get(
      &server,
      "/rest/atm/1.0/issuelink/JQA-1/testcases",
      json!([{"key": "JQA-T1"}, {"key": "JQA-T2"}]),
    );

    let links = client(&server).get_test_case_links("JQA-1").unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[1].key, "JQA-T2");
  }

  #[test]
  fn test_link_test_cases_writes_only_when_needed() {
    let server = MockJira::start();
    mount_get(&server, "/rest/atm/1.0/testcase/JQA-T1", test_case_json());
    mount_get(
      &server,
      "/rest/atm/1.0/testcase/JQA-T2",
      json!({"key": "JQA-T2", "issueLinks": ["JQA-7"]}),
    );
    server.mount(
      Mock::given(method("PUT"))
        .and(path("/rest/atm/1.0/testcase/JQA-T1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0),
    );
    mount_write(&server, "PUT", "/rest/atm/1.0/testcase/JQA-T2", json!({}));

    client(&server)
      .link_test_cases("JQA-1", &strings(&["JQA-T1", "JQA-T404", "JQA-T2"]))
      .unwrap();
    server.verify();

    let bodies = server.json_bodies("PUT", "/rest/atm/1.0/testcase/JQA-T2");
    assert_eq!(bodies, vec![json!({"issueLinks": ["JQA-7", "JQA-1"]})]);
  }

  #[test]
  fn test_unlink_test_cases() {
    let server = MockJira::start();
    mount_get(&server, "/rest/atm/1.0/testcase/JQA-T1", test_case_json());
    mount_get(&server, "/rest/atm/1.0/testcase/JQA-T2", json!({"key": "JQA-T2"}));
    mount_write(&server, "PUT", "/rest/atm/1.0/testcase/JQA-T1", json!({}));

    client(&server)
      .unlink_test_cases("JQA-1", &strings(&["JQA-T1", "JQA-T2"]))
      .unwrap();

    assert_eq!(
      server.json_bodies("PUT", "/rest/atm/1.0/testcase/JQA-T1"),
      vec![json!({"issueLinks": []})]
    );
    assert!(server.requests_to("PUT", "/rest/atm/1.0/testcase/JQA-T2").is_empty());
  }
}
