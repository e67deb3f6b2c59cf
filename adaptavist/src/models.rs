use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AdaptavistError, Result};

/// Deserialize `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Basic authentication credentials for the Jira server
#[derive(Clone, PartialEq, Eq)]
pub struct AdaptavistAuth {
  pub username: String,
  pub password: String,
}

impl std::fmt::Debug for AdaptavistAuth {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AdaptavistAuth")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Represents a Jira user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub key: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub display_name: Option<String>,
}

/// Represents a Jira project known to the test management plugin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
  pub id: u64,
  pub key: String,
  pub name: String,
}

/// Represents a test environment of a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Environment {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
}

/// The kind of entity a folder holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderType {
  TestCase,
  TestPlan,
  TestRun,
}

impl FolderType {
  pub fn as_str(&self) -> &'static str {
    match self {
      FolderType::TestCase => "TEST_CASE",
      FolderType::TestPlan => "TEST_PLAN",
      FolderType::TestRun => "TEST_RUN",
    }
  }

  /// Path segment of the folder tree endpoint
  pub(crate) fn tree_segment(&self) -> &'static str {
    match self {
      FolderType::TestCase => "testcase",
      FolderType::TestPlan => "testplan",
      FolderType::TestRun => "testrun",
    }
  }
}

impl std::fmt::Display for FolderType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Node of a project's folder tree
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderNode {
  #[serde(default)]
  pub id: Option<u64>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub children: Vec<FolderNode>,
}

/// Represents a test case
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
  pub key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub project_key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub priority: Option<String>,
  #[serde(default)]
  pub objective: Option<String>,
  #[serde(default)]
  pub precondition: Option<String>,
  /// Estimated execution time in milliseconds
  #[serde(default)]
  pub estimated_time: Option<u64>,
  #[serde(default)]
  pub folder: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub labels: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub issue_links: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub custom_fields: BTreeMap<String, Value>,
  #[serde(default)]
  pub test_script: Option<TestScript>,
}

impl TestCase {
  /// String value of a custom field, empty if unset
  pub fn custom_field_text(&self, name: &str) -> &str {
    self
      .custom_fields
      .get(name)
      .and_then(Value::as_str)
      .unwrap_or_default()
  }
}

/// Test script of a test case
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScript {
  #[serde(rename = "type")]
  pub script_type: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub steps: Vec<TestStep>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
}

/// A single step of a step-by-step test script
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub index: Option<u32>,
  #[serde(default)]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub test_data: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expected_result: Option<String>,
}

impl TestStep {
  pub fn new(description: impl Into<String>, expected_result: impl Into<String>) -> Self {
    Self {
      description: description.into(),
      expected_result: Some(expected_result.into()),
      ..Default::default()
    }
  }
}

/// Test case reference as returned for issue links
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TestCaseRef {
  pub key: String,
}

/// Represents a test plan
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlan {
  pub key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub project_key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub objective: Option<String>,
  #[serde(default)]
  pub folder: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub labels: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub issue_links: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub test_runs: Vec<TestRunRef>,
}

impl TestPlan {
  pub fn test_run_keys(&self) -> Vec<String> {
    self.test_runs.iter().map(|run| run.key.clone()).collect()
  }
}

/// Key and name of a test run
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TestRunRef {
  pub key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
}

/// Represents a test run (test cycle)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
  pub key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub project_key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub folder: Option<String>,
  #[serde(default)]
  pub issue_key: Option<String>,
  #[serde(default)]
  pub test_plan_key: Option<String>,
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub items: Vec<TestRunItem>,
}

impl TestRun {
  pub fn test_case_keys(&self) -> Vec<String> {
    self.items.iter().map(|item| item.test_case_key.clone()).collect()
  }

  pub fn contains_test_case(&self, test_case_key: &str) -> bool {
    self.items.iter().any(|item| item.test_case_key == test_case_key)
  }
}

/// A test case entry of a test run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunItem {
  pub test_case_key: String,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub environment: Option<String>,
  #[serde(default)]
  pub assigned_to: Option<String>,
  #[serde(default)]
  pub executed_by: Option<String>,
}

/// Represents the result of one test case within one test run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
  pub id: u64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub test_case_key: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub status: String,
  #[serde(default)]
  pub environment: Option<String>,
  #[serde(default)]
  pub comment: Option<String>,
  #[serde(default)]
  pub assigned_to: Option<String>,
  #[serde(default)]
  pub executed_by: Option<String>,
  /// Execution time in milliseconds
  #[serde(default)]
  pub execution_time: Option<u64>,
  #[serde(default)]
  pub execution_date: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub issue_links: Vec<String>,
  /// Step results, sorted by index
  #[serde(default, deserialize_with = "null_as_default")]
  pub script_results: Vec<ScriptResult>,
}

impl TestResult {
  pub fn step(&self, step: usize) -> Option<&ScriptResult> {
    let index = u32::try_from(step.checked_sub(1)?).ok()?;
    self.script_results.iter().find(|result| result.index == index)
  }
}

/// Result of a single test script step. `index` is zero-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptResult {
  pub index: u32,
  #[serde(default, deserialize_with = "null_as_default")]
  pub status: String,
  #[serde(default)]
  pub comment: Option<String>,
}

/// A flattened row of the Jira test result report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestExecution {
  pub key: String,
  pub test_case: Option<ReportReference>,
  pub test_run: Option<ReportReference>,
  pub estimated_time: Option<u64>,
  pub executed_by: Option<String>,
  pub execution_date: Option<String>,
  pub execution_time: Option<u64>,
  pub environment: Option<String>,
  pub assigned_to: Option<String>,
  pub automated: bool,
  pub status: String,
  pub issue_links: Vec<ReportReference>,
}

/// Entity referenced by a report row
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ReportReference {
  #[serde(default)]
  pub id: Option<u64>,
  #[serde(default)]
  pub key: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NamedValue {
  #[serde(default)]
  pub(crate) key: Option<String>,
  #[serde(default)]
  pub(crate) name: Option<String>,
}

/// Raw row of `/reports/testresults`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestResultReportRow {
  key: String,
  #[serde(default)]
  test_case: Option<ReportReference>,
  #[serde(default)]
  test_run: Option<ReportReference>,
  #[serde(default)]
  estimated_time: Option<u64>,
  #[serde(default)]
  user: Option<NamedValue>,
  #[serde(default)]
  execution_date: Option<String>,
  #[serde(default)]
  execution_time: Option<u64>,
  #[serde(default)]
  environment: Option<NamedValue>,
  #[serde(default)]
  assigned_to: Option<String>,
  #[serde(default)]
  automated: bool,
  #[serde(default)]
  status: Option<NamedValue>,
  #[serde(default, deserialize_with = "null_as_default")]
  issues: Vec<ReportReference>,
  #[serde(default)]
  last_test_result: Option<bool>,
}

impl TestResultReportRow {
  /// Rows without the flag count as the last result
  pub(crate) fn is_last_result(&self) -> bool {
    self.last_test_result.unwrap_or(true)
  }
}

impl From<TestResultReportRow> for TestExecution {
  fn from(row: TestResultReportRow) -> Self {
    Self {
      key: row.key,
      test_case: row.test_case,
      test_run: row.test_run,
      estimated_time: row.estimated_time,
      executed_by: row.user.and_then(|user| user.key),
      execution_date: row.execution_date,
      execution_time: row.execution_time,
      environment: row.environment.and_then(|environment| environment.name),
      assigned_to: row.assigned_to,
      automated: row.automated,
      status: row.status.and_then(|status| status.name).unwrap_or_default(),
      issue_links: row.issues,
    }
  }
}

/// Envelope of paged results of the Jira internal API
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsPage<T> {
  #[serde(default = "Vec::new")]
  pub(crate) results: Vec<T>,
}

/// Response of a create call returning the new key
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedKey {
  pub(crate) key: String,
}

/// Response of a create call returning the new id
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedId {
  pub(crate) id: u64,
}

/// Reference to a stored attachment
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
  #[serde(default)]
  pub id: Option<u64>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub filename: String,
  #[serde(default)]
  pub url: Option<String>,
  #[serde(default)]
  pub file_size: Option<u64>,
}

/// File content to upload
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
  pub(crate) filename: String,
  pub(crate) content: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Attachment")
      .field("filename", &self.filename)
      .field("size", &self.content.len())
      .finish()
  }
}

impl Attachment {
  /// Read a file, uploading it under its own file name
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let filename = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| AdaptavistError::validation(format!("'{}' has no file name", path.display())))?;

    Self::from_path_as(path, filename)
  }

  /// Read a file, uploading it under `filename`
  pub fn from_path_as(path: impl AsRef<Path>, filename: impl Into<String>) -> Result<Self> {
    let content = std::fs::read(path.as_ref())?;
    Self::from_bytes(filename, content)
  }

  /// Wrap in-memory content
  pub fn from_bytes(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<Self> {
    let filename = filename.into();
    if filename.trim().is_empty() {
      return Err(AdaptavistError::validation("No filename given for the attachment"));
    }

    Ok(Self {
      filename,
      content: content.into(),
    })
  }

  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn len(&self) -> usize {
    self.content.len()
  }

  pub fn is_empty(&self) -> bool {
    self.content.is_empty()
  }
}
