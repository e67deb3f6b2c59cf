//! Optional inputs of the create and edit operations.
//!
//! Every struct implements `Default`, so callers only spell out what they
//! need:
//!
//! ```
//! use adaptavist::options::{ListEdit, TestCaseEdit};
//!
//! let edit = TestCaseEdit {
//!   objective: Some("Login with valid credentials".to_string()),
//!   labels: Some(ListEdit::Append(vec!["smoke".to_string()])),
//!   ..Default::default()
//! };
//! assert!(edit.name.is_none());
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use adaptavist_core::current_executor;
use serde_json::Value;

use crate::models::TestStep;

/// Who a test is assigned to or executed by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Assignee {
  /// The user running this process, `jenkins` inside a Jenkins build
  #[default]
  Current,
  /// Nobody; sent as `null`
  Unassigned,
  /// A specific Jira user key
  User(String),
}

impl Assignee {
  /// The user key to send, `None` for unassigned
  pub fn resolve(&self) -> Option<String> {
    match self {
      Assignee::Current => current_executor(),
      Assignee::Unassigned => None,
      Assignee::User(user) => Some(user.clone()),
    }
  }
}

impl From<&str> for Assignee {
  fn from(user: &str) -> Self {
    if user.is_empty() {
      Assignee::Unassigned
    } else {
      Assignee::User(user.to_string())
    }
  }
}

/// Change to a list-typed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit {
  /// Add entries that are not present yet, keeping the current order
  Append(Vec<String>),
  /// Replace the whole list
  Replace(Vec<String>),
}

/// Optional fields of a new test case
#[derive(Debug, Clone, Default)]
pub struct TestCaseOptions {
  /// Folder path; `None` or `/` is the root folder
  pub folder: Option<String>,
  pub objective: Option<String>,
  pub precondition: Option<String>,
  /// Defaults to `Normal`
  pub priority: Option<String>,
  pub estimated_time: Option<Duration>,
  /// Defaults to `Approved`
  pub status: Option<String>,
  pub labels: Vec<String>,
  pub issue_links: Vec<String>,
  pub steps: Vec<TestStep>,
}

/// Changes to an existing test case. Unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct TestCaseEdit {
  /// Move into this folder; `/` moves to the root folder
  pub folder: Option<String>,
  pub name: Option<String>,
  pub objective: Option<String>,
  pub precondition: Option<String>,
  pub priority: Option<String>,
  pub estimated_time: Option<Duration>,
  pub status: Option<String>,
  pub labels: Option<ListEdit>,
  pub issue_links: Option<ListEdit>,
  /// Entries of the `ci_server_url` custom field
  pub build_urls: Option<ListEdit>,
  /// Entries of the `code_base_url` custom field
  pub code_bases: Option<ListEdit>,
  /// Other custom fields by name
  pub custom_fields: BTreeMap<String, Value>,
}

/// Optional fields of a new test plan
#[derive(Debug, Clone, Default)]
pub struct TestPlanOptions {
  pub folder: Option<String>,
  pub objective: Option<String>,
  /// Defaults to `Approved`
  pub status: Option<String>,
  pub labels: Vec<String>,
  pub issue_links: Vec<String>,
  /// Keys of test runs to link
  pub test_runs: Vec<String>,
}

/// Changes to an existing test plan. Unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct TestPlanEdit {
  pub folder: Option<String>,
  pub name: Option<String>,
  pub objective: Option<String>,
  pub status: Option<String>,
  pub labels: Option<ListEdit>,
  pub issue_links: Option<ListEdit>,
  pub test_runs: Option<ListEdit>,
}

/// Optional fields of a new test run
#[derive(Debug, Clone, Default)]
pub struct TestRunOptions {
  pub folder: Option<String>,
  /// Issue to link the run to
  pub issue_key: Option<String>,
  /// Test plan to link the run to
  pub test_plan_key: Option<String>,
  /// Test case keys; each one becomes an item of the run
  pub test_cases: Vec<String>,
  pub environment: Option<String>,
  /// Application version under test
  pub version: Option<String>,
  /// Assignee of every item; not sent when `None`
  pub assignee: Option<Assignee>,
  /// Executor of every item; not sent when `None`
  pub executor: Option<Assignee>,
  /// Initial status of every item, `Not Executed` by default
  pub status: Option<String>,
}

/// Options for cloning a test run
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
  /// Name of the clone, `<name> (cloned from <key>)` by default
  pub name: Option<String>,
  /// Folder of the clone, the source folder by default
  pub folder: Option<String>,
  /// Project of the clone, the source project by default
  pub project_key: Option<String>,
  /// Test plan to link the clone to. When unset the clone is linked to every
  /// plan that contains the source run.
  pub test_plan_key: Option<String>,
  /// Environment of the items, the one of the first source item by default
  pub environment: Option<String>,
}

/// Optional fields of a new test result
#[derive(Debug, Clone, Default)]
pub struct TestResultOptions {
  pub comment: Option<String>,
  pub execution_time: Option<Duration>,
  pub environment: Option<String>,
  pub assignee: Assignee,
  pub executor: Assignee,
  pub issue_links: Vec<String>,
}

/// Changes to the latest test result. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct TestResultEdit {
  pub comment: Option<String>,
  pub execution_time: Option<Duration>,
  pub environment: Option<String>,
  pub assignee: Option<Assignee>,
  pub executor: Option<Assignee>,
  pub issue_links: Option<Vec<String>>,
}

/// Changes accompanying a script step status update. Unset fields are not
/// sent; an unset comment keeps the step's current comment.
#[derive(Debug, Clone, Default)]
pub struct ScriptStatusEdit {
  pub comment: Option<String>,
  pub environment: Option<String>,
  pub assignee: Option<Assignee>,
  pub executor: Option<Assignee>,
}

/// One entry of a bulk result upload
#[derive(Debug, Clone, Default)]
pub struct NewTestResult {
  pub test_case_key: String,
  pub status: String,
  pub comment: Option<String>,
  pub execution_time: Option<Duration>,
  pub issue_links: Vec<String>,
}

impl NewTestResult {
  pub fn new(test_case_key: impl Into<String>, status: impl Into<String>) -> Self {
    Self {
      test_case_key: test_case_key.into(),
      status: status.into(),
      ..Default::default()
    }
  }
}

/// Fields applied to every entry of a bulk result upload
#[derive(Debug, Clone, Default)]
pub struct BulkResultOptions {
  pub environment: Option<String>,
  pub assignee: Assignee,
  pub executor: Assignee,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_assignee_from_str() {
    assert_eq!(Assignee::from(""), Assignee::Unassigned);
    assert_eq!(Assignee::from("bob"), Assignee::User("bob".to_string()));
    assert_eq!(Assignee::Unassigned.resolve(), None);
    assert_eq!(Assignee::User("bob".to_string()).resolve().as_deref(), Some("bob"));
  }
}
