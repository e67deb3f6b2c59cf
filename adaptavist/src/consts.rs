//! Constants for the Adaptavist client.

/// User-Agent header value for the API client
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Adaptavist Test Management REST API
pub const ATM_API: &str = "rest/atm/1.0";

/// Jira core REST API
pub const JIRA_API: &str = "rest/api/2";

/// Jira internal API of the test management plugin
pub const TESTS_API: &str = "rest/tests/1.0";

// Test case and test plan states
pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_DRAFT: &str = "Draft";

// Execution states of test results and script results
pub const STATUS_NOT_EXECUTED: &str = "Not Executed";
pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_PASS: &str = "Pass";
pub const STATUS_FAIL: &str = "Fail";
pub const STATUS_BLOCKED: &str = "Blocked";

pub const PRIORITY_NORMAL: &str = "Normal";

pub const STEP_TYPE_BY_STEP: &str = "STEP_BY_STEP";
pub const STEP_TYPE_PLAIN: &str = "PLAIN_TEXT";

/// The root folder. Sent to the server as `null`.
pub const ROOT_FOLDER: &str = "/";

/// Custom field holding CI build URLs of a test case
pub const CUSTOM_FIELD_BUILD_URLS: &str = "ci_server_url";

/// Custom field holding code base URLs of a test case
pub const CUSTOM_FIELD_CODE_BASES: &str = "code_base_url";

/// Separator of entries in multi-line (HTML) custom fields
pub const MULTILINE_SEPARATOR: &str = "<br>";

// Search queries used when the caller gives none. The search endpoints do not
// accept an empty query.
pub const DEFAULT_TEST_CASE_QUERY: &str = r#"folder <= "/""#;
pub const DEFAULT_TEST_PLAN_QUERY: &str = r#"folder <= "/""#;
pub const DEFAULT_TEST_RUN_QUERY: &str = r#"folder = "/""#;

// Page sizes
pub const USER_PAGE_SIZE: usize = 200;
pub const FOLDER_PAGE_SIZE: usize = 200;
pub const TEST_RUN_PAGE_SIZE: usize = 1000;
pub const REPORT_PAGE_SIZE: usize = 10000;

/// Header disabling Jira's XSRF check on multipart uploads
pub const ATLASSIAN_TOKEN_HEADER: &str = "X-Atlassian-Token";
pub const ATLASSIAN_TOKEN_NOCHECK: &str = "nocheck";
