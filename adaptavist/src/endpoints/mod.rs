//! # Adaptavist API Endpoints
//!
//! Endpoint implementations grouped by resource: users, projects,
//! environments, folders, test cases, test plans, test runs, test results and
//! attachments.

use std::time::Duration;

use crate::error::Result;

pub mod attachments;
pub mod environments;
pub mod folders;
pub mod projects;
pub mod test_cases;
pub mod test_plans;
pub mod test_results;
pub mod test_runs;
pub mod users;

/// Request pages until an empty one comes back.
///
/// `fetch_page` receives the offset (`startAt`) of the page to load.
pub(crate) fn collect_pages<T, F>(mut fetch_page: F) -> Result<Vec<T>>
where
  F: FnMut(usize) -> Result<Vec<T>>,
{
  let mut items = Vec::new();
  loop {
    let page = fetch_page(items.len())?;
    if page.is_empty() {
      break;
    }
    items.extend(page);
  }
  Ok(items)
}

/// Durations are sent in milliseconds
pub(crate) fn millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
