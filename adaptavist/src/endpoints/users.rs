//! # Jira User Endpoints

use tracing::{debug, instrument};

use super::collect_pages;
use crate::client::AdaptavistClient;
use crate::consts::USER_PAGE_SIZE;
use crate::error::Result;
use crate::models::User;

impl AdaptavistClient {
  /// Get the keys of all users known to Jira
  #[instrument(skip(self), level = "debug")]
  pub fn get_users(&self) -> Result<Vec<String>> {
    let url = self.jira_url("user/search");

    let users: Vec<User> = collect_pages(|start_at| {
      debug!("Asking for {USER_PAGE_SIZE} users starting at {}", start_at + 1);
      let query = [
        ("username", ".".to_string()),
        ("startAt", start_at.to_string()),
        ("maxResults", USER_PAGE_SIZE.to_string()),
      ];
      Ok(self.get_json(&url, &query)?.unwrap_or_default())
    })?;

    Ok(users.into_iter().map(|user| user.key).collect())
  }
}
