//! # Credential Management
//!
//! Discovery of the Basic authentication credentials used for the Jira
//! server. Explicit environment variables win over `.netrc` entries.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

pub mod netrc;

use self::netrc::{machine_name, netrc_path, read_netrc_credentials};

/// Environment variable holding the Jira user name
pub const ENV_JIRA_USERNAME: &str = "JIRA_USERNAME";

/// Environment variable holding the Jira password or API token
pub const ENV_JIRA_PASSWORD: &str = "JIRA_PASSWORD";

/// Represents credentials for the Jira server
#[derive(Clone)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Read credentials from `JIRA_USERNAME` / `JIRA_PASSWORD`.
///
/// Both variables must be set and non-empty.
pub fn credentials_from_env() -> Option<Credentials> {
  let username = std::env::var(ENV_JIRA_USERNAME).ok().filter(|value| !value.is_empty())?;
  let password = std::env::var(ENV_JIRA_PASSWORD).ok().filter(|value| !value.is_empty())?;
  Some(Credentials { username, password })
}

/// Resolve credentials for `server`, trying the environment first and then
/// the `.netrc` file in `home`.
pub fn resolve_credentials(home: &Path, server: &str) -> Result<Credentials> {
  if let Some(creds) = credentials_from_env() {
    debug!("Using Jira credentials from environment");
    return Ok(creds);
  }

  let host = machine_name(server);
  let path = netrc_path(home);
  if path.exists()
    && let Some(creds) = read_netrc_credentials(&path, &host)?
  {
    debug!("Using Jira credentials for '{host}' from {}", path.display());
    return Ok(creds);
  }

  Err(anyhow::anyhow!(
    "Jira credentials not found. Set {ENV_JIRA_USERNAME} and {ENV_JIRA_PASSWORD} or add an entry for machine '{host}' to {}.",
    path.display()
  ))
}
