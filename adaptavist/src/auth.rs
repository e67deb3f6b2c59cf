//! Client construction from the user's configuration.
//!
//! The server comes from `$JIRA_HOST` or the settings file, credentials from
//! `$JIRA_USERNAME`/`$JIRA_PASSWORD` or `.netrc`.

use std::path::Path;

use adaptavist_core::creds::{ENV_JIRA_PASSWORD, credentials_from_env, resolve_credentials};
use adaptavist_core::{ConfigDirs, Credentials, Settings, resolve_server_url};
use anyhow::Context;
use tracing::debug;

use crate::client::{AdaptavistClient, ClientOptions};
use crate::error::Result;
use crate::models::AdaptavistAuth;

/// Resolve credentials for `server`.
///
/// A `username` in the settings file combined with `$JIRA_PASSWORD` is used
/// when the environment does not carry a complete pair.
pub fn get_credentials(home: &Path, server: &str, settings: &Settings) -> Result<Credentials> {
  if credentials_from_env().is_none()
    && let Some(username) = settings.username.as_ref()
    && let Some(password) = std::env::var(ENV_JIRA_PASSWORD).ok().filter(|value| !value.is_empty())
  {
    debug!("Using user '{username}' from the settings file");
    return Ok(Credentials {
      username: username.clone(),
      password,
    });
  }

  Ok(resolve_credentials(home, server).context("Failed to get credentials")?)
}

/// Create an authenticated client from the settings file and credentials
pub fn create_client_from_config(home: &Path, config_dirs: &ConfigDirs) -> Result<AdaptavistClient> {
  let settings = config_dirs.load_settings()?;
  let server = resolve_server_url(&settings)?;
  let credentials = get_credentials(home, &server, &settings)?;

  let auth = AdaptavistAuth {
    username: credentials.username,
    password: credentials.password,
  };
  let options = ClientOptions {
    verification: settings.verification(),
    timeout: settings.timeout(),
  };

  AdaptavistClient::with_options(&server, auth, options)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use adaptavist_core::creds::ENV_JIRA_USERNAME;
  use adaptavist_core::url::ENV_JIRA_HOST;
  use adaptavist_test_utils::{EnvVarGuard, NetrcGuard};
  use tempfile::TempDir;

  use super::*;

  fn guard() -> EnvVarGuard {
    EnvVarGuard::new(&[ENV_JIRA_HOST, ENV_JIRA_USERNAME, ENV_JIRA_PASSWORD])
  }

  fn config_dirs(settings: &str) -> (TempDir, ConfigDirs) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("adaptavist.toml"), settings).unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    (temp_dir, config_dirs)
  }

  #[test]
  fn test_client_from_settings_and_netrc() {
    let guard = guard();
    guard.remove(ENV_JIRA_HOST);
    guard.remove(ENV_JIRA_USERNAME);
    guard.remove(ENV_JIRA_PASSWORD);

    let netrc = NetrcGuard::with_machine("jira.example.com", "netrc-user", "netrc-pass");
    let (_temp_dir, config_dirs) = config_dirs("server = \"jira.example.com\"\nverify = false\ntimeout_secs = 10\n");

    let client = create_client_from_config(netrc.home_dir(), &config_dirs).unwrap();
    assert_eq!(client.base_url(), "https://jira.example.com");
    assert_eq!(client.username(), "netrc-user");
  }

  #[test]
  fn test_environment_overrides_settings() {
    let guard = guard();
    guard.set(ENV_JIRA_HOST, "http://localhost:8080");
    guard.set(ENV_JIRA_USERNAME, "env-user");
    guard.set(ENV_JIRA_PASSWORD, "env-pass");

    let netrc = NetrcGuard::new("");
    let (_temp_dir, config_dirs) = config_dirs("server = \"jira.example.com\"\n");

    let client = create_client_from_config(netrc.home_dir(), &config_dirs).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(client.username(), "env-user");
  }

  #[test]
  fn test_settings_username_with_password_from_environment() {
    let guard = guard();
    guard.remove(ENV_JIRA_USERNAME);
    guard.set(ENV_JIRA_PASSWORD, "env-pass");

    let netrc = NetrcGuard::new("");
    let settings = Settings {
      username: Some("settings-user".to_string()),
      ..Default::default()
    };

    let credentials = get_credentials(netrc.home_dir(), "https://jira.example.com", &settings).unwrap();
    assert_eq!(credentials.username, "settings-user");
    assert_eq!(credentials.password, "env-pass");
  }

  #[test]
  fn test_missing_credentials_is_a_config_error() {
    let guard = guard();
    guard.remove(ENV_JIRA_USERNAME);
    guard.remove(ENV_JIRA_PASSWORD);

    let netrc = NetrcGuard::new("");
    let error = get_credentials(netrc.home_dir(), "https://jira.example.com", &Settings::default()).unwrap_err();

    assert!(matches!(error, crate::AdaptavistError::Config(_)));
    assert!(format!("{error:#}").contains("Failed to get credentials"));
  }
}
