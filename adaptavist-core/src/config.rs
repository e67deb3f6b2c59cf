//! # Configuration Management
//!
//! Locates the client's configuration directory and reads or writes the
//! `adaptavist.toml` settings file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tls::{Verification, VerifySetting};

/// Name of the settings file inside the config directory
pub const SETTINGS_FILE_NAME: &str = "adaptavist.toml";

/// Represents the configuration directory of the client
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Resolve the platform specific configuration directory
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("", "", "adaptavist").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Use an explicit directory instead of the platform default
  pub fn from_dir<P: AsRef<Path>>(config_dir: P) -> Self {
    Self {
      config_dir: config_dir.as_ref().to_path_buf(),
    }
  }

  /// Get the config directory
  pub fn config_dir(&self) -> &PathBuf {
    &self.config_dir
  }

  /// Get the path to the settings file
  pub fn settings_path(&self) -> PathBuf {
    self.config_dir.join(SETTINGS_FILE_NAME)
  }

  /// Load the settings file, falling back to defaults when it does not exist
  pub fn load_settings(&self) -> Result<Settings> {
    let settings_path = self.settings_path();

    if !settings_path.exists() {
      debug!("No settings file at {}, using defaults", settings_path.display());
      return Ok(Settings::default());
    }

    let content = fs::read_to_string(&settings_path)
      .with_context(|| format!("Failed to read settings from {}", settings_path.display()))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse settings from {}", settings_path.display()))
  }

  /// Save the settings file, creating the config directory if needed
  pub fn save_settings(&self, settings: &Settings) -> Result<()> {
    fs::create_dir_all(&self.config_dir)
      .with_context(|| format!("Failed to create config directory {}", self.config_dir.display()))?;

    let content = toml::to_string_pretty(settings).context("Failed to serialize settings to TOML")?;
    let settings_path = self.settings_path();

    fs::write(&settings_path, content)
      .with_context(|| format!("Failed to write settings to {}", settings_path.display()))
  }
}

/// Get the configuration directories
pub fn get_config_dirs() -> Result<ConfigDirs> {
  ConfigDirs::new()
}

/// Connection settings persisted in `adaptavist.toml`.
///
/// Passwords are deliberately not part of this file; they come from the
/// environment or from `.netrc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
  /// Jira server, e.g. `https://jira.example.com`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub server: Option<String>,

  /// User name for Basic authentication
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,

  /// `true`, `false` or the path of a PEM CA bundle
  #[serde(default)]
  pub verify: VerifySetting,

  /// Per-request timeout in seconds
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_secs: Option<u64>,
}

impl Settings {
  pub fn verification(&self) -> Verification {
    Verification::from(&self.verify)
  }

  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_settings_path() {
    let config_dirs = ConfigDirs::from_dir("/tmp/adaptavist-config");
    assert_eq!(
      config_dirs.settings_path(),
      PathBuf::from("/tmp/adaptavist-config/adaptavist.toml")
    );
  }

  #[test]
  fn test_missing_settings_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path().join("missing"));

    let settings = config_dirs.load_settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.verification(), Verification::System);
    assert!(settings.timeout().is_none());
  }

  #[test]
  fn test_load_settings_with_ca_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    fs::write(
      config_dirs.settings_path(),
      r#"
server = "https://jira.example.com"
username = "tester"
verify = "/etc/ssl/certs/corp.pem"
timeout_secs = 20
"#,
    )
    .unwrap();

    let settings = config_dirs.load_settings().unwrap();
    assert_eq!(settings.server.as_deref(), Some("https://jira.example.com"));
    assert_eq!(settings.username.as_deref(), Some("tester"));
    assert_eq!(
      settings.verification(),
      Verification::CaBundle(PathBuf::from("/etc/ssl/certs/corp.pem"))
    );
    assert_eq!(settings.timeout(), Some(Duration::from_secs(20)));
  }

  #[test]
  fn test_load_settings_with_verification_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    fs::write(config_dirs.settings_path(), "verify = false\n").unwrap();

    let settings = config_dirs.load_settings().unwrap();
    assert_eq!(settings.verification(), Verification::Disabled);
  }

  #[test]
  fn test_invalid_settings_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    fs::write(config_dirs.settings_path(), "server = [").unwrap();

    let error = config_dirs.load_settings().unwrap_err().to_string();
    assert!(error.contains("Failed to parse settings"));
    assert!(error.contains("adaptavist.toml"));
  }

  #[test]
  fn test_save_and_reload_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path().join("nested"));
    let settings = Settings {
      server: Some("jira.example.com".to_string()),
      username: None,
      verify: VerifySetting::Flag(false),
      timeout_secs: Some(5),
    };

    config_dirs.save_settings(&settings).unwrap();
    assert_eq!(config_dirs.load_settings().unwrap(), settings);
  }
}
