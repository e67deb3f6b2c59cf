//! Certificate verification policy for connections to the Jira server.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the server certificate is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Verification {
  /// Verify against the platform trust store.
  #[default]
  System,
  /// Accept any certificate. Only meant for test servers with self-signed
  /// certificates.
  Disabled,
  /// Trust an additional PEM encoded CA bundle read from disk.
  CaBundle(PathBuf),
  /// Trust an additional PEM encoded certificate held in memory.
  Pem(Vec<u8>),
}

impl Verification {
  /// Whether certificate validation is switched off entirely.
  pub fn is_disabled(&self) -> bool {
    matches!(self, Self::Disabled)
  }
}

/// The `verify` key of the settings file: either a flag or a CA bundle path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VerifySetting {
  Flag(bool),
  CaBundle(PathBuf),
}

impl Default for VerifySetting {
  fn default() -> Self {
    Self::Flag(true)
  }
}

impl From<&VerifySetting> for Verification {
  fn from(setting: &VerifySetting) -> Self {
    match setting {
      VerifySetting::Flag(true) => Verification::System,
      VerifySetting::Flag(false) => Verification::Disabled,
      VerifySetting::CaBundle(path) => Verification::CaBundle(path.clone()),
    }
  }
}
