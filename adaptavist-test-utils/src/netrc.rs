//! Temporary home directories holding a `.netrc`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway home directory with a `.netrc`, deleted on drop.
///
/// The process `HOME` is never changed. Hand [`NetrcGuard::home_dir`] to the
/// code under test instead, which keeps parallel tests independent.
pub struct NetrcGuard {
  home: TempDir,
  path: PathBuf,
}

impl NetrcGuard {
  /// Write `content` verbatim as `.netrc`
  pub fn new(content: &str) -> Self {
    let home = TempDir::new().expect("Failed to create temporary home");
    let path = home.path().join(".netrc");
    fs::write(&path, content).expect("Failed to write .netrc");

    Self { home, path }
  }

  /// A `.netrc` with a single `machine` entry
  pub fn with_machine(machine: &str, login: &str, password: &str) -> Self {
    Self::new(&format!("machine {machine}\n  login {login}\n  password {password}\n"))
  }

  pub fn netrc_path(&self) -> &Path {
    &self.path
  }

  pub fn home_dir(&self) -> &Path {
    self.home.path()
  }
}
