//! Environment variable management for testing
//!
//! Tests inside one binary run on parallel threads while the process
//! environment is global. [`EnvVarGuard`] serialises every test that touches
//! the environment and restores the previous values when dropped.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard over a set of environment variables.
///
/// Only one guard can be alive at a time; create a single guard listing every
/// variable a test needs.
pub struct EnvVarGuard {
  saved: Vec<(String, Option<OsString>)>,
  _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
  /// Take the environment lock and remember the current values of `names`
  pub fn new(names: &[&str]) -> Self {
    let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let saved = names
      .iter()
      .map(|name| (name.to_string(), env::var_os(name)))
      .collect();

    Self { saved, _lock: lock }
  }

  /// Set a variable managed by this guard
  pub fn set(&self, name: &str, value: &str) {
    debug_assert!(self.manages(name), "{name} is not managed by this guard");
    unsafe {
      env::set_var(name, value);
    }
  }

  /// Remove a variable managed by this guard
  pub fn remove(&self, name: &str) {
    debug_assert!(self.manages(name), "{name} is not managed by this guard");
    unsafe {
      env::remove_var(name);
    }
  }

  fn manages(&self, name: &str) -> bool {
    self.saved.iter().any(|(saved, _)| saved == name)
  }
}

impl Drop for EnvVarGuard {
  fn drop(&mut self) {
    for (name, value) in &self.saved {
      match value {
        Some(value) => unsafe {
          env::set_var(name, value);
        },
        None => unsafe {
          env::remove_var(name);
        },
      }
    }
  }
}
