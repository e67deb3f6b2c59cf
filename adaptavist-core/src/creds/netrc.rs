//! Reading Jira credentials from `.netrc`.
//!
//! The file is treated as a flat token stream, so `machine`, `login` and
//! `password` may share a line or be spread over several. A `default` entry
//! applies to every host without its own `machine` entry.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::creds::Credentials;

/// Location of `.netrc` inside `home`.
///
/// ```
/// use std::path::Path;
/// use adaptavist_core::creds::netrc::netrc_path;
///
/// assert_eq!(netrc_path(Path::new("/home/tester")), Path::new("/home/tester/.netrc"));
/// ```
pub fn netrc_path(home: &Path) -> PathBuf {
  home.join(".netrc")
}

#[derive(Debug, Default)]
struct Entry {
  /// `None` for the `default` entry
  machine: Option<String>,
  login: Option<String>,
  password: Option<String>,
}

impl Entry {
  fn into_credentials(self) -> Option<Credentials> {
    Some(Credentials {
      username: self.login?,
      password: self.password?,
    })
  }
}

fn parse_entries(content: &str) -> Vec<Entry> {
  let mut entries: Vec<Entry> = Vec::new();
  let mut tokens = content.split_whitespace();

  while let Some(token) = tokens.next() {
    match token {
      "machine" => entries.push(Entry {
        machine: tokens.next().map(str::to_string),
        ..Entry::default()
      }),
      "default" => entries.push(Entry::default()),
      "login" | "password" => {
        let value = tokens.next().map(str::to_string);
        if let Some(entry) = entries.last_mut() {
          if token == "login" {
            entry.login = value;
          } else {
            entry.password = value;
          }
        }
      }
      _ => {}
    }
  }

  entries
}

/// Look up the credentials stored for `host` in the `.netrc` at `path`.
///
/// A matching entry without both `login` and `password` yields `Ok(None)`
/// rather than falling through to `default`.
///
/// # Errors
///
/// Fails when the file cannot be read.
pub fn read_netrc_credentials(path: &Path, host: &str) -> Result<Option<Credentials>> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let mut entries = parse_entries(&content);

  let position = entries
    .iter()
    .position(|entry| entry.machine.as_deref() == Some(host))
    .or_else(|| entries.iter().position(|entry| entry.machine.is_none()));

  Ok(position.and_then(|index| entries.swap_remove(index).into_credentials()))
}

/// Host part of a server URL, as used for `machine` names.
///
/// ```
/// use adaptavist_core::creds::netrc::machine_name;
///
/// assert_eq!(machine_name("https://jira.example.com/"), "jira.example.com");
/// assert_eq!(machine_name("http://localhost:8080"), "localhost:8080");
/// ```
pub fn machine_name(server: &str) -> String {
  let server = server.trim();
  let without_scheme = server
    .split_once("://")
    .map(|(_, rest)| rest)
    .unwrap_or(server);

  without_scheme.split('/').next().unwrap_or_default().to_string()
}
