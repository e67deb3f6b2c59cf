//! Server URL resolution and normalisation.

use anyhow::Result;
use url::Url;

use crate::config::Settings;

/// Environment variable storing the Jira server.
pub const ENV_JIRA_HOST: &str = "JIRA_HOST";

/// Resolve the Jira server URL.
///
/// `$JIRA_HOST` takes precedence over the `server` key of the settings file.
/// The result always carries a scheme and never ends with a slash.
pub fn resolve_server_url(settings: &Settings) -> Result<String> {
  let from_env = std::env::var(ENV_JIRA_HOST).ok().filter(|host| !host.trim().is_empty());

  match from_env.or_else(|| settings.server.clone()) {
    Some(host) => ensure_url_scheme(&host),
    None => Err(anyhow::anyhow!(
      "Jira server not configured. Set '{ENV_JIRA_HOST}' or the 'server' key of the settings file."
    )),
  }
}

/// Ensure a server URL has a scheme and no trailing slash.
///
/// Inputs without a scheme get `https://`. Malformed schemes such as
/// `http:/jira.example.com` are repaired the same way.
pub fn ensure_url_scheme(input: &str) -> Result<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(anyhow::anyhow!("Host cannot be empty"));
  }

  let lowered = trimmed.to_ascii_lowercase();
  let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
    trimmed.to_string()
  } else if lowered.starts_with("http:") || lowered.starts_with("https:") {
    let remainder = trimmed.split_once(':').map(|(_, rest)| rest).unwrap_or_default();
    format!("https://{}", remainder.trim_start_matches('/'))
  } else {
    format!("https://{trimmed}")
  };

  let url = Url::parse(&candidate).map_err(|e| anyhow::anyhow!("Failed to parse URL '{input}': {e}"))?;
  if url.host().is_none() {
    return Err(anyhow::anyhow!("URL '{input}' does not contain a host"));
  }

  Ok(url.as_str().trim_end_matches('/').to_string())
}
