use std::time::Duration;

use adaptavist_core::{Verification, ensure_url_scheme};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::consts::{ATM_API, JIRA_API, TESTS_API, USER_AGENT};
use crate::error::{AdaptavistError, Result};
use crate::models::AdaptavistAuth;

/// Connection options of an [`AdaptavistClient`]
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
  /// How the server certificate is verified
  pub verification: Verification,
  /// Per-request timeout, reqwest's default when unset
  pub timeout: Option<Duration>,
}

/// Represents an Adaptavist Test Management API client.
///
/// One HTTP session is created per client and reused by every call.
pub struct AdaptavistClient {
  pub(crate) client: Client,
  pub(crate) base_url: String,
  pub(crate) auth: AdaptavistAuth,
}

impl std::fmt::Debug for AdaptavistClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AdaptavistClient")
      .field("base_url", &self.base_url)
      .field("auth", &self.auth)
      .finish_non_exhaustive()
  }
}

impl AdaptavistClient {
  /// Create a client verifying certificates against the system trust store
  pub fn new(server: &str, username: &str, password: &str) -> Result<Self> {
    let auth = AdaptavistAuth {
      username: username.to_string(),
      password: password.to_string(),
    };
    Self::with_options(server, auth, ClientOptions::default())
  }

  /// Create a client with explicit connection options
  pub fn with_options(server: &str, auth: AdaptavistAuth, options: ClientOptions) -> Result<Self> {
    let base_url = ensure_url_scheme(server)?;

    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = options.timeout {
      builder = builder.timeout(timeout);
    }

    builder = match &options.verification {
      Verification::System => builder,
      Verification::Disabled => {
        warn!("Certificate verification is disabled for {base_url}");
        builder.danger_accept_invalid_certs(true)
      }
      Verification::CaBundle(path) => {
        let pem = std::fs::read(path)?;
        builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?)
      }
      Verification::Pem(pem) => builder.add_root_certificate(reqwest::Certificate::from_pem(pem)?),
    };

    let client = builder.build()?;
    debug!("Created client for {base_url}");

    Ok(Self { client, base_url, auth })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn username(&self) -> &str {
    &self.auth.username
  }

  /// Test the Jira connection by fetching the current user
  pub fn test_connection(&self) -> Result<bool> {
    let url = self.jira_url("myself");
    let response = self.request(self.client.get(&url)).send()?;

    Ok(response.status().is_success())
  }

  pub(crate) fn atm_url(&self, path: &str) -> String {
    format!("{}/{ATM_API}/{path}", self.base_url)
  }

  pub(crate) fn jira_url(&self, path: &str) -> String {
    format!("{}/{JIRA_API}/{path}", self.base_url)
  }

  pub(crate) fn tests_url(&self, path: &str) -> String {
    format!("{}/{TESTS_API}/{path}", self.base_url)
  }

  /// Add authentication and the JSON accept header
  pub(crate) fn request(&self, builder: RequestBuilder) -> RequestBuilder {
    builder
      .basic_auth(&self.auth.username, Some(&self.auth.password))
      .header(ACCEPT, "application/json")
  }

  /// GET a JSON document. A missing resource yields `None`.
  pub(crate) fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<Option<T>> {
    debug!("GET {url}");
    let response = self.request(self.client.get(url).query(query)).send()?;

    match check_status(response, url) {
      Ok(response) => parse_json(response).map(Some),
      Err(AdaptavistError::NotFound(_)) => {
        debug!("Nothing found at {url}");
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }

  /// POST a JSON body and parse the JSON answer
  pub(crate) fn post_json<B, T>(&self, url: &str, body: &B, entity: &str) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    debug!("POST {url}");
    let response = self.request(self.client.post(url).json(body)).send()?;
    let response = check_status(response, entity)?;
    parse_json(response)
  }

  /// PUT a JSON body, ignoring the answer
  pub(crate) fn put_json<B: Serialize + ?Sized>(&self, url: &str, body: &B, entity: &str) -> Result<()> {
    debug!("PUT {url}");
    let response = self.request(self.client.put(url).json(body)).send()?;
    check_status(response, entity)?;
    Ok(())
  }

  pub(crate) fn delete(&self, url: &str, entity: &str) -> Result<()> {
    debug!("DELETE {url}");
    let response = self.request(self.client.delete(url)).send()?;
    check_status(response, entity)?;
    Ok(())
  }

  /// Send a prepared request and parse the JSON answer
  pub(crate) fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, entity: &str) -> Result<T> {
    let response = self.request(builder).send()?;
    let response = check_status(response, entity)?;
    parse_json(response)
  }
}

/// Map non-success statuses to errors. `entity` names the target for
/// `NotFound`.
pub(crate) fn check_status(response: Response, entity: &str) -> Result<Response> {
  let status = response.status();
  match status {
    status if status.is_success() => Ok(response),
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
      warn!("Request for {entity} was rejected: HTTP {status}");
      Err(AdaptavistError::Unauthorized)
    }
    StatusCode::NOT_FOUND => Err(AdaptavistError::NotFound(entity.to_string())),
    _ => {
      let body = response.text().unwrap_or_default();
      warn!("Request for {entity} failed: HTTP {status} - {body}");
      Err(AdaptavistError::Status { status, body })
    }
  }
}

fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
  let text = response.text()?;
  Ok(serde_json::from_str(&text)?)
}
