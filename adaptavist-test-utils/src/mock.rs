//! Mock Jira server for blocking clients
//!
//! `wiremock` is async while the client under test is blocking. [`MockJira`]
//! owns a tokio runtime used only to start the server, mount mocks and read
//! back recorded requests; the blocking client is called from the test thread
//! outside of that runtime.

use serde_json::Value;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

/// A running mock Jira server
pub struct MockJira {
  server: MockServer,
  runtime: Runtime,
}

impl Default for MockJira {
  fn default() -> Self {
    Self::start()
  }
}

impl MockJira {
  /// Start a new mock server
  pub fn start() -> Self {
    let runtime = Runtime::new().expect("Failed to create tokio runtime");
    let server = runtime.block_on(MockServer::start());
    Self { server, runtime }
  }

  /// Base URL of the mock server
  pub fn uri(&self) -> String {
    self.server.uri()
  }

  /// Mount a mock on the server
  pub fn mount(&self, mock: Mock) {
    self.runtime.block_on(mock.mount(&self.server));
  }

  /// Check that all mounted expectations were met
  pub fn verify(&self) {
    self.runtime.block_on(self.server.verify());
  }

  /// All requests received so far
  pub fn received_requests(&self) -> Vec<Request> {
    self
      .runtime
      .block_on(self.server.received_requests())
      .unwrap_or_default()
  }

  /// Requests received for the given method and path
  pub fn requests_to(&self, method: &str, path: &str) -> Vec<Request> {
    self
      .received_requests()
      .into_iter()
      .filter(|request| request.method.as_str().eq_ignore_ascii_case(method) && request.url.path() == path)
      .collect()
  }

  /// JSON bodies received for the given method and path
  pub fn json_bodies(&self, method: &str, path: &str) -> Vec<Value> {
    self
      .requests_to(method, path)
      .iter()
      .map(|request| serde_json::from_slice(&request.body).expect("Request body is not JSON"))
      .collect()
  }
}
