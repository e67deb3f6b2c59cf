//! Shared fixtures of the endpoint tests.

use adaptavist_test_utils::MockJira;
use serde_json::Value;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::client::AdaptavistClient;

pub(crate) fn client(server: &MockJira) -> AdaptavistClient {
  AdaptavistClient::new(&server.uri(), "test_user", "test_token").unwrap()
}

/// Answer authenticated GET requests on `url_path` with `body`
pub(crate) fn mount_get(server: &MockJira, url_path: &str, body: Value) {
  server.mount(
    Mock::given(method("GET"))
      .and(path(url_path))
      .and(basic_auth("test_user", "test_token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(body)),
  );
}

/// Answer authenticated requests of `verb` on `url_path` with `body`
pub(crate) fn mount_write(server: &MockJira, verb: &str, url_path: &str, body: Value) {
  server.mount(
    Mock::given(method(verb))
      .and(path(url_path))
      .and(basic_auth("test_user", "test_token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(body)),
  );
}
