//! Error type of the Adaptavist client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::AdaptavistClient`].
///
/// Queries that find nothing are not errors: they return `None` or an empty
/// list. `NotFound` is reserved for writes whose target does not exist.
#[derive(Debug, Error)]
pub enum AdaptavistError {
  #[error("Authentication failed. Please check your Jira credentials.")]
  Unauthorized,

  #[error("{0} not found")]
  NotFound(String),

  #[error("Unexpected error: HTTP {status} - {body}")]
  Status { status: StatusCode, body: String },

  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("Request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to parse response: {0}")]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Config(#[from] anyhow::Error),
}

impl AdaptavistError {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  /// Whether the error is a failed authentication
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, Self::Unauthorized)
  }

  /// HTTP status of the failed request, if the server answered
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
      Self::Status { status, .. } => Some(*status),
      Self::Transport(error) => error.status(),
      _ => None,
    }
  }
}

/// Result alias used throughout the client
pub type Result<T, E = AdaptavistError> = std::result::Result<T, E>;
