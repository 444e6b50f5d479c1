use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use super::api_types::ApiErrorBody;

const GENERIC_MESSAGE: &str = "An error occurred";

/// The single failure kind surfaced by the catalog client.
///
/// Transport errors, timeouts, non-2xx responses and undecodable bodies all
/// collapse into a human-readable message; callers never branch on the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchFailure(String);

impl FetchFailure {
  pub fn new(message: impl Into<String>) -> Self {
    let message = message.into();
    if message.trim().is_empty() {
      Self(GENERIC_MESSAGE.to_string())
    } else {
      Self(message)
    }
  }

  #[cfg(test)]
  pub fn message(&self) -> &str {
    &self.0
  }

  /// Build the failure for a non-success response.
  ///
  /// A server-supplied `message` wins, then the status line.
  pub fn from_response(status: StatusCode, body: &str) -> Self {
    let server_message = serde_json::from_str::<ApiErrorBody>(body)
      .ok()
      .and_then(|b| b.message)
      .filter(|m| !m.trim().is_empty());

    match server_message {
      Some(message) => Self(message),
      None => Self::new(format!("Request failed with status code {}", status.as_u16())),
    }
  }

  pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
    if err.is_timeout() {
      return Self::new(format!("timeout of {}ms exceeded", timeout.as_millis()));
    }
    Self::new(err.to_string())
  }
}

impl Default for FetchFailure {
  fn default() -> Self {
    Self(GENERIC_MESSAGE.to_string())
  }
}

pub type FetchResult<T> = Result<T, FetchFailure>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_server_message_wins() {
    let failure = FetchFailure::from_response(
      StatusCode::BAD_REQUEST,
      r#"{"message":"DUPLICATE_FAVOURITE - favourites are unique for account + image_id + sub_id"}"#,
    );
    assert_eq!(
      failure.message(),
      "DUPLICATE_FAVOURITE - favourites are unique for account + image_id + sub_id"
    );
  }

  #[test]
  fn test_status_fallback_for_plain_body() {
    let failure = FetchFailure::from_response(StatusCode::NOT_FOUND, "NOT_FOUND");
    assert_eq!(failure.message(), "Request failed with status code 404");
  }

  #[test]
  fn test_status_fallback_for_blank_message() {
    let failure = FetchFailure::from_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":""}"#);
    assert_eq!(failure.message(), "Request failed with status code 500");
  }

  #[test]
  fn test_generic_fallback() {
    assert_eq!(FetchFailure::new("  ").message(), "An error occurred");
    assert_eq!(FetchFailure::default().to_string(), "An error occurred");
  }
}
