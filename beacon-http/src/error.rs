use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use beacon_search::{BeaconError, ErrorKind};

pub type Result<T> = core::result::Result<T, HttpError>;

/// The errors a beacon request can end in.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HttpError {
  #[error("InvalidInput")]
  InvalidInput(String),
  #[error("InvalidAuthentication")]
  InvalidAuthentication(String),
  #[error("InternalError")]
  InternalError(String),
}

/// A helper struct implementing [serde's Serialize trait](Serialize) to allow
/// easily converting HttpErrors to JSON
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct JsonHttpError {
  error: String,
  message: String,
}

impl JsonHttpError {
  /// Get the error name.
  pub fn error(&self) -> &str {
    &self.error
  }

  /// Get the message.
  pub fn message(&self) -> &str {
    &self.message
  }
}

impl HttpError {
  /// Allows converting the error to JSON and the correspondent
  /// status code
  pub fn to_json_representation(&self) -> (JsonHttpError, StatusCode) {
    let (err, status_code) = match self {
      HttpError::InvalidInput(err) => (err, StatusCode::BAD_REQUEST),
      HttpError::InvalidAuthentication(err) => (err, StatusCode::UNAUTHORIZED),
      HttpError::InternalError(err) => (err, StatusCode::INTERNAL_SERVER_ERROR),
    };

    (
      JsonHttpError {
        error: self.to_string(),
        message: err.to_string(),
      },
      status_code,
    )
  }
}

impl From<BeaconError> for HttpError {
  fn from(error: BeaconError) -> Self {
    match error.kind() {
      ErrorKind::Client => Self::InvalidInput(error.to_string()),
      ErrorKind::Server => Self::InternalError(error.to_string()),
    }
  }
}

impl From<quick_xml::errors::serialize::SeError> for HttpError {
  fn from(error: quick_xml::errors::serialize::SeError) -> Self {
    Self::InternalError(format!("encoding response: {error}"))
  }
}

impl From<serde_json::Error> for HttpError {
  fn from(error: serde_json::Error) -> Self {
    Self::InternalError(format!("encoding response: {error}"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_errors_are_bad_requests() {
    let (json, status) =
      HttpError::from(BeaconError::missing_field("allele")).to_json_representation();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json.error(), "InvalidInput");
    assert_eq!(json.message(), "missing field: allele");
  }

  #[test]
  fn server_errors_are_internal() {
    let (json, status) =
      HttpError::from(BeaconError::connection_error("refused")).to_json_representation();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json.error(), "InternalError");
  }

  #[test]
  fn invalid_authentication() {
    let (json, status) =
      HttpError::InvalidAuthentication("missing token".to_string()).to_json_representation();

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
      serde_json::to_value(json).unwrap(),
      serde_json::json!({ "error": "InvalidAuthentication", "message": "missing token" })
    );
  }
}
