//! Error and result types for beacon-search.
//!

use thiserror::Error;

/// The result type for beacon queries.
pub type Result<T> = core::result::Result<T, BeaconError>;

/// Which side of the call an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The caller sent a query that cannot be answered.
  Client,
  /// The store could not answer a valid query.
  Server,
}

/// Errors raised while validating or executing a beacon query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BeaconError {
  #[error("missing field: {0}")]
  MissingField(String),

  #[error("invalid coordinate spec: {0}")]
  InvalidCoordinateSpec(String),

  #[error("connection error: {0}")]
  ConnectionError(String),

  #[error("query error: {0}")]
  QueryError(String),

  #[error("result decode error: {0}")]
  ResultDecodeError(String),
}

impl BeaconError {
  pub fn missing_field<S: Into<String>>(field: S) -> Self {
    Self::MissingField(field.into())
  }

  pub fn invalid_coordinate_spec<S: Into<String>>(message: S) -> Self {
    Self::InvalidCoordinateSpec(message.into())
  }

  pub fn connection_error<S: Into<String>>(message: S) -> Self {
    Self::ConnectionError(message.into())
  }

  pub fn query_error<S: Into<String>>(message: S) -> Self {
    Self::QueryError(message.into())
  }

  pub fn result_decode_error<S: Into<String>>(message: S) -> Self {
    Self::ResultDecodeError(message.into())
  }

  /// Get the kind of this error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MissingField(_) | Self::InvalidCoordinateSpec(_) => ErrorKind::Client,
      Self::ConnectionError(_) | Self::QueryError(_) | Self::ResultDecodeError(_) => {
        ErrorKind::Server
      }
    }
  }

  /// Prefix the message with a label describing what was being done, keeping the kind.
  pub fn with_context(self, context: &str) -> Self {
    match self {
      Self::MissingField(err) => Self::MissingField(format!("{context}: {err}")),
      Self::InvalidCoordinateSpec(err) => Self::InvalidCoordinateSpec(format!("{context}: {err}")),
      Self::ConnectionError(err) => Self::ConnectionError(format!("{context}: {err}")),
      Self::QueryError(err) => Self::QueryError(format!("{context}: {err}")),
      Self::ResultDecodeError(err) => Self::ResultDecodeError(format!("{context}: {err}")),
    }
  }
}
