//! This module contains error and result types for beacon-axum.
//!

use std::{io, result};

use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum_extra::response::ErasedJson;
use thiserror::Error;

/// The result type for beacon-axum.
pub type Result<T> = result::Result<T, Error>;

/// The error type for beacon-axum.
#[derive(Error, Debug)]
pub enum Error {
  #[error("{0}")]
  IoError(#[from] io::Error),

  #[error("server error: {0}")]
  ServerError(String),

  #[error("failed to create beacon: {0}")]
  SetupError(String),
}

impl From<beacon_http::HttpError> for Error {
  fn from(error: beacon_http::HttpError) -> Self {
    let (json, _) = error.to_json_representation();
    Self::SetupError(format!("{}: {}", json.error(), json.message()))
  }
}

impl From<Error> for io::Error {
  fn from(error: Error) -> Self {
    if let Error::IoError(io) = error {
      io
    } else {
      io::Error::other(error)
    }
  }
}

/// A wrapper around the http HttpError for implementing Axum response traits.
#[derive(Debug)]
pub struct HttpError(pub beacon_http::HttpError);

impl HttpError {
  /// Create an invalid input error.
  pub fn invalid_input(err: String) -> HttpError {
    beacon_http::HttpError::InvalidInput(err).into()
  }
}

impl IntoResponse for HttpError {
  fn into_response(self) -> Response {
    let (json, status_code) = self.0.to_json_representation();
    (status_code, ErasedJson::pretty(json)).into_response()
  }
}

impl From<beacon_http::HttpError> for HttpError {
  fn from(err: beacon_http::HttpError) -> Self {
    Self(err)
  }
}

impl From<JsonRejection> for HttpError {
  fn from(rejection: JsonRejection) -> Self {
    Self::invalid_input(format!("invalid request body: {}", rejection.body_text()))
  }
}
