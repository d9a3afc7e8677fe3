use std::collections::HashMap;

use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};

use beacon_http::{BeaconResponse, Request, ResponseFormat};

use crate::error::HttpError;
pub use crate::handlers::service_info::beacon_service_info;

pub mod get;
pub mod post;
pub mod service_info;

/// Handles a response, encoding it in the format the client accepts, or converting errors to
/// json with the proper HTTP status code.
fn handle_response(
  response: beacon_http::Result<BeaconResponse>,
  headers: &HeaderMap,
) -> Response {
  let format = ResponseFormat::from_headers(headers);

  match response.and_then(|response| response.encode(format)) {
    Err(error) => HttpError(error).into_response(),
    Ok(body) => (
      StatusCode::OK,
      [(CONTENT_TYPE, format.content_type())],
      body,
    )
      .into_response(),
  }
}

fn extract_request(Query(query): Query<HashMap<String, String>>, headers: HeaderMap) -> Request {
  Request::new(query, headers)
}
