use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use http::HeaderMap;

use beacon_http::{PostRequest, post};

use crate::error::HttpError;
use crate::server::AppState;

use super::{extract_request, handle_response};

/// POST request query endpoint. A body which does not deserialize is reported like any other
/// invalid input.
pub async fn query(
  request: Query<HashMap<String, String>>,
  headers: HeaderMap,
  State(app_state): State<AppState>,
  body: Result<Json<PostRequest>, JsonRejection>,
) -> Response {
  let Json(body) = match body {
    Ok(body) => body,
    Err(rejection) => return HttpError::from(rejection).into_response(),
  };
  let request = extract_request(request, headers.clone());

  handle_response(post(&app_state.beacon, body, request).await, &headers)
}
