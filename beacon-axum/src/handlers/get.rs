use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use http::HeaderMap;

use beacon_http::get;

use crate::handlers::extract_request;
use crate::server::AppState;

use super::handle_response;

/// GET request query endpoint.
pub async fn query(
  request: Query<HashMap<String, String>>,
  headers: HeaderMap,
  State(app_state): State<AppState>,
) -> impl IntoResponse {
  let request = extract_request(request, headers.clone());

  handle_response(get(&app_state.beacon, request).await, &headers)
}
