use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::response::ErasedJson;

use beacon_http::get_service_info_json;

use crate::server::AppState;

/// Gets the JSON to return for the service-info endpoint.
pub async fn beacon_service_info(State(app_state): State<AppState>) -> impl IntoResponse {
  ErasedJson::pretty(get_service_info_json(
    &app_state.beacon,
    &app_state.service_info,
  ))
}
