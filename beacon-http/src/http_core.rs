use http::HeaderMap;
use tracing::{debug, instrument};

use beacon_search::Query;

use crate::HttpError::InvalidInput;
use crate::{Beacon, BeaconResponse, PostRequest, Request, Result, convert_to_query};

/// Gets the response for a GET query. The parameters are read from the query string.
#[instrument(level = "debug", skip_all, ret)]
pub async fn get(beacon: &Beacon, request: Request) -> Result<BeaconResponse> {
  let query = convert_to_query(&request, beacon.require_coordinate())?;

  debug!(query = ?query, "getting GET response");

  exists(beacon, query, request.headers()).await
}

/// Gets the response for a POST query. The parameters are read from the JSON body, and the
/// query string must be empty.
#[instrument(level = "debug", skip_all, ret)]
pub async fn post(beacon: &Beacon, body: PostRequest, request: Request) -> Result<BeaconResponse> {
  if !request.query().is_empty() {
    return Err(InvalidInput(
      "query parameters should be empty for a POST request".to_string(),
    ));
  }

  let query = body.get_query(beacon.require_coordinate())?;

  debug!(query = ?query, "getting POST response");

  exists(beacon, query, request.headers()).await
}

async fn exists(beacon: &Beacon, query: Query, headers: &HeaderMap) -> Result<BeaconResponse> {
  query.validate()?;

  let executor = beacon.executor(headers)?;
  let exists = query.execute(executor.as_ref(), beacon.table()).await?;

  Ok(BeaconResponse::new(exists))
}
