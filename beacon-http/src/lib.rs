pub use beacon::{Backend, Beacon};
pub use beacon_config::config::Config;
pub use beacon_config::config::service_info::ServiceInfo as ConfigServiceInfo;
use beacon_search::Query;
pub use error::{HttpError, JsonHttpError, Result};
pub use http_core::{get, post};
pub use post_request::PostRequest;
use query_builder::{QueryBuilder, merge_aliases, parse_position};
pub use request::Request;
pub use response::{BeaconResponse, JSON_CONTENT_TYPE, ResponseFormat, XML_CONTENT_TYPE};
pub use service_info::{BeaconInfo, ServiceInfo, Type, get_service_info_json};

mod beacon;
mod error;
mod http_core;
mod post_request;
mod query_builder;
mod request;
mod response;
mod service_info;

/// Convert the query parameters of a GET request into a [Query].
fn convert_to_query(request: &Request, require_coordinate: bool) -> Result<Query> {
  let query = request.query();
  let get = |name: &str| query.get(name).cloned();
  let position = |name: &str| parse_position(name, query.get(name).map(String::as_str));

  Ok(
    QueryBuilder::new(
      merge_aliases(
        ("referenceName", get("referenceName")),
        ("chromosome", get("chromosome")),
      )?,
      merge_aliases(
        ("referenceBases", get("referenceBases")),
        ("allele", get("allele")),
      )?,
    )
    .with_require_coordinate(require_coordinate)
    .with_coordinate(position("coordinate")?)
    .with_precise(position("start")?, position("end")?)
    .with_imprecise(
      (position("startMin")?, position("startMax")?),
      (position("endMin")?, position("endMax")?),
    )
    .build(),
  )
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::sync::Arc;
  use std::time::Duration;

  use beacon_config::config::bigquery::AuthMode;
  use beacon_search::{BigQuery, InMemoryExecutor, ServiceAccountSession, VariantRow};
  use beacon_test::bigquery::{Behaviour, FakeBigQuery, SERVICE_ACCOUNT_TOKEN};
  use beacon_test::fixtures::{
    BRCA1_ALLELE, BRCA1_COORDINATE, BRCA1_REFERENCE_NAME, PROJECT_ID, TABLE_ID, brca1_rows,
  };
  use http::header::AUTHORIZATION;
  use http::{HeaderMap, HeaderValue};

  use super::*;

  fn query_params(params: &[(&str, &str)]) -> HashMap<String, String> {
    params
      .iter()
      .map(|(name, value)| (name.to_string(), value.to_string()))
      .collect()
  }

  fn brca1_params(coordinate: i64) -> HashMap<String, String> {
    query_params(&[
      ("chromosome", BRCA1_REFERENCE_NAME),
      ("allele", BRCA1_ALLELE),
      ("coordinate", &coordinate.to_string()),
    ])
  }

  fn memory_beacon() -> Beacon {
    Beacon::new(
      Backend::Memory(InMemoryExecutor::with_rows(
        TABLE_ID.parse().unwrap(),
        vec![VariantRow::new(
          BRCA1_REFERENCE_NAME,
          BRCA1_ALLELE,
          BRCA1_COORDINATE,
          BRCA1_COORDINATE + 1,
        )],
      )),
      TABLE_ID.parse().unwrap(),
      true,
    )
  }

  fn bigquery_beacon(server: &FakeBigQuery, auth_mode: AuthMode) -> Beacon {
    Beacon::new(
      Backend::BigQuery {
        bigquery: BigQuery::new(server.endpoint(), PROJECT_ID, Duration::from_secs(5)).unwrap(),
        auth_mode,
        service_account: Arc::new(ServiceAccountSession::new(server.token_url())),
      },
      TABLE_ID.parse().unwrap(),
      true,
    )
  }

  #[test]
  fn convert_get_parameters() {
    let request = Request::new(
      query_params(&[
        ("referenceName", "chr1"),
        ("referenceBases", "A"),
        ("startMin", "1"),
        ("startMax", "2"),
        ("endMin", "3"),
        ("endMax", "4"),
      ]),
      Default::default(),
    );

    assert_eq!(
      convert_to_query(&request, true),
      Ok(
        Query::new("chr1", "A")
          .with_start_min(1)
          .with_start_max(2)
          .with_end_min(3)
          .with_end_max(4)
      )
    );
  }

  #[test]
  fn convert_invalid_position() {
    let request = Request::new(
      query_params(&[("chromosome", "chr1"), ("allele", "A"), ("coordinate", "x")]),
      Default::default(),
    );

    assert!(matches!(
      convert_to_query(&request, true),
      Err(HttpError::InvalidInput(_))
    ));
  }

  #[test]
  fn convert_empty_coordinate() {
    let request = Request::new(
      query_params(&[("chromosome", "chr1"), ("allele", "A"), ("coordinate", "")]),
      Default::default(),
    );

    assert_eq!(
      convert_to_query(&request, false),
      Ok(Query::new("chr1", "A").with_require_coordinate(false))
    );
  }

  #[tokio::test]
  async fn get_request_exists() {
    let request = Request::new(brca1_params(BRCA1_COORDINATE), Default::default());

    assert_eq!(
      get(&memory_beacon(), request).await,
      Ok(BeaconResponse::new(true))
    );
  }

  #[tokio::test]
  async fn get_request_end_is_exclusive() {
    let request = Request::new(brca1_params(BRCA1_COORDINATE + 1), Default::default());

    assert_eq!(
      get(&memory_beacon(), request).await,
      Ok(BeaconResponse::new(false))
    );
  }

  #[tokio::test]
  async fn get_request_missing_field() {
    let request = Request::new(
      query_params(&[("allele", "A"), ("coordinate", "1")]),
      Default::default(),
    );

    assert!(matches!(
      get(&memory_beacon(), request).await,
      Err(HttpError::InvalidInput(message)) if message.contains("referenceName")
    ));
  }

  #[tokio::test]
  async fn get_request_missing_coordinate() {
    let request = Request::new(
      query_params(&[("chromosome", "chr1"), ("allele", "A")]),
      Default::default(),
    );

    assert!(matches!(
      get(&memory_beacon(), request).await,
      Err(HttpError::InvalidInput(_))
    ));
  }

  #[tokio::test]
  async fn post_request_exists() {
    let body = PostRequest {
      reference_name: Some(BRCA1_REFERENCE_NAME.to_string()),
      reference_bases: Some(BRCA1_ALLELE.to_string()),
      start: Some(BRCA1_COORDINATE),
      ..Default::default()
    };

    assert_eq!(
      post(&memory_beacon(), body, Request::default()).await,
      Ok(BeaconResponse::new(true))
    );
  }

  #[tokio::test]
  async fn post_request_with_query_parameters() {
    let request = Request::new(brca1_params(BRCA1_COORDINATE), Default::default());

    assert!(matches!(
      post(&memory_beacon(), PostRequest::default(), request).await,
      Err(HttpError::InvalidInput(_))
    ));
  }

  #[tokio::test]
  async fn get_request_open_mode() {
    let server = FakeBigQuery::start(brca1_rows()).await;
    let request = Request::new(brca1_params(BRCA1_COORDINATE), Default::default());

    assert_eq!(
      get(&bigquery_beacon(&server, AuthMode::Open), request).await,
      Ok(BeaconResponse::new(true))
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
      requests[0].authorization,
      Some(format!("Bearer {SERVICE_ACCOUNT_TOKEN}"))
    );
  }

  #[tokio::test]
  async fn get_request_auth_mode_forwards_token() {
    let server = FakeBigQuery::start(brca1_rows()).await;
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer caller-token"));
    let request = Request::new(brca1_params(BRCA1_COORDINATE), headers);

    assert_eq!(
      get(&bigquery_beacon(&server, AuthMode::Auth), request).await,
      Ok(BeaconResponse::new(true))
    );
    assert_eq!(
      server.requests()[0].authorization.as_deref(),
      Some("Bearer caller-token")
    );
  }

  #[tokio::test]
  async fn get_request_auth_mode_without_token() {
    let server = FakeBigQuery::start(brca1_rows()).await;
    let request = Request::new(brca1_params(BRCA1_COORDINATE), Default::default());

    assert!(matches!(
      get(&bigquery_beacon(&server, AuthMode::Auth), request).await,
      Err(HttpError::InvalidAuthentication(_))
    ));
    assert!(server.requests().is_empty());
  }

  #[tokio::test]
  async fn invalid_query_is_not_sent() {
    let server = FakeBigQuery::start(brca1_rows()).await;
    let request = Request::new(
      query_params(&[
        ("chromosome", "chr17"),
        ("allele", "A"),
        ("start", "10"),
        ("end", "5"),
      ]),
      Default::default(),
    );

    assert!(matches!(
      get(&bigquery_beacon(&server, AuthMode::Open), request).await,
      Err(HttpError::InvalidInput(_))
    ));
    assert!(server.requests().is_empty());
  }

  #[tokio::test]
  async fn get_request_store_failure() {
    let server = FakeBigQuery::start_with(brca1_rows(), Behaviour::Reject(400)).await;
    let request = Request::new(brca1_params(BRCA1_COORDINATE), Default::default());

    assert!(matches!(
      get(&bigquery_beacon(&server, AuthMode::Open), request).await,
      Err(HttpError::InternalError(_))
    ));
  }
}
