//! A fake of the BigQuery `jobs.query` endpoint and of the metadata token endpoint.
//!
//! Statements are not parsed. The named parameters are evaluated against the rows the server
//! was started with, which is enough to answer the count statements beacon-rs sends.
//!

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::header::AUTHORIZATION;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

/// The token handed out by the fake metadata server.
pub const SERVICE_ACCOUNT_TOKEN: &str = "service-account-token";

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// How the fake server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
  /// Count the matching rows.
  Evaluate,
  /// Reject every statement with this status.
  Reject(u16),
  /// Answer with a count that is not an integer.
  Malformed,
  /// Answer as if the job did not finish before the timeout.
  Incomplete,
  /// Fail to hand out service account tokens.
  TokenUnavailable,
}

/// A row of the fake allele table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FakeRow {
  pub reference_name: String,
  pub reference_bases: String,
  pub start: i64,
  pub end: i64,
}

impl FakeRow {
  pub fn new(
    reference_name: impl Into<String>,
    reference_bases: impl Into<String>,
    start: i64,
    end: i64,
  ) -> Self {
    Self {
      reference_name: reference_name.into(),
      reference_bases: reference_bases.into(),
      start,
      end,
    }
  }

  fn matches(&self, parameters: &HashMap<String, String>) -> bool {
    let int = |name: &str| parameters.get(name).and_then(|value| value.parse::<i64>().ok());
    let string_matches = |name: &str, column: &str| {
      parameters
        .get(name)
        .is_none_or(|value| value.as_str() == column)
    };
    let between = |lower: &str, upper: &str, column: i64| match (int(lower), int(upper)) {
      (Some(lower), Some(upper)) => lower <= column && column <= upper,
      _ => true,
    };

    string_matches("reference_name", &self.reference_name)
      && string_matches("reference_bases", &self.reference_bases)
      && int("coordinate").is_none_or(|position| self.start <= position && position < self.end)
      && int("start").is_none_or(|start| self.start == start)
      && int("end").is_none_or(|end| self.end == end)
      && between("start_min", "start_max", self.start)
      && between("end_min", "end_max", self.end)
  }
}

/// A statement received by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
  pub project_id: String,
  pub authorization: Option<String>,
  pub body: Value,
}

#[derive(Debug, Clone)]
struct FakeState {
  rows: Arc<Vec<FakeRow>>,
  behaviour: Behaviour,
  requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A running fake server. The server stops when this is dropped.
#[derive(Debug)]
pub struct FakeBigQuery {
  addr: SocketAddr,
  requests: Arc<Mutex<Vec<RecordedRequest>>>,
  handle: JoinHandle<()>,
}

impl FakeBigQuery {
  /// Start a server which evaluates statements against the rows.
  pub async fn start(rows: Vec<FakeRow>) -> Self {
    Self::start_with(rows, Behaviour::Evaluate).await
  }

  /// Start a server with the given behaviour.
  pub async fn start_with(rows: Vec<FakeRow>, behaviour: Behaviour) -> Self {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
      rows: Arc::new(rows),
      behaviour,
      requests: requests.clone(),
    };

    let router = Router::new()
      .route("/bigquery/v2/projects/{project_id}/queries", post(queries))
      .route(TOKEN_PATH, get(token))
      .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
      .await
      .expect("expected to bind fake server");
    let addr = listener
      .local_addr()
      .expect("expected fake server address");

    let handle = tokio::spawn(async move {
      axum::serve(listener, router)
        .await
        .expect("expected fake server to run");
    });

    Self {
      addr,
      requests,
      handle,
    }
  }

  /// Get the REST endpoint.
  pub fn endpoint(&self) -> String {
    format!("http://{}", self.addr)
  }

  /// Get the metadata token url.
  pub fn token_url(&self) -> String {
    format!("http://{}{TOKEN_PATH}", self.addr)
  }

  /// Get the statements received so far.
  pub fn requests(&self) -> Vec<RecordedRequest> {
    self
      .requests
      .lock()
      .expect("expected requests lock")
      .clone()
  }
}

impl Drop for FakeBigQuery {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

fn error_response(status: StatusCode, message: &str) -> Response {
  (
    status,
    Json(json!({
      "error": {
        "code": status.as_u16(),
        "message": message,
        "errors": [{ "message": message }]
      }
    })),
  )
    .into_response()
}

fn count_response(count: Value) -> Response {
  Json(json!({
    "kind": "bigquery#queryResponse",
    "jobComplete": true,
    "totalRows": "1",
    "rows": [{ "f": [{ "v": count }] }]
  }))
  .into_response()
}

fn named_parameters(body: &Value) -> HashMap<String, String> {
  body["queryParameters"]
    .as_array()
    .into_iter()
    .flatten()
    .filter_map(|parameter| {
      Some((
        parameter["name"].as_str()?.to_string(),
        parameter["parameterValue"]["value"].as_str()?.to_string(),
      ))
    })
    .collect()
}

async fn queries(
  Path(project_id): Path<String>,
  headers: HeaderMap,
  State(state): State<FakeState>,
  Json(body): Json<Value>,
) -> Response {
  let authorization = headers
    .get(AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .map(str::to_string);

  debug!(project_id = %project_id, body = %body, "fake statement received");

  state
    .requests
    .lock()
    .expect("expected requests lock")
    .push(RecordedRequest {
      project_id,
      authorization: authorization.clone(),
      body: body.clone(),
    });

  if authorization.is_none() {
    return error_response(StatusCode::UNAUTHORIZED, "request is missing credentials");
  }

  match state.behaviour {
    Behaviour::Reject(status) => error_response(
      StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
      "statement rejected",
    ),
    Behaviour::Malformed => count_response(json!("many")),
    Behaviour::Incomplete => Json(json!({
      "kind": "bigquery#queryResponse",
      "jobComplete": false
    }))
    .into_response(),
    Behaviour::Evaluate | Behaviour::TokenUnavailable => {
      let parameters = named_parameters(&body);
      let count = state
        .rows
        .iter()
        .filter(|row| row.matches(&parameters))
        .count();

      count_response(json!(count.to_string()))
    }
  }
}

async fn token(headers: HeaderMap, State(state): State<FakeState>) -> Response {
  if headers
    .get("Metadata-Flavor")
    .is_none_or(|value| value != "Google")
  {
    return StatusCode::FORBIDDEN.into_response();
  }

  if state.behaviour == Behaviour::TokenUnavailable {
    return StatusCode::SERVICE_UNAVAILABLE.into_response();
  }

  Json(json!({
    "access_token": SERVICE_ACCOUNT_TOKEN,
    "expires_in": 3599,
    "token_type": "Bearer"
  }))
  .into_response()
}
