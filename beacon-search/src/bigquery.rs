//! An executor which runs the count statement through the BigQuery REST API.
//!

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument, warn};

use beacon_config::config::bigquery::BigQueryConfig;
use beacon_config::types::TableId;

use crate::error::{BeaconError, Result};
use crate::executor::Executor;
use crate::predicate::{Parameter, Predicate, Value};
use crate::session::SessionProvider;
use crate::statement::Statement;

const CONTEXT: &str = "querying database";

/// A handle to the BigQuery API of one billing project. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BigQuery {
  client: Client,
  endpoint: String,
  project_id: String,
  timeout: Duration,
}

impl BigQuery {
  /// Create a handle, building a client bounded by the timeout.
  pub fn new(
    endpoint: impl Into<String>,
    project_id: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    Ok(Self {
      client: ClientBuilder::new()
        .timeout(timeout)
        .build()
        .map_err(|err| {
          BeaconError::connection_error(format!("failed to build reqwest client: {err}"))
        })?,
      endpoint: endpoint.into(),
      project_id: project_id.into(),
      timeout,
    })
  }

  /// Create a handle from the config. The project id must be set.
  pub fn from_config(config: &BigQueryConfig) -> Result<Self> {
    let project_id = config
      .project_id()
      .ok_or_else(|| BeaconError::connection_error("project id is not configured"))?;

    Self::new(config.endpoint(), project_id, config.timeout())
  }

  /// An executor using this handle, authenticated by the session provider.
  pub fn executor(&self, sessions: Arc<dyn SessionProvider>) -> BigQueryExecutor {
    BigQueryExecutor {
      bigquery: self.clone(),
      sessions,
    }
  }

  /// Get the project id.
  pub fn project_id(&self) -> &str {
    &self.project_id
  }

  fn queries_url(&self) -> String {
    format!(
      "{}/bigquery/v2/projects/{}/queries",
      self.endpoint.trim_end_matches('/'),
      self.project_id
    )
  }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
  query: &'a str,
  use_legacy_sql: bool,
  parameter_mode: &'static str,
  query_parameters: Vec<QueryParameter<'a>>,
  timeout_ms: u64,
}

impl<'a> QueryRequest<'a> {
  fn new(statement: &'a Statement, timeout: Duration) -> Self {
    Self {
      query: statement.query(),
      use_legacy_sql: false,
      parameter_mode: "NAMED",
      query_parameters: statement.parameters().iter().map(QueryParameter::from).collect(),
      timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
    }
  }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QueryParameter<'a> {
  name: &'a str,
  parameter_type: ParameterType,
  parameter_value: ParameterValue,
}

#[derive(Serialize, Debug)]
struct ParameterType {
  #[serde(rename = "type")]
  parameter_type: &'static str,
}

#[derive(Serialize, Debug)]
struct ParameterValue {
  value: String,
}

impl<'a> From<&'a Parameter> for QueryParameter<'a> {
  fn from(parameter: &'a Parameter) -> Self {
    let parameter_type = match parameter.value() {
      Value::String(_) => "STRING",
      Value::Int64(_) => "INT64",
    };

    Self {
      name: parameter.name(),
      parameter_type: ParameterType { parameter_type },
      parameter_value: ParameterValue {
        value: parameter.value().to_string(),
      },
    }
  }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
  job_complete: Option<bool>,
  rows: Option<Vec<Row>>,
  #[serde(default)]
  errors: Vec<ErrorProto>,
}

#[derive(Deserialize, Debug)]
struct Row {
  f: Vec<Cell>,
}

#[derive(Deserialize, Debug)]
struct Cell {
  v: JsonValue,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
  error: ErrorProto,
}

#[derive(Deserialize, Debug)]
struct ErrorProto {
  message: String,
}

impl QueryResponse {
  /// Decode the single count cell.
  fn count(self) -> Result<i64> {
    if self.job_complete == Some(false) {
      return Err(BeaconError::result_decode_error(
        "job did not complete within the timeout",
      ));
    }

    let Some(rows) = self.rows else {
      return match self.errors.into_iter().next() {
        Some(error) => Err(BeaconError::query_error(error.message)),
        None => Err(BeaconError::result_decode_error("response has no rows")),
      };
    };

    let [Row { f: cells }] = rows.as_slice() else {
      return Err(BeaconError::result_decode_error(format!(
        "expected one row, got {}",
        rows.len()
      )));
    };
    let [Cell { v: count }] = cells.as_slice() else {
      return Err(BeaconError::result_decode_error(format!(
        "expected one column, got {}",
        cells.len()
      )));
    };

    match count {
      JsonValue::String(count) => count.parse::<i64>().ok(),
      JsonValue::Number(count) => count.as_i64(),
      _ => None,
    }
    .ok_or_else(|| BeaconError::result_decode_error(format!("invalid count: {count}")))
  }
}

/// Runs statements with a session acquired for each call.
#[derive(Debug, Clone)]
pub struct BigQueryExecutor {
  bigquery: BigQuery,
  sessions: Arc<dyn SessionProvider>,
}

impl BigQueryExecutor {
  async fn send(&self, statement: &Statement) -> Result<i64> {
    let session = self.sessions.session(&self.bigquery.client).await?;

    let response = session
      .authorize(self.bigquery.client.post(self.bigquery.queries_url()))
      .json(&QueryRequest::new(statement, self.bigquery.timeout))
      .send()
      .await
      .map_err(|err| BeaconError::connection_error(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let message = match response.json::<ErrorResponse>().await {
        Ok(body) => format!("{status}: {}", body.error.message),
        Err(_) => status.to_string(),
      };

      return Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
          BeaconError::connection_error(message)
        }
        _ => BeaconError::query_error(message),
      });
    }

    response
      .json::<QueryResponse>()
      .await
      .map_err(|err| BeaconError::result_decode_error(err.to_string()))?
      .count()
  }
}

#[async_trait]
impl Executor for BigQueryExecutor {
  #[instrument(level = "debug", skip(self), ret)]
  async fn execute(&self, predicate: &Predicate, table: &TableId) -> Result<bool> {
    let statement = Statement::count(predicate, table);
    debug!(query = statement.query(), "sending statement");

    let count = self.send(&statement).await.map_err(|err| {
      let err = err.with_context(CONTEXT);
      warn!(error = %err, "lookup failed");
      err
    })?;

    Ok(count > 0)
  }
}
