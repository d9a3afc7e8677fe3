//! Configuration of the allele table and how the analytical store is reached.
//!

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error::InvalidConfig;
use crate::error::Result;
use crate::types::{TableId, validate_project_id};

const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com";
const DEFAULT_TOKEN_URL: &str =
  "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Which store answers existence queries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  #[serde(alias = "BigQuery", alias = "BIGQUERY")]
  BigQuery,
  /// Rows loaded from a local JSON file, useful for development.
  #[serde(alias = "Memory", alias = "MEMORY")]
  Memory,
}

/// How requests to the store are authenticated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
  /// Use the credentials of the service account the server runs as.
  #[default]
  #[serde(alias = "Open", alias = "OPEN", alias = "")]
  Open,
  /// Forward the bearer token of the inbound request.
  #[serde(alias = "Auth", alias = "AUTH")]
  Auth,
}

/// Configuration for the allele table lookup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BigQueryConfig {
  backend: Backend,
  #[serde(skip_serializing_if = "Option::is_none")]
  project_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  table_id: Option<TableId>,
  endpoint: String,
  token_url: String,
  timeout_ms: u64,
  auth_mode: AuthMode,
  #[serde(skip_serializing_if = "Option::is_none")]
  data_file: Option<PathBuf>,
}

impl BigQueryConfig {
  /// Create a new config for a BigQuery backed table.
  pub fn new(project_id: impl Into<String>, table_id: TableId, auth_mode: AuthMode) -> Self {
    Self {
      project_id: Some(project_id.into()),
      table_id: Some(table_id),
      auth_mode,
      ..Default::default()
    }
  }

  /// Create a new config for rows served from a local file.
  pub fn new_memory(table_id: TableId, data_file: Option<PathBuf>) -> Self {
    Self {
      backend: Backend::Memory,
      table_id: Some(table_id),
      data_file,
      ..Default::default()
    }
  }

  /// Set the REST endpoint.
  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }

  /// Set the url used to fetch service account tokens.
  pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
    self.token_url = token_url.into();
    self
  }

  /// Set the query timeout in milliseconds.
  pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
    self.timeout_ms = timeout_ms;
    self
  }

  /// Get the backend.
  pub fn backend(&self) -> Backend {
    self.backend
  }

  /// Get the project id that queries are billed to.
  pub fn project_id(&self) -> Option<&str> {
    self.project_id.as_deref()
  }

  /// Get the table id.
  pub fn table_id(&self) -> Option<&TableId> {
    self.table_id.as_ref()
  }

  /// Get the REST endpoint.
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  /// Get the service account token url.
  pub fn token_url(&self) -> &str {
    &self.token_url
  }

  /// Get the timeout.
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  /// Get the auth mode.
  pub fn auth_mode(&self) -> AuthMode {
    self.auth_mode
  }

  /// Get the data file for the memory backend.
  pub fn data_file(&self) -> Option<&Path> {
    self.data_file.as_deref()
  }

  /// Check that the mandatory values for the selected backend are present.
  pub fn validate(&self) -> Result<()> {
    if self.table_id.is_none() {
      return Err(InvalidConfig("validating table_id: value is mandatory".to_string()));
    }

    if self.backend == Backend::BigQuery {
      let project_id = self
        .project_id
        .as_deref()
        .filter(|project_id| !project_id.is_empty())
        .ok_or_else(|| InvalidConfig("validating project_id: value is mandatory".to_string()))?;
      validate_project_id(project_id)
        .map_err(|err| InvalidConfig(format!("validating project_id: {err}")))?;
    }

    if self.timeout_ms == 0 {
      return Err(InvalidConfig(
        "validating timeout_ms: value must be greater than zero".to_string(),
      ));
    }

    Ok(())
  }
}

impl Default for BigQueryConfig {
  fn default() -> Self {
    Self {
      backend: Default::default(),
      project_id: None,
      table_id: None,
      endpoint: DEFAULT_ENDPOINT.to_string(),
      token_url: DEFAULT_TOKEN_URL.to_string(),
      timeout_ms: DEFAULT_TIMEOUT_MS,
      auth_mode: Default::default(),
      data_file: None,
    }
  }
}
