//! The configured store a beacon answers queries from.
//!

use std::sync::Arc;

use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt};
use http::HeaderMap;
use tracing::{debug, instrument};

use beacon_config::config::Config;
use beacon_config::config::bigquery::{AuthMode, Backend as ConfigBackend};
use beacon_search::{
  BearerTokenSession, BigQuery, Executor, InMemoryExecutor, ServiceAccountSession, TableId,
};

use crate::{HttpError, Result};

/// Where queries are answered.
#[derive(Debug, Clone)]
pub enum Backend {
  /// The BigQuery REST API, authenticated according to the auth mode.
  BigQuery {
    bigquery: BigQuery,
    auth_mode: AuthMode,
    service_account: Arc<ServiceAccountSession>,
  },
  /// Rows held in memory.
  Memory(InMemoryExecutor),
}

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct Beacon {
  backend: Backend,
  table: TableId,
  require_coordinate: bool,
}

impl Beacon {
  pub fn new(backend: Backend, table: TableId, require_coordinate: bool) -> Self {
    Self {
      backend,
      table,
      require_coordinate,
    }
  }

  /// Build the beacon described by the config, loading rows for the memory backend.
  pub async fn from_config(config: &Config) -> Result<Self> {
    let bigquery_config = config.bigquery();
    let table = bigquery_config
      .table_id()
      .cloned()
      .ok_or_else(|| HttpError::InternalError("table id is not configured".to_string()))?;

    let backend = match bigquery_config.backend() {
      ConfigBackend::BigQuery => Backend::BigQuery {
        bigquery: BigQuery::from_config(bigquery_config)?,
        auth_mode: bigquery_config.auth_mode(),
        service_account: Arc::new(ServiceAccountSession::new(bigquery_config.token_url())),
      },
      ConfigBackend::Memory => Backend::Memory(match bigquery_config.data_file() {
        Some(path) => InMemoryExecutor::from_path(table.clone(), path).await?,
        None => InMemoryExecutor::with_rows(table.clone(), vec![]),
      }),
    };

    debug!(backend = ?bigquery_config.backend(), table = %table, "beacon created");

    Ok(Self::new(
      backend,
      table,
      config.query().require_coordinate(),
    ))
  }

  /// Get an executor for one request. In `auth` mode the request must carry a bearer token,
  /// which is forwarded to the store.
  #[instrument(level = "debug", skip_all)]
  pub fn executor(&self, headers: &HeaderMap) -> Result<Box<dyn Executor>> {
    match &self.backend {
      Backend::Memory(executor) => Ok(Box::new(executor.clone())),
      Backend::BigQuery {
        bigquery,
        auth_mode: AuthMode::Open,
        service_account,
      } => Ok(Box::new(bigquery.executor(service_account.clone()))),
      Backend::BigQuery {
        bigquery,
        auth_mode: AuthMode::Auth,
        ..
      } => {
        let token = headers
          .typed_get::<Authorization<Bearer>>()
          .ok_or_else(|| {
            HttpError::InvalidAuthentication("missing or invalid bearer token".to_string())
          })?;

        Ok(Box::new(bigquery.executor(Arc::new(BearerTokenSession::new(
          token.token(),
        )))))
      }
    }
  }

  /// Get the backend.
  pub fn backend(&self) -> &Backend {
    &self.backend
  }

  /// Get the table queries are answered from.
  pub fn table(&self) -> &TableId {
    &self.table
  }

  /// Whether queries must carry a coordinate.
  pub fn require_coordinate(&self) -> bool {
    self.require_coordinate
  }
}
