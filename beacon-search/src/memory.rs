//! An executor which evaluates predicates against rows held in memory.
//!

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use beacon_config::types::TableId;

use crate::error::{BeaconError, Result};
use crate::executor::Executor;
use crate::predicate::Predicate;

/// A row of the allele table. `start` is inclusive and `end` is exclusive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VariantRow {
  pub reference_name: String,
  pub reference_bases: String,
  pub start: i64,
  pub end: i64,
}

impl VariantRow {
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
}

/// Tables of rows, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExecutor {
  tables: Arc<HashMap<TableId, Vec<VariantRow>>>,
}

impl InMemoryExecutor {
  pub fn new(tables: HashMap<TableId, Vec<VariantRow>>) -> Self {
    Self {
      tables: Arc::new(tables),
    }
  }

  /// An executor holding a single table.
  pub fn with_rows(table: TableId, rows: Vec<VariantRow>) -> Self {
    Self::new(HashMap::from([(table, rows)]))
  }

  /// Load a single table from a JSON array of rows.
  pub async fn from_path(table: TableId, path: &Path) -> Result<Self> {
    let contents = tokio::fs::read(path).await.map_err(|err| {
      BeaconError::connection_error(format!("reading {}: {err}", path.display()))
    })?;
    let rows: Vec<VariantRow> = serde_json::from_slice(&contents).map_err(|err| {
      BeaconError::result_decode_error(format!("decoding {}: {err}", path.display()))
    })?;

    debug!(table = %table, rows = rows.len(), "loaded rows");

    Ok(Self::with_rows(table, rows))
  }

  /// Get the rows of a table.
  pub fn rows(&self, table: &TableId) -> Option<&[VariantRow]> {
    self.tables.get(table).map(Vec::as_slice)
  }
}

#[async_trait]
impl Executor for InMemoryExecutor {
  #[instrument(level = "debug", skip(self), ret)]
  async fn execute(&self, predicate: &Predicate, table: &TableId) -> Result<bool> {
    let rows = self
      .rows(table)
      .ok_or_else(|| BeaconError::query_error(format!("table not found: {table}")))?;

    Ok(rows.iter().any(|row| predicate.matches(row)))
  }
}
