use beacon_search::Query;

use crate::error::{HttpError, Result};

/// Builds a [Query] from the loosely typed fields of a request.
#[derive(Debug)]
pub struct QueryBuilder {
  query: Query,
}

impl QueryBuilder {
  /// Start from the reference name and allele. Absent values become empty and are reported
  /// when the query is validated.
  pub fn new(reference_name: Option<String>, allele: Option<String>) -> Self {
    Self {
      query: Query::new(
        reference_name.unwrap_or_default(),
        allele.unwrap_or_default(),
      ),
    }
  }

  pub fn build(self) -> Query {
    self.query
  }

  pub fn with_require_coordinate(mut self, require_coordinate: bool) -> Self {
    self.query = self.query.with_require_coordinate(require_coordinate);
    self
  }

  pub fn with_coordinate(mut self, coordinate: Option<i64>) -> Self {
    if let Some(coordinate) = coordinate {
      self.query = self.query.with_coordinate(coordinate);
    }
    self
  }

  pub fn with_precise(mut self, start: Option<i64>, end: Option<i64>) -> Self {
    if let Some(start) = start {
      self.query = self.query.with_start(start);
    }
    if let Some(end) = end {
      self.query = self.query.with_end(end);
    }
    self
  }

  pub fn with_imprecise(
    mut self,
    (start_min, start_max): (Option<i64>, Option<i64>),
    (end_min, end_max): (Option<i64>, Option<i64>),
  ) -> Self {
    if let Some(start_min) = start_min {
      self.query = self.query.with_start_min(start_min);
    }
    if let Some(start_max) = start_max {
      self.query = self.query.with_start_max(start_max);
    }
    if let Some(end_min) = end_min {
      self.query = self.query.with_end_min(end_min);
    }
    if let Some(end_max) = end_max {
      self.query = self.query.with_end_max(end_max);
    }
    self
  }
}

/// Merge a field with its alias. Both may be given as long as they agree.
pub(crate) fn merge_aliases(
  (name, value): (&str, Option<String>),
  (alias_name, alias): (&str, Option<String>),
) -> Result<Option<String>> {
  match (value, alias) {
    (Some(value), Some(alias)) if value != alias => Err(HttpError::InvalidInput(format!(
      "{name}({value}) and {alias_name}({alias}) disagree"
    ))),
    (value, alias) => Ok(value.or(alias)),
  }
}

/// Parse a position. An empty value counts as absent.
pub(crate) fn parse_position(name: &str, value: Option<&str>) -> Result<Option<i64>> {
  match value {
    None | Some("") => Ok(None),
    Some(value) => value
      .parse::<i64>()
      .map(Some)
      .map_err(|_| HttpError::InvalidInput(format!("{value} isn't a valid {name}"))),
  }
}
