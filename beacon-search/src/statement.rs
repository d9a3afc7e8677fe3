//! The SQL statement sent to the store.
//!

use beacon_config::types::TableId;

use crate::predicate::{Parameter, Predicate};

/// A parameterised statement: the query text plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
  query: String,
  parameters: Vec<Parameter>,
}

impl Statement {
  /// A single row count of the rows matching the predicate.
  pub fn count(predicate: &Predicate, table: &TableId) -> Self {
    Self {
      query: format!(
        "SELECT count(v.reference_name) AS count FROM {} AS v WHERE {predicate} LIMIT 1",
        table.quoted()
      ),
      parameters: predicate.parameters().into_iter().cloned().collect(),
    }
  }

  /// Get the query text.
  pub fn query(&self) -> &str {
    &self.query
  }

  /// Get the bound parameters.
  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::query::Query;

  #[test]
  fn count_statement() {
    let table = "proj.genomics.alleles".parse().unwrap();
    let statement = Statement::count(
      &Query::new("chr17", "A")
        .with_coordinate(41196407)
        .render_predicate(),
      &table,
    );

    assert_eq!(
      statement.query(),
      "SELECT count(v.reference_name) AS count FROM `proj.genomics.alleles` AS v \
      WHERE v.reference_name = @reference_name AND v.reference_bases = @reference_bases \
      AND v.start <= @coordinate AND @coordinate < v.end LIMIT 1"
    );
    assert_eq!(statement.parameters().len(), 3);
  }

  #[test]
  fn count_statement_without_conditions() {
    let table = "proj.genomics.alleles".parse().unwrap();
    let statement = Statement::count(&Predicate::default(), &table);

    assert!(statement.query().ends_with("WHERE TRUE LIMIT 1"));
    assert!(statement.parameters().is_empty());
  }
}
