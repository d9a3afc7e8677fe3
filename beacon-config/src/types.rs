//! Types shared by the beacon crates, like the fully-qualified allele table identifier.
//!

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;
use std::{fmt, result};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error::ParseError;
use crate::error::{Error, Result};

static PROJECT_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.:_-]*$").expect("expected valid project id regex")
});

static TABLE_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<project>[A-Za-z0-9][A-Za-z0-9.:_-]*)\.(?P<dataset>\w+)\.(?P<table>[\w-]+)$")
    .expect("expected valid table id regex")
});

/// Check that a cloud project id only contains characters allowed in an identifier. Domain-scoped
/// projects like `example.com:project` are allowed.
pub fn validate_project_id(project_id: &str) -> Result<()> {
  if PROJECT_ID.is_match(project_id) {
    Ok(())
  } else {
    Err(ParseError(format!("invalid project id `{project_id}`")))
  }
}

/// A fully-qualified allele table in the form `project.dataset.table`.
///
/// The components are validated on construction, so the id can be placed into a statement as a
/// quoted identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId {
  project: String,
  dataset: String,
  table: String,
}

impl TableId {
  /// Create a table id from its components.
  pub fn new(
    project: impl Into<String>,
    dataset: impl Into<String>,
    table: impl Into<String>,
  ) -> Result<Self> {
    format!("{}.{}.{}", project.into(), dataset.into(), table.into()).parse()
  }

  /// Get the project.
  pub fn project(&self) -> &str {
    &self.project
  }

  /// Get the dataset.
  pub fn dataset(&self) -> &str {
    &self.dataset
  }

  /// Get the table.
  pub fn table(&self) -> &str {
    &self.table
  }

  /// Get the id quoted with backticks, as used in a `FROM` clause.
  pub fn quoted(&self) -> String {
    format!("`{self}`")
  }
}

impl FromStr for TableId {
  type Err = Error;

  fn from_str(id: &str) -> Result<Self> {
    let captures = TABLE_ID.captures(id).ok_or_else(|| {
      ParseError(format!(
        "invalid table id `{id}`, expected the format `project.dataset.table`"
      ))
    })?;

    Ok(Self {
      project: captures["project"].to_string(),
      dataset: captures["dataset"].to_string(),
      table: captures["table"].to_string(),
    })
  }
}

impl TryFrom<String> for TableId {
  type Error = Error;

  fn try_from(id: String) -> result::Result<Self, Self::Error> {
    id.parse()
  }
}

impl From<TableId> for String {
  fn from(id: TableId) -> Self {
    id.to_string()
  }
}

impl Display for TableId {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_id_components() {
    let id: TableId = "my-project.genomics.alleles".parse().unwrap();

    assert_eq!(id.project(), "my-project");
    assert_eq!(id.dataset(), "genomics");
    assert_eq!(id.table(), "alleles");
  }

  #[test]
  fn table_id_domain_scoped_project() {
    let id: TableId = "example.com:proj.genomics.alleles".parse().unwrap();

    assert_eq!(id.project(), "example.com:proj");
    assert_eq!(id.dataset(), "genomics");
    assert_eq!(id.table(), "alleles");
  }

  #[test]
  fn table_id_quoted() {
    let id = TableId::new("proj", "genomics", "alleles").unwrap();
    assert_eq!(id.quoted(), "`proj.genomics.alleles`");
  }

  #[test]
  fn table_id_missing_component() {
    assert!(matches!(
      "genomics.alleles".parse::<TableId>(),
      Err(ParseError(_))
    ));
  }

  #[test]
  fn table_id_rejects_quotes() {
    assert!("proj.genomics.alleles` WHERE TRUE --".parse::<TableId>().is_err());
    assert!("proj.genomics.alle'les".parse::<TableId>().is_err());
  }

  #[test]
  fn table_id_deserialize() {
    let id: TableId = serde_json::from_str(r#""proj.genomics.alleles""#).unwrap();
    assert_eq!(id.to_string(), "proj.genomics.alleles");
    assert!(serde_json::from_str::<TableId>(r#""alleles""#).is_err());
  }

  #[test]
  fn project_id() {
    assert!(validate_project_id("example.com:proj").is_ok());
    assert!(validate_project_id("proj/../other").is_err());
    assert!(validate_project_id("").is_err());
  }
}
