//! A backend agnostic representation of the filter applied to the allele table.
//!
//! Every value is carried as a named, typed parameter. Only column names and parameter names
//! ever appear in the rendered clause text.
//!

use std::fmt::{Display, Formatter};

use crate::memory::VariantRow;

/// A column of the allele table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
  ReferenceName,
  ReferenceBases,
  Start,
  End,
}

impl Column {
  /// Get the column name.
  pub fn name(&self) -> &'static str {
    match self {
      Column::ReferenceName => "reference_name",
      Column::ReferenceBases => "reference_bases",
      Column::Start => "start",
      Column::End => "end",
    }
  }

  fn value(&self, row: &VariantRow) -> Value {
    match self {
      Column::ReferenceName => Value::String(row.reference_name.clone()),
      Column::ReferenceBases => Value::String(row.reference_bases.clone()),
      Column::Start => Value::Int64(row.start),
      Column::End => Value::Int64(row.end),
    }
  }
}

impl Display for Column {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "v.{}", self.name())
  }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  String(String),
  Int64(i64),
}

impl Value {
  /// Get the value as an integer, if it is one.
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Value::Int64(value) => Some(*value),
      Value::String(_) => None,
    }
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Value::String(value) => write!(f, "{value}"),
      Value::Int64(value) => write!(f, "{value}"),
    }
  }
}

/// A named parameter, referenced as `@name` in clause text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
  name: &'static str,
  value: Value,
}

impl Parameter {
  /// Create a string parameter.
  pub fn string(name: &'static str, value: impl Into<String>) -> Self {
    Self {
      name,
      value: Value::String(value.into()),
    }
  }

  /// Create an integer parameter.
  pub fn int64(name: &'static str, value: i64) -> Self {
    Self {
      name,
      value: Value::Int64(value),
    }
  }

  /// Get the name.
  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Get the value.
  pub fn value(&self) -> &Value {
    &self.value
  }

  fn placeholder(&self) -> String {
    format!("@{}", self.name)
  }
}

/// A single condition of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
  /// `column = @parameter`.
  Equals { column: Column, parameter: Parameter },
  /// The half-open row interval contains the position: `start <= @parameter AND @parameter < end`.
  Contains { parameter: Parameter },
  /// Inclusive range on a column: `column BETWEEN @lower AND @upper`.
  Between {
    column: Column,
    lower: Parameter,
    upper: Parameter,
  },
}

impl Condition {
  /// Render the clause text.
  pub fn clause(&self) -> String {
    match self {
      Condition::Equals { column, parameter } => format!("{column} = {}", parameter.placeholder()),
      Condition::Contains { parameter } => format!(
        "{} <= {placeholder} AND {placeholder} < {}",
        Column::Start,
        Column::End,
        placeholder = parameter.placeholder()
      ),
      Condition::Between {
        column,
        lower,
        upper,
      } => format!(
        "{column} BETWEEN {} AND {}",
        lower.placeholder(),
        upper.placeholder()
      ),
    }
  }

  /// The parameters bound by this condition, in the order they appear.
  pub fn parameters(&self) -> Vec<&Parameter> {
    match self {
      Condition::Equals { parameter, .. } | Condition::Contains { parameter } => vec![parameter],
      Condition::Between { lower, upper, .. } => vec![lower, upper],
    }
  }

  /// Evaluate the condition against a row.
  pub fn matches(&self, row: &VariantRow) -> bool {
    match self {
      Condition::Equals { column, parameter } => column.value(row) == parameter.value,
      Condition::Contains { parameter } => parameter
        .value
        .as_i64()
        .is_some_and(|position| row.start <= position && position < row.end),
      Condition::Between {
        column,
        lower,
        upper,
      } => match (column.value(row).as_i64(), lower.value.as_i64(), upper.value.as_i64()) {
        (Some(value), Some(lower), Some(upper)) => lower <= value && value <= upper,
        _ => false,
      },
    }
  }
}

/// An ordered conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
  conditions: Vec<Condition>,
}

impl Predicate {
  /// Create a predicate from its conditions.
  pub fn new(conditions: Vec<Condition>) -> Self {
    Self { conditions }
  }

  /// Get the conditions.
  pub fn conditions(&self) -> &[Condition] {
    &self.conditions
  }

  /// Get the clause text of each condition, in order.
  pub fn clauses(&self) -> Vec<String> {
    self.conditions.iter().map(Condition::clause).collect()
  }

  /// Get every bound parameter, in order.
  pub fn parameters(&self) -> Vec<&Parameter> {
    self
      .conditions
      .iter()
      .flat_map(Condition::parameters)
      .collect()
  }

  /// Whether the row satisfies every condition.
  pub fn matches(&self, row: &VariantRow) -> bool {
    self.conditions.iter().all(|condition| condition.matches(row))
  }

  /// Whether there are no conditions.
  pub fn is_empty(&self) -> bool {
    self.conditions.is_empty()
  }
}

impl Display for Predicate {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if self.is_empty() {
      write!(f, "TRUE")
    } else {
      write!(f, "{}", self.clauses().join(" AND "))
    }
  }
}
