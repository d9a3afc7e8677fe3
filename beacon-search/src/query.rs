//! The query object describing one existence check.
//!

use tracing::{debug, instrument};

use beacon_config::types::TableId;

use crate::error::{BeaconError, Result};
use crate::executor::Executor;
use crate::predicate::{Column, Condition, Parameter, Predicate};

/// The coordinate part of a query, resolved into exactly one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinates {
  /// No coordinate was given.
  Absent,
  /// A single position which must fall inside the half-open row interval.
  Point(i64),
  /// An exact start, and optionally an exact end.
  Exact { start: i64, end: Option<i64> },
  /// Inclusive bounds on the start and on the end.
  Range {
    start_min: i64,
    start_max: i64,
    end_min: i64,
    end_max: i64,
  },
}

/// A query for the existence of a variant. Fields are set through the `with_*` builder
/// methods and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  reference_name: String,
  allele: String,
  coordinate: Option<i64>,
  start: Option<i64>,
  end: Option<i64>,
  start_min: Option<i64>,
  start_max: Option<i64>,
  end_min: Option<i64>,
  end_max: Option<i64>,
  require_coordinate: bool,
}

impl Query {
  pub fn new(reference_name: impl Into<String>, allele: impl Into<String>) -> Self {
    Self {
      reference_name: reference_name.into(),
      allele: allele.into(),
      coordinate: None,
      start: None,
      end: None,
      start_min: None,
      start_max: None,
      end_min: None,
      end_max: None,
      require_coordinate: true,
    }
  }

  pub fn with_coordinate(mut self, coordinate: i64) -> Self {
    self.coordinate = Some(coordinate);
    self
  }

  pub fn with_start(mut self, start: i64) -> Self {
    self.start = Some(start);
    self
  }

  pub fn with_end(mut self, end: i64) -> Self {
    self.end = Some(end);
    self
  }

  pub fn with_start_min(mut self, start_min: i64) -> Self {
    self.start_min = Some(start_min);
    self
  }

  pub fn with_start_max(mut self, start_max: i64) -> Self {
    self.start_max = Some(start_max);
    self
  }

  pub fn with_end_min(mut self, end_min: i64) -> Self {
    self.end_min = Some(end_min);
    self
  }

  pub fn with_end_max(mut self, end_max: i64) -> Self {
    self.end_max = Some(end_max);
    self
  }

  /// Set whether a query without any coordinate is rejected. Defaults to true.
  pub fn with_require_coordinate(mut self, require_coordinate: bool) -> Self {
    self.require_coordinate = require_coordinate;
    self
  }

  pub fn reference_name(&self) -> &str {
    &self.reference_name
  }

  pub fn allele(&self) -> &str {
    &self.allele
  }

  pub fn coordinate(&self) -> Option<i64> {
    self.coordinate
  }

  pub fn start(&self) -> Option<i64> {
    self.start
  }

  pub fn end(&self) -> Option<i64> {
    self.end
  }

  pub fn start_min(&self) -> Option<i64> {
    self.start_min
  }

  pub fn start_max(&self) -> Option<i64> {
    self.start_max
  }

  pub fn end_min(&self) -> Option<i64> {
    self.end_min
  }

  pub fn end_max(&self) -> Option<i64> {
    self.end_max
  }

  pub fn require_coordinate(&self) -> bool {
    self.require_coordinate
  }

  /// Resolve the coordinate fields into a single mode, failing if fields of several modes are
  /// set, if a mode is incomplete, or if the bounds are inconsistent.
  pub fn coordinates(&self) -> Result<Coordinates> {
    let range = [self.start_min, self.start_max, self.end_min, self.end_max];

    let single = self.coordinate.is_some();
    let precise = self.start.is_some() || self.end.is_some();
    let imprecise = range.iter().any(Option::is_some);

    if [single, precise, imprecise]
      .into_iter()
      .filter(|populated| *populated)
      .count()
      > 1
    {
      return Err(BeaconError::invalid_coordinate_spec(
        "coordinate, start/end and startMin/startMax/endMin/endMax cannot be combined",
      ));
    }

    [
      ("coordinate", self.coordinate),
      ("start", self.start),
      ("end", self.end),
      ("startMin", self.start_min),
      ("startMax", self.start_max),
      ("endMin", self.end_min),
      ("endMax", self.end_max),
    ]
    .into_iter()
    .try_for_each(|(name, value)| match value {
      Some(value) if value < 0 => Err(BeaconError::invalid_coordinate_spec(format!(
        "{name} must not be negative, got {value}"
      ))),
      _ => Ok(()),
    })?;

    if let Some(coordinate) = self.coordinate {
      return Ok(Coordinates::Point(coordinate));
    }

    if precise {
      let start = self
        .start
        .ok_or_else(|| BeaconError::invalid_coordinate_spec("end requires start"))?;
      return match self.end {
        Some(end) if start > end => Err(BeaconError::invalid_coordinate_spec(format!(
          "start({start}) is greater than end({end})"
        ))),
        end => Ok(Coordinates::Exact { start, end }),
      };
    }

    if imprecise {
      let [Some(start_min), Some(start_max), Some(end_min), Some(end_max)] = range else {
        return Err(BeaconError::invalid_coordinate_spec(
          "startMin, startMax, endMin and endMax must be given together",
        ));
      };

      if start_min > start_max {
        return Err(BeaconError::invalid_coordinate_spec(format!(
          "startMin({start_min}) is greater than startMax({start_max})"
        )));
      }
      if end_min > end_max {
        return Err(BeaconError::invalid_coordinate_spec(format!(
          "endMin({end_min}) is greater than endMax({end_max})"
        )));
      }

      return Ok(Coordinates::Range {
        start_min,
        start_max,
        end_min,
        end_max,
      });
    }

    Ok(Coordinates::Absent)
  }

  /// Check that the query can be rendered. Missing required fields are reported before any
  /// problem with the coordinates.
  pub fn validate(&self) -> Result<()> {
    if self.reference_name.is_empty() {
      return Err(BeaconError::missing_field("referenceName"));
    }
    if self.allele.is_empty() {
      return Err(BeaconError::missing_field("allele"));
    }

    match self.coordinates()? {
      Coordinates::Absent if self.require_coordinate => Err(
        BeaconError::invalid_coordinate_spec("a coordinate, start or range is required"),
      ),
      _ => Ok(()),
    }
  }

  /// Render the filter for this query. Conditions are ordered reference name, allele, then
  /// coordinate. Empty fields and unresolvable coordinates contribute no condition, so this
  /// should only be relied on after `validate`.
  pub fn render_predicate(&self) -> Predicate {
    let mut conditions = Vec::new();

    if !self.reference_name.is_empty() {
      conditions.push(Condition::Equals {
        column: Column::ReferenceName,
        parameter: Parameter::string("reference_name", &self.reference_name),
      });
    }
    if !self.allele.is_empty() {
      conditions.push(Condition::Equals {
        column: Column::ReferenceBases,
        parameter: Parameter::string("reference_bases", &self.allele),
      });
    }

    match self.coordinates() {
      Ok(Coordinates::Point(coordinate)) => conditions.push(Condition::Contains {
        parameter: Parameter::int64("coordinate", coordinate),
      }),
      Ok(Coordinates::Exact { start, end }) => {
        conditions.push(Condition::Equals {
          column: Column::Start,
          parameter: Parameter::int64("start", start),
        });
        if let Some(end) = end {
          conditions.push(Condition::Equals {
            column: Column::End,
            parameter: Parameter::int64("end", end),
          });
        }
      }
      Ok(Coordinates::Range {
        start_min,
        start_max,
        end_min,
        end_max,
      }) => {
        conditions.push(Condition::Between {
          column: Column::Start,
          lower: Parameter::int64("start_min", start_min),
          upper: Parameter::int64("start_max", start_max),
        });
        conditions.push(Condition::Between {
          column: Column::End,
          lower: Parameter::int64("end_min", end_min),
          upper: Parameter::int64("end_max", end_max),
        });
      }
      Ok(Coordinates::Absent) | Err(_) => {}
    }

    Predicate::new(conditions)
  }

  /// Validate the query, then ask the executor whether any row of the table matches it.
  #[instrument(level = "debug", skip(executor), ret)]
  pub async fn execute<E>(&self, executor: &E, table: &TableId) -> Result<bool>
  where
    E: Executor + ?Sized,
  {
    self.validate()?;

    let predicate = self.render_predicate();
    debug!(%predicate, "executing query");

    executor.execute(&predicate, table).await
  }
}

#[cfg(test)]
mod tests {
  use beacon_test::fixtures::{BRCA1_ALLELE, BRCA1_COORDINATE, BRCA1_REFERENCE_NAME};

  use super::*;
  use crate::memory::{InMemoryExecutor, VariantRow};

  fn table() -> TableId {
    "proj.genomics.alleles".parse().unwrap()
  }

  fn brca1_query() -> Query {
    Query::new(BRCA1_REFERENCE_NAME, BRCA1_ALLELE).with_coordinate(BRCA1_COORDINATE)
  }

  fn executor(rows: Vec<VariantRow>) -> InMemoryExecutor {
    InMemoryExecutor::with_rows(table(), rows)
  }

  fn range_query() -> Query {
    Query::new("chr1", "G")
      .with_start_min(100)
      .with_start_max(200)
      .with_end_min(150)
      .with_end_max(250)
  }

  #[test]
  fn missing_reference_name() {
    assert_eq!(
      Query::new("", "A").with_coordinate(1).validate(),
      Err(BeaconError::missing_field("referenceName"))
    );
  }

  #[test]
  fn missing_allele() {
    assert_eq!(
      Query::new("chr1", "").with_coordinate(1).validate(),
      Err(BeaconError::missing_field("allele"))
    );
  }

  #[test]
  fn missing_field_takes_precedence_over_coordinates() {
    let queries = [
      Query::new("", "A").with_start(1).with_start_min(1),
      Query::new("chr1", "").with_end(1),
      Query::new("", ""),
      Query::new("", "A").with_coordinate(-1),
    ];

    for query in queries {
      assert!(matches!(query.validate(), Err(BeaconError::MissingField(_))));
    }
  }

  #[test]
  fn precise_and_imprecise_together() {
    let queries = [
      Query::new("chr1", "A").with_start(1).with_start_min(1),
      Query::new("chr1", "A").with_end(5).with_end_max(5),
      range_query().with_start(150),
      Query::new("chr1", "A").with_coordinate(1).with_start(1),
      Query::new("chr1", "A").with_coordinate(1).with_end_min(1),
    ];

    for query in queries {
      assert!(matches!(
        query.validate(),
        Err(BeaconError::InvalidCoordinateSpec(_))
      ));
    }
  }

  #[test]
  fn end_without_start() {
    assert!(matches!(
      Query::new("chr1", "A").with_end(10).validate(),
      Err(BeaconError::InvalidCoordinateSpec(_))
    ));
  }

  #[test]
  fn partial_range() {
    assert!(matches!(
      Query::new("chr1", "A")
        .with_start_min(1)
        .with_start_max(2)
        .with_end_min(3)
        .validate(),
      Err(BeaconError::InvalidCoordinateSpec(_))
    ));
  }

  #[test]
  fn inverted_bounds() {
    let queries = [
      Query::new("chr1", "A").with_start(10).with_end(9),
      Query::new("chr1", "A")
        .with_start_min(200)
        .with_start_max(100)
        .with_end_min(150)
        .with_end_max(250),
      Query::new("chr1", "A")
        .with_start_min(100)
        .with_start_max(200)
        .with_end_min(250)
        .with_end_max(150),
    ];

    for query in queries {
      assert!(matches!(
        query.validate(),
        Err(BeaconError::InvalidCoordinateSpec(_))
      ));
    }
  }

  #[test]
  fn negative_coordinate() {
    assert!(matches!(
      Query::new("chr1", "A").with_coordinate(-1).validate(),
      Err(BeaconError::InvalidCoordinateSpec(_))
    ));
  }

  #[test]
  fn absent_coordinate() {
    assert!(matches!(
      Query::new("chr1", "A").validate(),
      Err(BeaconError::InvalidCoordinateSpec(_))
    ));
    assert_eq!(
      Query::new("chr1", "A")
        .with_require_coordinate(false)
        .validate(),
      Ok(())
    );
  }

  #[test]
  fn valid_modes() {
    assert_eq!(brca1_query().validate(), Ok(()));
    assert_eq!(Query::new("chr1", "A").with_start(5).validate(), Ok(()));
    assert_eq!(
      Query::new("chr1", "A").with_start(5).with_end(6).validate(),
      Ok(())
    );
    assert_eq!(range_query().validate(), Ok(()));
  }

  #[test]
  fn render_single_coordinate() {
    let predicate = brca1_query().render_predicate();

    assert_eq!(
      predicate.clauses(),
      vec![
        "v.reference_name = @reference_name",
        "v.reference_bases = @reference_bases",
        "v.start <= @coordinate AND @coordinate < v.end",
      ]
    );
    assert_eq!(
      predicate.parameters(),
      vec![
        &Parameter::string("reference_name", BRCA1_REFERENCE_NAME),
        &Parameter::string("reference_bases", BRCA1_ALLELE),
        &Parameter::int64("coordinate", BRCA1_COORDINATE),
      ]
    );
  }

  #[test]
  fn render_precise_start() {
    let predicate = Query::new("chr1", "A").with_start(5).render_predicate();

    assert_eq!(predicate.clauses()[2], "v.start = @start");
    assert_eq!(predicate.conditions().len(), 3);
  }

  #[test]
  fn render_precise_start_and_end() {
    let predicate = Query::new("chr1", "A")
      .with_start(5)
      .with_end(6)
      .render_predicate();

    assert_eq!(
      predicate.to_string(),
      "v.reference_name = @reference_name AND v.reference_bases = @reference_bases \
      AND v.start = @start AND v.end = @end"
    );
  }

  #[test]
  fn render_range() {
    let predicate = range_query().render_predicate();

    assert_eq!(
      &predicate.clauses()[2..],
      &[
        "v.start BETWEEN @start_min AND @start_max".to_string(),
        "v.end BETWEEN @end_min AND @end_max".to_string(),
      ]
    );
  }

  #[test]
  fn render_skips_empty_fields() {
    let predicate = Query::new("", "A")
      .with_require_coordinate(false)
      .render_predicate();

    assert_eq!(predicate.clauses(), vec!["v.reference_bases = @reference_bases"]);
  }

  #[test]
  fn render_is_idempotent() {
    for query in [
      brca1_query(),
      range_query(),
      Query::new("chr1", "A").with_start(5).with_end(6),
    ] {
      assert_eq!(query.render_predicate(), query.render_predicate());
      assert_eq!(
        query.render_predicate().to_string(),
        query.render_predicate().to_string()
      );
    }
  }

  #[test]
  fn single_coordinate_is_half_open() {
    let predicate = Query::new("chr1", "A").with_coordinate(100).render_predicate();

    assert!(predicate.matches(&VariantRow::new("chr1", "A", 100, 101)));
    assert!(!predicate.matches(&VariantRow::new("chr1", "A", 101, 102)));
    assert!(!predicate.matches(&VariantRow::new("chr1", "A", 99, 100)));
  }

  #[test]
  fn precise_start_and_end_is_exact() {
    let predicate = Query::new("chr1", "A")
      .with_start(100)
      .with_end(105)
      .render_predicate();

    assert!(predicate.matches(&VariantRow::new("chr1", "A", 100, 105)));
    assert!(!predicate.matches(&VariantRow::new("chr1", "A", 99, 106)));
    assert!(!predicate.matches(&VariantRow::new("chr1", "A", 100, 104)));
  }

  #[test]
  fn range_matches() {
    let predicate = range_query().render_predicate();

    assert!(predicate.matches(&VariantRow::new("chr1", "G", 120, 180)));
    assert!(!predicate.matches(&VariantRow::new("chr1", "G", 120, 300)));
  }

  #[tokio::test]
  async fn execute_brca1() {
    let executor = executor(vec![VariantRow::new(
      BRCA1_REFERENCE_NAME,
      BRCA1_ALLELE,
      BRCA1_COORDINATE,
      BRCA1_COORDINATE + 1,
    )]);

    assert_eq!(brca1_query().execute(&executor, &table()).await, Ok(true));
  }

  #[tokio::test]
  async fn execute_other_allele() {
    let executor = executor(vec![VariantRow::new(
      BRCA1_REFERENCE_NAME,
      "T",
      BRCA1_COORDINATE,
      BRCA1_COORDINATE + 1,
    )]);

    assert_eq!(brca1_query().execute(&executor, &table()).await, Ok(false));
  }

  #[tokio::test]
  async fn execute_validates_first() {
    let executor = executor(vec![]);

    assert_eq!(
      Query::new("", "A")
        .with_coordinate(1)
        .execute(&executor, &"other.genomics.alleles".parse().unwrap())
        .await,
      Err(BeaconError::missing_field("referenceName"))
    );
  }
}
