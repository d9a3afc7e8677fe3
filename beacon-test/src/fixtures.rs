//! Shared fixture values, built around a single variant in BRCA1.
//!

use serde_json::{Value, json};

use crate::bigquery::FakeRow;

pub const PROJECT_ID: &str = "test-project";
pub const TABLE_ID: &str = "test-project.genomics.alleles";

pub const BRCA1_REFERENCE_NAME: &str = "chr17";
pub const BRCA1_ALLELE: &str = "A";
pub const BRCA1_COORDINATE: i64 = 41196407;

/// The BRCA1 variant, stored as the half-open interval `[41196407, 41196408)`.
pub fn brca1_rows() -> Vec<FakeRow> {
  vec![FakeRow::new(
    BRCA1_REFERENCE_NAME,
    BRCA1_ALLELE,
    BRCA1_COORDINATE,
    BRCA1_COORDINATE + 1,
  )]
}

/// The BRCA1 rows as a JSON array, in the format read by the in-memory backend.
pub fn brca1_rows_json() -> Value {
  json!(brca1_rows())
}
