//! Test utilities shared by the beacon-rs crates: a fake BigQuery REST server and fixture rows.
//!

pub mod bigquery;
pub mod fixtures;
