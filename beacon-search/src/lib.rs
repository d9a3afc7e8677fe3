//! Validates beacon queries, renders them into parameterised predicates, and answers them
//! against the allele table.
//!

pub use beacon_config::types::TableId;
pub use bigquery::{BigQuery, BigQueryExecutor};
pub use error::{BeaconError, ErrorKind, Result};
pub use executor::Executor;
pub use memory::{InMemoryExecutor, VariantRow};
pub use predicate::{Column, Condition, Parameter, Predicate, Value};
pub use query::{Coordinates, Query};
pub use session::{BearerTokenSession, ServiceAccountSession, Session, SessionProvider};
pub use statement::Statement;

pub mod bigquery;
pub mod error;
pub mod executor;
pub mod memory;
pub mod predicate;
pub mod query;
pub mod session;
pub mod statement;
