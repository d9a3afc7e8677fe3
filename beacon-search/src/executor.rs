//! The executor trait, which answers a rendered predicate against a table.
//!

use std::fmt::Debug;

use async_trait::async_trait;

use beacon_config::types::TableId;

use crate::error::Result;
use crate::predicate::Predicate;

/// Answers whether any row of a table satisfies a predicate. Implementations issue at most one
/// lookup per call and never retry.
#[async_trait]
pub trait Executor: Debug + Send + Sync {
  async fn execute(&self, predicate: &Predicate, table: &TableId) -> Result<bool>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Box<E> {
  async fn execute(&self, predicate: &Predicate, table: &TableId) -> Result<bool> {
    (**self).execute(predicate, table).await
  }
}
