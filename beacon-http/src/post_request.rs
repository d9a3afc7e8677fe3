use beacon_search::Query;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::Result;
use crate::query_builder::{QueryBuilder, merge_aliases};

/// The JSON body of a POST query. Field names and their aliases match the query parameters of
/// a GET query.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostRequest {
  pub reference_name: Option<String>,
  pub chromosome: Option<String>,
  pub reference_bases: Option<String>,
  pub allele: Option<String>,
  pub coordinate: Option<i64>,
  pub start: Option<i64>,
  pub end: Option<i64>,
  pub start_min: Option<i64>,
  pub start_max: Option<i64>,
  pub end_min: Option<i64>,
  pub end_max: Option<i64>,
}

impl PostRequest {
  /// Converts the `PostRequest` into a [Query].
  #[instrument(level = "trace", skip_all, ret)]
  pub(crate) fn get_query(self, require_coordinate: bool) -> Result<Query> {
    Ok(
      QueryBuilder::new(
        merge_aliases(
          ("referenceName", self.reference_name),
          ("chromosome", self.chromosome),
        )?,
        merge_aliases(
          ("referenceBases", self.reference_bases),
          ("allele", self.allele),
        )?,
      )
      .with_require_coordinate(require_coordinate)
      .with_coordinate(self.coordinate)
      .with_precise(self.start, self.end)
      .with_imprecise(
        (self.start_min, self.start_max),
        (self.end_min, self.end_max),
      )
      .build(),
    )
  }
}
