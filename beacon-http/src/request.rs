use std::collections::HashMap;

use http::HeaderMap;

/// The parts of an inbound request the beacon looks at.
#[derive(Debug, Clone, Default)]
pub struct Request {
  query: HashMap<String, String>,
  headers: HeaderMap,
}

impl Request {
  pub fn new(query: HashMap<String, String>, headers: HeaderMap) -> Self {
    Self { query, headers }
  }

  /// Get the query parameters.
  pub fn query(&self) -> &HashMap<String, String> {
    &self.query
  }

  /// Get the headers.
  pub fn headers(&self) -> &HeaderMap {
    &self.headers
  }
}
