//! Service info configuration.
//!

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Service info config. These are free-form fields that are added to the service-info response.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceInfo(HashMap<String, Value>);

impl ServiceInfo {
  /// Create a service info.
  pub fn new(fields: HashMap<String, Value>) -> Self {
    Self(fields)
  }

  /// Get the inner value.
  pub fn into_inner(self) -> HashMap<String, Value> {
    self.0
  }
}

impl AsRef<HashMap<String, Value>> for ServiceInfo {
  fn as_ref(&self) -> &HashMap<String, Value> {
    &self.0
  }
}

impl<'de> Deserialize<'de> for ServiceInfo {
  fn deserialize<D>(deserializer: D) -> Result<ServiceInfo, D::Error>
  where
    D: Deserializer<'de>,
  {
    let fields: HashMap<String, Value> = HashMap::<String, Value>::deserialize(deserializer)?
      .into_iter()
      .map(|(key, value)| (key.to_lowercase(), value))
      .collect();

    for reserved in ["type", "beacon"] {
      if fields.contains_key(reserved) {
        return Err(Error::custom(format!(
          "reserved service info field `{reserved}`"
        )));
      }
    }

    Ok(ServiceInfo::new(fields))
  }
}
