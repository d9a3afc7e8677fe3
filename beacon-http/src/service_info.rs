use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use beacon_config::config;

use crate::Beacon;
use crate::response::{JSON_CONTENT_TYPE, XML_CONTENT_TYPE};

const BEACON_GROUP: &str = "org.ga4gh";
const BEACON_ARTIFACT: &str = "beacon";
const BEACON_VERSION: &str = "0.3.0";
const QUERY_ENDPOINT: &str = "/query";

/// A struct representing the information that should be present in a service-info response.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
  #[serde(flatten)]
  pub fields: HashMap<String, Value>,
  #[serde(rename = "type")]
  pub service_type: Type,
  pub beacon: BeaconInfo,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
  pub group: String,
  pub artifact: String,
  pub version: String,
}

impl Default for Type {
  fn default() -> Self {
    Self {
      group: BEACON_GROUP.to_string(),
      artifact: BEACON_ARTIFACT.to_string(),
      version: BEACON_VERSION.to_string(),
    }
  }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconInfo {
  pub api_version: String,
  pub dataset_id: String,
  pub query_endpoint: String,
  pub coordinate_required: bool,
  pub response_formats: Vec<String>,
}

impl ServiceInfo {
  pub fn new(beacon: &Beacon, fields: HashMap<String, Value>) -> Self {
    Self {
      fields,
      service_type: Default::default(),
      beacon: BeaconInfo {
        api_version: BEACON_VERSION.to_string(),
        dataset_id: beacon.table().to_string(),
        query_endpoint: QUERY_ENDPOINT.to_string(),
        coordinate_required: beacon.require_coordinate(),
        response_formats: vec![XML_CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()],
      },
    }
  }
}

/// Get the service-info document for the beacon.
#[instrument(level = "debug", skip_all)]
pub fn get_service_info_json(
  beacon: &Beacon,
  config: &config::service_info::ServiceInfo,
) -> ServiceInfo {
  debug!(table = %beacon.table(), "getting service-info response");
  ServiceInfo::new(beacon, config.as_ref().clone())
}
