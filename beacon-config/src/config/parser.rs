//! Parse config for a file and environment variables.
//!

use crate::config::Config;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Deserialize;
use std::fmt::Debug;
use std::io;
use std::path::Path;
use tracing::info;

const ENVIRONMENT_VARIABLE_PREFIX: &str = "BEACON_";

/// Variables used by existing App Engine deployments, mapped onto their config keys.
const LEGACY_ENVIRONMENT_VARIABLES: [(&str, &str); 2] = [
  ("google_cloud_project", "bigquery.project_id"),
  ("google_bigquery_table", "bigquery.table_id"),
];

/// Map a legacy variable onto its nested key.
fn legacy_key(key: &str) -> String {
  let key = key.to_lowercase();
  LEGACY_ENVIRONMENT_VARIABLES
    .iter()
    .find(|(variable, _)| *variable == key)
    .map(|(_, mapped)| mapped.to_string())
    .unwrap_or(key)
}

/// Map a flat environment variable key onto a nested config key. This has to list all the
/// nested sections to avoid ambiguity, e.g. see https://github.com/SergioBenitez/Figment/issues/12
fn map_key(key: &str) -> String {
  let key = key.to_lowercase();

  if key == "auth_mode" {
    return "bigquery.auth_mode".to_string();
  }

  if let Some(rest) = key.strip_prefix("server_") {
    return match rest.strip_prefix("cors_") {
      Some(cors) => format!("server.cors.{cors}"),
      None => format!("server.{rest}"),
    };
  }

  for section in ["bigquery", "query", "service_info"] {
    if let Some(rest) = key.strip_prefix(&format!("{section}_")) {
      return format!("{section}.{rest}");
    }
  }

  key
}

/// Read a deserializable config struct from a TOML file, merging environment variables on top
/// of it using Figment.
pub fn from_path<T>(path: &Path) -> io::Result<T>
where
  for<'de> T: Deserialize<'de> + Debug,
{
  let config = Figment::from(Serialized::defaults(Config::default()))
    .merge(Toml::file(path))
    .merge(
      Env::raw()
        .only(&LEGACY_ENVIRONMENT_VARIABLES.map(|(variable, _)| variable))
        .map(|k| legacy_key(k.as_str()).into()),
    )
    .merge(
      Env::prefixed(ENVIRONMENT_VARIABLE_PREFIX)
        .filter(|k| k != "config")
        .map(|k| map_key(k.as_str()).into()),
    )
    .extract()
    .map_err(|err| io::Error::other(format!("failed to parse config: {err}")))?;

  info!(config = ?config, "config created");

  Ok(config)
}
