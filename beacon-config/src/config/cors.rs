//! Browser access to the beacon.
//!
//! The beacon only serves `GET`, `POST` and `OPTIONS`, so the configurable part of CORS is which
//! origins may read responses, whether credentials are sent, and how long a preflight is cached.
//!

use http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::Error::InvalidConfig;
use crate::error::Result;

/// A preflight is cached for a day unless configured otherwise.
const DEFAULT_MAX_AGE: u64 = 86400;

/// The origins allowed to call the beacon from a browser.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "OriginsValue", into = "OriginsValue")]
pub enum AllowOrigins {
  /// Echo the request origin back, allowing any origin.
  Mirror,
  /// Answer with `*`. This cannot be combined with credentials.
  Any,
  /// Only these origins.
  List(Vec<HeaderValue>),
}

/// How origins are written in config: `"mirror"`, `"any"`, or a list of origins.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OriginsValue {
  Keyword(String),
  List(Vec<String>),
}

impl TryFrom<OriginsValue> for AllowOrigins {
  type Error = String;

  fn try_from(value: OriginsValue) -> std::result::Result<Self, Self::Error> {
    match value {
      OriginsValue::Keyword(keyword) => match keyword.to_lowercase().as_str() {
        "mirror" => Ok(Self::Mirror),
        "any" | "all" => Ok(Self::Any),
        _ => Err(format!(
          "expected `mirror`, `any` or a list of origins, got `{keyword}`"
        )),
      },
      OriginsValue::List(origins) => origins
        .iter()
        .map(|origin| match origin.as_str() {
          "*" => Err("use `any` instead of `*` to allow every origin".to_string()),
          _ => HeaderValue::from_str(origin)
            .map_err(|err| format!("invalid origin `{origin}`: {err}")),
        })
        .collect::<std::result::Result<_, _>>()
        .map(Self::List),
    }
  }
}

impl From<AllowOrigins> for OriginsValue {
  fn from(origins: AllowOrigins) -> Self {
    match origins {
      AllowOrigins::Mirror => Self::Keyword("mirror".to_string()),
      AllowOrigins::Any => Self::Keyword("any".to_string()),
      AllowOrigins::List(origins) => Self::List(
        origins
          .iter()
          .map(|origin| String::from_utf8_lossy(origin.as_bytes()).into_owned())
          .collect(),
      ),
    }
  }
}

/// Cors configuration for the beacon server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
  allow_origins: AllowOrigins,
  allow_credentials: bool,
  max_age: u64,
}

impl CorsConfig {
  /// Create new cors config.
  pub fn new(allow_origins: AllowOrigins, allow_credentials: bool, max_age: u64) -> Self {
    Self {
      allow_origins,
      allow_credentials,
      max_age,
    }
  }

  /// Get the allowed origins.
  pub fn allow_origins(&self) -> &AllowOrigins {
    &self.allow_origins
  }

  /// Whether browsers may send credentials.
  pub fn allow_credentials(&self) -> bool {
    self.allow_credentials
  }

  /// How long a preflight response may be cached, in seconds.
  pub fn max_age(&self) -> u64 {
    self.max_age
  }

  /// Browsers refuse credentialed responses for a wildcard origin.
  pub fn validate(&self) -> Result<()> {
    if self.allow_credentials && self.allow_origins == AllowOrigins::Any {
      return Err(InvalidConfig(
        "validating cors: allow_credentials cannot be used with allow_origins = \"any\""
          .to_string(),
      ));
    }

    Ok(())
  }
}

impl Default for CorsConfig {
  fn default() -> Self {
    Self {
      allow_origins: AllowOrigins::Mirror,
      allow_credentials: false,
      max_age: DEFAULT_MAX_AGE,
    }
  }
}
