//! The existence response and how it is encoded.
//!

use http::HeaderMap;
use http::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::Result;

pub const XML_CONTENT_TYPE: &str = "application/xml";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The answer to one existence query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename = "BEACONResponse")]
pub struct BeaconResponse {
  exists: bool,
}

impl BeaconResponse {
  pub fn new(exists: bool) -> Self {
    Self { exists }
  }

  /// Whether the variant exists.
  pub fn exists(&self) -> bool {
    self.exists
  }

  /// Encode the response in the given format.
  pub fn encode(&self, format: ResponseFormat) -> Result<String> {
    match format {
      ResponseFormat::Xml => Ok(quick_xml::se::to_string(self)?),
      ResponseFormat::Json => Ok(serde_json::to_string_pretty(self)?),
    }
  }
}

/// The encoding of the response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
  #[default]
  Xml,
  Json,
}

impl ResponseFormat {
  /// Pick the servable media range of the `Accept` header with the highest quality, defaulting
  /// to XML. Ranges of equal quality are taken in header order, and ranges with `q=0` are never
  /// picked.
  pub fn from_headers(headers: &HeaderMap) -> Self {
    headers
      .get_all(ACCEPT)
      .iter()
      .filter_map(|value| value.to_str().ok())
      .flat_map(|value| value.split(','))
      .filter_map(|range| {
        let mut parts = range.split(';');
        let format = match parts.next().map(str::trim) {
          Some(JSON_CONTENT_TYPE) => ResponseFormat::Json,
          Some(XML_CONTENT_TYPE | "text/xml" | "application/*" | "*/*") => ResponseFormat::Xml,
          _ => return None,
        };

        Some((format, quality(parts)))
      })
      .filter(|(_, quality)| *quality > 0.0)
      .fold(None, |best: Option<(ResponseFormat, f32)>, (format, quality)| match best {
        Some((_, best_quality)) if best_quality >= quality => best,
        _ => Some((format, quality)),
      })
      .map(|(format, _)| format)
      .unwrap_or_default()
  }

  /// Get the content type.
  pub fn content_type(&self) -> &'static str {
    match self {
      ResponseFormat::Xml => XML_CONTENT_TYPE,
      ResponseFormat::Json => JSON_CONTENT_TYPE,
    }
  }
}

/// The `q` parameter of a media range. Missing or unparsable values count as 1.
fn quality<'a>(mut parameters: impl Iterator<Item = &'a str>) -> f32 {
  parameters
    .find_map(|parameter| parameter.trim().strip_prefix("q="))
    .and_then(|quality| quality.trim().parse::<f32>().ok())
    .unwrap_or(1.0)
}
