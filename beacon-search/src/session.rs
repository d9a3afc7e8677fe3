//! Credentials used to talk to the store, acquired once per query.
//!

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{BeaconError, Result};

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";

/// An access token scoped to a single call. Dropped once the call returns.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
  token: String,
}

impl Session {
  pub fn new(token: impl Into<String>) -> Self {
    Self {
      token: token.into(),
    }
  }

  /// Authorize a request with this session.
  pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    request.bearer_auth(&self.token)
  }

  /// Get the token.
  pub fn token(&self) -> &str {
    &self.token
  }
}

impl Debug for Session {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session").field("token", &"<redacted>").finish()
  }
}

/// Supplies sessions to an executor.
#[async_trait]
pub trait SessionProvider: Debug + Send + Sync {
  async fn session(&self, client: &Client) -> Result<Session>;
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
}

/// Uses the service account of the environment the server runs in, by asking the metadata
/// server for a token on every call.
#[derive(Debug, Clone)]
pub struct ServiceAccountSession {
  token_url: String,
}

impl ServiceAccountSession {
  pub fn new(token_url: impl Into<String>) -> Self {
    Self {
      token_url: token_url.into(),
    }
  }
}

#[async_trait]
impl SessionProvider for ServiceAccountSession {
  #[instrument(level = "debug", skip_all)]
  async fn session(&self, client: &Client) -> Result<Session> {
    let response = client
      .get(&self.token_url)
      .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
      .send()
      .await
      .map_err(|err| BeaconError::connection_error(format!("fetching token: {err}")))?;

    let status = response.status();
    if !status.is_success() {
      return Err(BeaconError::connection_error(format!(
        "fetching token: metadata server returned {status}"
      )));
    }

    let token: TokenResponse = response
      .json()
      .await
      .map_err(|err| BeaconError::connection_error(format!("decoding token: {err}")))?;

    debug!("acquired service account session");

    Ok(Session::new(token.access_token))
  }
}

/// Forwards the bearer token the caller presented.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerTokenSession {
  token: String,
}

impl BearerTokenSession {
  pub fn new(token: impl Into<String>) -> Self {
    Self {
      token: token.into(),
    }
  }
}

impl Debug for BearerTokenSession {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BearerTokenSession")
      .field("token", &"<redacted>")
      .finish()
  }
}

#[async_trait]
impl SessionProvider for BearerTokenSession {
  async fn session(&self, _client: &Client) -> Result<Session> {
    Ok(Session::new(self.token.clone()))
  }
}

#[cfg(test)]
mod tests {
  use beacon_test::bigquery::{Behaviour, FakeBigQuery, SERVICE_ACCOUNT_TOKEN};

  use super::*;

  #[tokio::test]
  async fn bearer_token_session() {
    let session = BearerTokenSession::new("token")
      .session(&Client::new())
      .await
      .unwrap();

    assert_eq!(session.token(), "token");
  }

  #[tokio::test]
  async fn service_account_session() {
    let server = FakeBigQuery::start(vec![]).await;

    let session = ServiceAccountSession::new(server.token_url())
      .session(&Client::new())
      .await
      .unwrap();

    assert_eq!(session.token(), SERVICE_ACCOUNT_TOKEN);
  }

  #[tokio::test]
  async fn service_account_session_unavailable() {
    let server = FakeBigQuery::start_with(vec![], Behaviour::TokenUnavailable).await;

    assert!(matches!(
      ServiceAccountSession::new(server.token_url())
        .session(&Client::new())
        .await,
      Err(BeaconError::ConnectionError(_))
    ));
  }

  #[tokio::test]
  async fn service_account_session_unreachable() {
    assert!(matches!(
      ServiceAccountSession::new("http://127.0.0.1:1/token")
        .session(&Client::new())
        .await,
      Err(BeaconError::ConnectionError(_))
    ));
  }

  #[test]
  fn debug_redacts_token() {
    assert!(!format!("{:?}", Session::new("secret")).contains("secret"));
    assert!(!format!("{:?}", BearerTokenSession::new("secret")).contains("secret"));
  }
}
