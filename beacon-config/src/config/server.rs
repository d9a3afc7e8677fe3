//! Beacon server configuration.
//!

use crate::config::cors::CorsConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration for the beacon HTTP server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
  addr: SocketAddr,
  cors: CorsConfig,
}

impl ServerConfig {
  /// Create the server config.
  pub fn new(addr: SocketAddr, cors: CorsConfig) -> Self {
    Self { addr, cors }
  }

  /// Get the socket address.
  pub fn addr(&self) -> SocketAddr {
    self.addr
  }

  /// Get the CORS config.
  pub fn cors(&self) -> &CorsConfig {
    &self.cors
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      addr: default_addr().parse().expect("expected valid address"),
      cors: Default::default(),
    }
  }
}

fn default_addr() -> &'static str {
  "127.0.0.1:8080"
}
