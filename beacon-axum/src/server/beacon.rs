//! The Axum beacon server.
//!

use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use beacon_config::config::Config;
use beacon_config::config::cors::CorsConfig;
use beacon_config::config::server::ServerConfig;
use beacon_http::{Beacon, ConfigServiceInfo};
use http::{StatusCode, Uri};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::handlers::{beacon_service_info, get as get_handlers, post as post_handlers};
use crate::server::{AppState, BindServer, Server, configure_cors};

impl From<ServerConfig> for BindServer {
  fn from(config: ServerConfig) -> Self {
    Self::new(config.addr(), config.cors().clone())
  }
}

/// The beacon query server.
#[derive(Debug)]
pub struct BeaconServer {
  server: Server,
  beacon: Beacon,
  service_info: ConfigServiceInfo,
  cors: CorsConfig,
}

impl BeaconServer {
  /// Create a new beacon server.
  pub fn new(
    server: Server,
    beacon: Beacon,
    service_info: ConfigServiceInfo,
    cors: CorsConfig,
  ) -> Self {
    Self {
      server,
      beacon,
      service_info,
      cors,
    }
  }

  /// Run the beacon server.
  pub async fn serve(self) -> Result<()> {
    self
      .server
      .serve(Self::router(self.beacon, self.service_info, self.cors))
      .await
  }

  /// Create the router for the beacon server.
  pub fn router(beacon: Beacon, service_info: ConfigServiceInfo, cors: CorsConfig) -> Router {
    Router::default()
      .route("/", get(beacon_service_info))
      .route("/service-info", get(beacon_service_info))
      .route(
        "/query",
        get(get_handlers::query).post(post_handlers::query),
      )
      .fallback(Self::fallback)
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(configure_cors(&cors)),
      )
      .with_state(AppState::new(beacon, service_info))
  }

  /// Get the local address the server has bound to.
  pub fn local_addr(&self) -> Result<SocketAddr> {
    self.server.local_addr()
  }

  /// A handler for when a route is not found.
  async fn fallback(uri: Uri) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("No route for {uri}"))
  }
}

/// Build the beacon from the config and spawn a task to run the server.
pub async fn join_handle(config: Config) -> Result<JoinHandle<Result<()>>> {
  let beacon = Beacon::from_config(&config).await?;
  let server = BindServer::from(config.server().clone())
    .bind_beacon_server(beacon, config.service_info().clone())
    .await?;

  info!(address = ?server.local_addr()?, "beacon server address bound to");

  Ok(tokio::spawn(async move { server.serve().await }))
}
