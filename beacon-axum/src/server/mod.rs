//! The following module provides an implementation of the beacon server using Axum.
//!

pub mod beacon;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use beacon_config::config::cors::{AllowOrigins, CorsConfig};
use beacon_http::{Beacon, ConfigServiceInfo};
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::error::Error::ServerError;
use crate::error::Result;
use crate::server::beacon::BeaconServer;

/// Represents the axum app state.
#[derive(Debug, Clone)]
pub struct AppState {
  pub(crate) beacon: Beacon,
  pub(crate) service_info: ConfigServiceInfo,
}

impl AppState {
  /// Create a new app state.
  pub fn new(beacon: Beacon, service_info: ConfigServiceInfo) -> Self {
    Self {
      beacon,
      service_info,
    }
  }
}

/// Configure cors for the query and service-info routes. Methods are fixed to the ones the
/// router serves, and request headers are mirrored so that `Authorization` passes preflight.
pub fn configure_cors(cors: &CorsConfig) -> CorsLayer {
  let allow_origin = match cors.allow_origins() {
    AllowOrigins::Mirror => AllowOrigin::mirror_request(),
    AllowOrigins::Any => AllowOrigin::any(),
    AllowOrigins::List(origins) => AllowOrigin::list(origins.iter().cloned()),
  };

  CorsLayer::new()
    .allow_origin(allow_origin)
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers(AllowHeaders::mirror_request())
    .allow_credentials(cors.allow_credentials())
    .max_age(Duration::from_secs(cors.max_age()))
}

/// An axum server which should bind an address.
#[derive(Debug, Clone)]
pub struct BindServer {
  addr: SocketAddr,
  cors: CorsConfig,
}

impl BindServer {
  pub fn new(addr: SocketAddr, cors: CorsConfig) -> Self {
    Self { addr, cors }
  }

  /// Eagerly bind the address by returning a `Server`. This function also updates the
  /// address to the actual bound address.
  pub async fn bind_server(&mut self) -> Result<Server> {
    let server = Server::bind_addr(self.addr).await?;
    self.addr = server.local_addr()?;

    Ok(server)
  }

  /// Eagerly bind the address by returning a `BeaconServer`.
  pub async fn bind_beacon_server(
    &mut self,
    beacon: Beacon,
    service_info: ConfigServiceInfo,
  ) -> Result<BeaconServer> {
    let server = self.bind_server().await?;

    Ok(BeaconServer::new(
      server,
      beacon,
      service_info,
      self.cors.clone(),
    ))
  }

  /// Get the [SocketAddr] of this formatter.
  pub fn get_addr(&self) -> SocketAddr {
    self.addr
  }
}

/// An Axum server.
#[derive(Debug)]
pub struct Server {
  listener: TcpListener,
}

impl Server {
  /// Eagerly bind the address for use with the server, returning any errors.
  pub async fn bind_addr(addr: SocketAddr) -> Result<Server> {
    let listener = TcpListener::bind(addr).await?;

    Ok(Self { listener })
  }

  /// Run the actual server, using the router.
  pub async fn serve(self, app: Router) -> Result<()> {
    axum::serve(self.listener, app)
      .await
      .map_err(|err| ServerError(err.to_string()))
  }

  /// Get the local address the server has bound to.
  pub fn local_addr(&self) -> Result<SocketAddr> {
    Ok(self.listener.local_addr()?)
  }
}
