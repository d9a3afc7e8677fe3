//! Structs to serialize and deserialize the beacon-rs config options.
//!

use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Command, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use tracing::subscriber::set_global_default;
use tracing_subscriber::fmt::{format, layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::FormattingStyle::{Compact, Full, Json, Pretty};
use crate::config::bigquery::BigQueryConfig;
use crate::config::parser::from_path;
use crate::config::server::ServerConfig;
use crate::config::service_info::ServiceInfo;
use crate::error::Error::{ArgParseError, TracingError};
use crate::error::Result;

pub mod bigquery;
pub mod cors;
pub mod parser;
pub mod server;
pub mod service_info;

/// Represents a usage string for beacon-rs.
pub const USAGE: &str = "To configure beacon-rs use a config file or environment variables. \
See the documentation of the beacon-config crate for more information.";

/// The command line arguments allowed for the beacon-rs executables.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = USAGE)]
struct Args {
  #[arg(
    short,
    long,
    env = "BEACON_CONFIG",
    help = "Set the location of the config file"
  )]
  config: Option<PathBuf>,
  #[arg(short, long, exclusive = true, help = "Print a default config file")]
  print_default_config: bool,
}

/// Determines which tracing formatting style to use.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub enum FormattingStyle {
  #[default]
  Full,
  Compact,
  Pretty,
  Json,
}

/// Options which shape how inbound queries are interpreted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
  require_coordinate: bool,
}

impl QueryConfig {
  /// Create a new query config.
  pub fn new(require_coordinate: bool) -> Self {
    Self { require_coordinate }
  }

  /// Whether a query without any coordinate is rejected.
  pub fn require_coordinate(&self) -> bool {
    self.require_coordinate
  }
}

impl Default for QueryConfig {
  fn default() -> Self {
    Self {
      require_coordinate: true,
    }
  }
}

/// Configuration for the beacon server.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  formatting_style: FormattingStyle,
  server: ServerConfig,
  bigquery: BigQueryConfig,
  query: QueryConfig,
  service_info: ServiceInfo,
}

impl Config {
  /// Create a config.
  pub fn new(
    formatting_style: FormattingStyle,
    server: ServerConfig,
    bigquery: BigQueryConfig,
    query: QueryConfig,
    service_info: ServiceInfo,
  ) -> Self {
    Self {
      formatting_style,
      server,
      bigquery,
      query,
      service_info,
    }
  }

  /// Parse the command line arguments. Returns the config path, or prints the default config.
  /// Augment the `Command` args from the `clap` parser. Returns an error if the arguments could
  /// not be parsed.
  pub fn parse_args_with_command(augment_args: Command) -> Result<Option<PathBuf>> {
    Self::parse_with_args(
      Args::from_arg_matches(&Args::augment_args(augment_args).get_matches())
        .map_err(|err| ArgParseError(err.to_string()))?,
    )
  }

  fn parse_with_args(args: Args) -> Result<Option<PathBuf>> {
    if args.print_default_config {
      println!(
        "{}",
        toml::ser::to_string_pretty(&Config::default())
          .map_err(|err| ArgParseError(err.to_string()))?
      );
      Ok(None)
    } else {
      Ok(Some(args.config.unwrap_or_else(|| "".into())))
    }
  }

  /// Read a config struct from a TOML file, merging environment variables on top.
  pub fn from_path(path: &Path) -> io::Result<Self> {
    let config: Self = from_path(path)?;
    config.validate()?;

    Ok(config)
  }

  /// Check that the config describes a usable beacon.
  pub fn validate(&self) -> Result<()> {
    self.server.cors().validate()?;
    self.bigquery.validate()
  }

  /// Setup tracing, using a global subscriber.
  pub fn setup_tracing(&self) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default().with(env_filter);

    match self.formatting_style() {
      Full => set_global_default(subscriber.with(layer())),
      Compact => set_global_default(subscriber.with(layer().event_format(format().compact()))),
      Pretty => set_global_default(subscriber.with(layer().event_format(format().pretty()))),
      Json => set_global_default(subscriber.with(layer().event_format(format().json()))),
    }
    .map_err(|err| TracingError(err.to_string()))?;

    Ok(())
  }

  /// Get the formatting style.
  pub fn formatting_style(&self) -> FormattingStyle {
    self.formatting_style
  }

  /// Get the server config.
  pub fn server(&self) -> &ServerConfig {
    &self.server
  }

  /// Get the table lookup config.
  pub fn bigquery(&self) -> &BigQueryConfig {
    &self.bigquery
  }

  /// Get the query config.
  pub fn query(&self) -> QueryConfig {
    self.query
  }

  /// Get the service info.
  pub fn service_info(&self) -> &ServiceInfo {
    &self.service_info
  }
}
