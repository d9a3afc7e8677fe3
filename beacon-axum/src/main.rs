use tracing::debug;

use beacon_axum::server::beacon::join_handle;
use beacon_config::command;
use beacon_config::config::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
  if let Some(path) =
    Config::parse_args_with_command(command!()).expect("expected valid command parsing")
  {
    let config = Config::from_path(&path)?;

    config.setup_tracing()?;

    debug!(config = ?config, "config parsed");

    Ok(join_handle(config).await?.await??)
  } else {
    Ok(())
  }
}
