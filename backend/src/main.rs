mod config;
mod logging;
mod midwares;
mod route_handlers;

use tokio::net::TcpListener;
use tracing::info;

use config::HostConfig;
use route_handlers::host::app;

#[tokio::main]
async fn main() {
  let config = match HostConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("invalid configuration: {}", e);
      std::process::exit(2);
    }
  };
  logging::init_logging(config.log_json);

  info!(
    "serving {} on {}{} ({:?} fallback)",
    config.static_dir.display(), config.listen_addr, config.base_path, config.fallback
  );

  let listener = TcpListener::bind(config.listen_addr).await.expect("failed to start tcp listener");

  axum::serve(listener, app(&config)).await.expect("failed to start server");
}
