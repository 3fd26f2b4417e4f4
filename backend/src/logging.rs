use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=debug";

// `RUST_LOG` wins over the default filter.
pub fn init_logging(json: bool) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  if json {
    let _ = fmt::Subscriber::builder()
      .with_env_filter(env_filter)
      .json()
      .with_writer(std::io::stderr)
      .try_init();
  } else {
    let _ = fmt::Subscriber::builder()
      .with_env_filter(env_filter)
      .with_writer(std::io::stderr)
      .try_init();
  }
}
