use dioxus::logger::tracing::Level;

// values injected by build.rs (see .env)
pub const API_URL: &str = env!("COINGECKO_API_URL");
pub const API_KEY: &str = env!("COINGECKO_API_KEY");
pub const BASE_PATH: &str = env!("APP_BASE_PATH");
pub const PROBE_FRAGMENTS: &str = env!("RSC_PROBE_FRAGMENTS");
pub const LOG_LEVEL: &str = env!("APP_LOG_LEVEL");

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub api_url: String,
  pub api_key: Option<String>,
  pub base_path: String,
  pub probe_fragments: Vec<String>,
}

impl AppConfig {
  pub fn from_build() -> Self {
    Self {
      api_url: API_URL.trim_end_matches('/').to_string(),
      api_key: Some(API_KEY.trim()).filter(|k| !k.is_empty()).map(str::to_string),
      base_path: normalize_base_path(BASE_PATH),
      probe_fragments: split_fragments(PROBE_FRAGMENTS),
    }
  }
}

pub fn log_level() -> Level {
  match LOG_LEVEL.trim().to_lowercase().as_str() {
    "trace" => Level::TRACE,
    "debug" => Level::DEBUG,
    "warn" => Level::WARN,
    "error" => Level::ERROR,
    _ => Level::INFO
  }
}

// `"coinprice/"` -> `"/coinprice"`, `"/"` -> `""`
pub fn normalize_base_path(raw: &str) -> String {
  let trimmed = raw.trim().trim_matches('/');
  if trimmed.is_empty() {
    String::new()
  } else {
    format!("/{}", trimmed)
  }
}

pub fn split_fragments(raw: &str) -> Vec<String> {
  raw.split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}
