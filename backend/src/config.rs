use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STATIC_DIR: &str = "dist";
pub const DEFAULT_INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
  // the index document itself, status 200
  Document,
  // a 302 to the root carrying the path as `?path=`
  Redirect
}

impl FromStr for FallbackMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "document" => Ok(FallbackMode::Document),
      "redirect" => Ok(FallbackMode::Redirect),
      other => Err(ConfigError::InvalidFallbackMode(other.to_string()))
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
  InvalidListenAddr { value: String, reason: String },
  InvalidFallbackMode(String),
  InvalidBasePath(String)
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::InvalidListenAddr { value, reason } => write!(f, "HOST_LISTEN_ADDR {:?} is invalid: {}", value, reason),
      ConfigError::InvalidFallbackMode(value) => write!(f, "HOST_FALLBACK_MODE {:?} is not one of document, redirect", value),
      ConfigError::InvalidBasePath(value) => write!(f, "HOST_BASE_PATH {:?} may only hold url path characters", value)
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
  pub listen_addr: SocketAddr,
  pub static_dir: PathBuf,
  pub index_file: String,
  pub fallback: FallbackMode,
  // `""` or `/segment[/segment..]`, never a trailing slash
  pub base_path: String,
  pub log_json: bool
}

// `"coinprice/"` -> `"/coinprice"`, `"/"` -> `""`. Anything that could break out of an
// attribute or a url is refused.
pub fn parse_base_path(raw: &str) -> Result<String, ConfigError> {
  let trimmed = raw.trim().trim_matches('/');
  let allowed = |c: char| c.is_ascii_alphanumeric() || "-._~/".contains(c);
  if !trimmed.chars().all(allowed) || trimmed.contains("//") {
    return Err(ConfigError::InvalidBasePath(raw.to_string()));
  }
  Ok(if trimmed.is_empty() { String::new() } else { format!("/{}", trimmed) })
}

impl HostConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let var = |key: &str, default: &str| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string());

    let addr = var("HOST_LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
    let listen_addr = addr.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidListenAddr {
      value: addr.clone(),
      reason: e.to_string()
    })?;

    Ok(Self {
      listen_addr,
      static_dir: PathBuf::from(var("HOST_STATIC_DIR", DEFAULT_STATIC_DIR)),
      index_file: var("HOST_INDEX_FILE", DEFAULT_INDEX_FILE),
      fallback: var("HOST_FALLBACK_MODE", "document").parse()?,
      base_path: parse_base_path(&var("HOST_BASE_PATH", ""))?,
      log_json: lookup("HOST_LOG_JSON").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
    })
  }

  pub fn index_path(&self) -> PathBuf {
    self.static_dir.join(&self.index_file)
  }
}
