use std::fmt;

// Error taxonomy surfaced to the user. Stale results never show up here, they are dropped
// by the orchestrator before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  TransientFetchFailure
}

// App Errors
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
  NotFound(String),
  UpstreamStatus { status: u16, message: String },
  Network(String),
  DeserializeError(String),
  MalformedPayload(String),
  StorageError(String),
  WasmError(String),
}

impl AppError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      AppError::NotFound(_) => ErrorKind::NotFound,
      _ => ErrorKind::TransientFetchFailure
    }
  }

  // Maps a non 2xx upstream status onto the taxonomy. `what` names the resource for the message.
  pub fn from_status(status: u16, what: &str) -> Self {
    if status == 404 {
      AppError::NotFound(format!("{} not found", what))
    } else {
      AppError::UpstreamStatus { status, message: format!("Failed to fetch {}", what.to_lowercase()) }
    }
  }

  pub fn user_message(&self) -> String {
    match self {
      AppError::NotFound(msg) => msg.clone(),
      AppError::UpstreamStatus { message, .. } => message.clone(),
      other => other.to_string()
    }
  }
}

impl std::error::Error for AppError {}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
      AppError::UpstreamStatus { status, message } => write!(f, "Upstream error ({}): {}", status, message),
      AppError::Network(msg) => write!(f, "Network error: {}", msg),
      AppError::DeserializeError(msg) => write!(f, "Deserialize error: {}", msg),
      AppError::MalformedPayload(msg) => write!(f, "Malformed payload: {}", msg),
      AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
      AppError::WasmError(msg) => write!(f, "Wasm error: {}", msg)
    }
  }
}

impl From<serde_json::Error> for AppError {
  fn from(value: serde_json::Error) -> Self {
    AppError::DeserializeError(value.to_string())
  }
}
