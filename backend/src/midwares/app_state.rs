use std::path::PathBuf;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::config::{FallbackMode, HostConfig};

#[derive(Debug, Clone)]
pub struct HostState {
  pub index_path: PathBuf,
  pub fallback: FallbackMode,
  pub base_path: String
}

impl HostState {
  pub fn from_config(config: &HostConfig) -> Self {
    Self { index_path: config.index_path(), fallback: config.fallback, base_path: config.base_path.clone() }
  }
}

#[derive(Debug, Clone)]
pub enum HostError {
  NotFound(String),
  InternalError(String)
}

impl IntoResponse for HostError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Self::NotFound(path) => (StatusCode::NOT_FOUND, format!("{} not found", path)),
      Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg)
    };

    let body = Json(json!({"error": message, "code": status.as_u16()}));

    (status, body).into_response()
  }
}
