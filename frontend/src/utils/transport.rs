use futures::future::{FutureExt, LocalBoxFuture};
use serde::de::DeserializeOwned;

use super::server::AppError;

pub const EMPTY_JSON: &str = "{}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
  pub url: String
}

impl HttpRequest {
  pub fn get(url: impl Into<String>) -> Self {
    Self { url: url.into() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
  pub status: u16,
  pub content_type: Option<String>,
  pub body: String
}

impl RawResponse {
  // Locally fabricated `200 {}` answer, never touches the network.
  pub fn empty_json() -> Self {
    Self { status: 200, content_type: Some("application/json".to_string()), body: EMPTY_JSON.to_string() }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
    Ok(serde_json::from_str(&self.body)?)
  }
}

pub trait Transport {
  fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<RawResponse, AppError>>;

  // true once the probe gate sits in front of this transport
  fn is_gated(&self) -> bool {
    false
  }
}

pub struct ReqwestTransport {
  client: reqwest::Client
}

impl ReqwestTransport {
  pub fn new(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl Transport for ReqwestTransport {
  fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<RawResponse, AppError>> {
    async move {
      let resp = self.client.get(&request.url).send().await.map_err(|e| AppError::Network(e.to_string()))?;
      let status = resp.status().as_u16();
      let content_type = resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
      let body = resp.text().await.map_err(|e| AppError::Network(e.to_string()))?;
      Ok(RawResponse { status, content_type, body })
    }.boxed_local()
  }
}
