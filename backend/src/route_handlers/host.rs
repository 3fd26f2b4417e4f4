use std::sync::Arc;
use axum::{
  extract::State,
  handler::Handler,
  http::{header::LOCATION, StatusCode, Uri},
  response::{Html, IntoResponse, Response},
  routing::get,
  Json, Router
};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error};
use url::form_urlencoded;

use crate::{
  config::{FallbackMode, HostConfig},
  midwares::app_state::{HostError, HostState}
};

pub const RECOVERY_PARAM: &str = "path";

#[derive(Serialize)]
struct Health {
  status: &'static str
}

async fn healthz() -> Json<Health> {
  Json(Health { status: "ok" })
}

pub const BASE_META: &str = r#"name="app-base-path" content="""#;

// `/coin/x/index.txt`, `/app.wasm`: asset-shaped, never rewritten to the app.
// `/trending.html` is a static export of a route and stays routable.
fn looks_like_file(path: &str) -> bool {
  path.rsplit('/').next().is_some_and(|segment| segment.contains('.') && !segment.ends_with(".html"))
}

// `/coin/x` + `ref=tw` under `/app` -> `/app/?path=%2Fcoin%2Fx&ref=tw`
pub fn recovery_location(base: &str, path: &str, query: Option<&str>) -> String {
  let encoded = form_urlencoded::Serializer::new(String::new())
    .append_pair(RECOVERY_PARAM, path)
    .finish();
  match query.filter(|q| !q.is_empty()) {
    Some(q) => format!("{}/?{}&{}", base, encoded, q),
    None => format!("{}/?{}", base, encoded)
  }
}

// Fills the boot script's base path into the document's `app-base-path` meta tag.
pub fn with_base_meta(document: &str, base: &str) -> String {
  if base.is_empty() {
    return document.to_string();
  }
  document.replacen(BASE_META, &format!(r#"name="app-base-path" content="{}""#, base), 1)
}

async fn unresolved(State(state): State<Arc<HostState>>, uri: Uri) -> Result<Response, HostError> {
  let path = uri.path();
  if looks_like_file(path) {
    return Err(HostError::NotFound(path.to_string()));
  }

  match state.fallback {
    FallbackMode::Document => {
      debug!("serving fallback document for {}", path);
      let document = tokio::fs::read_to_string(&state.index_path).await.map_err(|e| {
        error!("fallback document {} unreadable: {}", state.index_path.display(), e);
        HostError::InternalError("fallback document unavailable".to_string())
      })?;
      Ok(Html(with_base_meta(&document, &state.base_path)).into_response())
    }
    FallbackMode::Redirect => {
      let location = recovery_location(&state.base_path, path, uri.query());
      debug!("redirecting {} to {}", path, location);
      Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
    }
  }
}

pub fn app(config: &HostConfig) -> Router {
  let state = Arc::new(HostState::from_config(config));
  let files = ServeDir::new(&config.static_dir).fallback(unresolved.with_state(state));

  let router = Router::new().route("/healthz", get(healthz));
  // under a base path the nested service sees paths with the base already removed
  let router = if config.base_path.is_empty() {
    router.fallback_service(files)
  } else {
    router.nest_service(&config.base_path, files)
  };
  router.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::{fs, path::Path};
  use axum::{
    body::{to_bytes, Body},
    http::Request
  };
  use tempfile::TempDir;
  use tower::ServiceExt;

  use super::*;

  const INDEX: &str = "<!DOCTYPE html><div id=\"main\"></div>";

  fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets").join("app.js"), "console.log(1)").unwrap();
    dir
  }

  fn config(dir: &Path, fallback: FallbackMode) -> HostConfig {
    HostConfig {
      listen_addr: "127.0.0.1:0".parse().unwrap(),
      static_dir: dir.to_path_buf(),
      index_file: "index.html".to_string(),
      fallback,
      base_path: String::new(),
      log_json: false
    }
  }

  async fn fetch(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let location = response.headers().get(LOCATION).map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8(body.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn existing_files_are_served() {
    let dir = site();
    let (status, _, body) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/assets/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1)");

    let (status, _, body) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX);
  }

  #[tokio::test]
  async fn deep_links_get_the_fallback_document() {
    let dir = site();
    let (status, _, body) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/coin/bitcoin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX);
  }

  #[tokio::test]
  async fn redirect_mode_carries_the_path_to_the_root() {
    let dir = site();
    let (status, location, _) = fetch(app(&config(dir.path(), FallbackMode::Redirect)), "/coin/bitcoin?ref=tw").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/?path=%2Fcoin%2Fbitcoin&ref=tw"));
  }

  #[tokio::test]
  async fn asset_shaped_misses_stay_404() {
    let dir = site();
    let (status, _, body) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/coin/bitcoin/index.txt?_rsc=1x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], 404);
  }

  #[tokio::test]
  async fn missing_index_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, _) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/trending").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[tokio::test]
  async fn health_check() {
    let dir = site();
    let (status, _, body) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
  }

  #[tokio::test]
  async fn static_html_exports_are_routes_not_files() {
    let dir = site();
    let (status, _, body) = fetch(app(&config(dir.path(), FallbackMode::Document)), "/trending.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX);

    let (status, location, _) = fetch(app(&config(dir.path(), FallbackMode::Redirect)), "/coin/bitcoin.html").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/?path=%2Fcoin%2Fbitcoin.html"));
  }

  #[tokio::test]
  async fn base_path_deployments_redirect_under_the_base() {
    let dir = site();
    let mut config = config(dir.path(), FallbackMode::Redirect);
    config.base_path = "/apps/coinprice".to_string();

    let (status, location, _) = fetch(app(&config), "/apps/coinprice/coin/bitcoin?ref=tw").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/apps/coinprice/?path=%2Fcoin%2Fbitcoin&ref=tw"));

    let (status, _, body) = fetch(app(&config), "/apps/coinprice/assets/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1)");
  }

  #[tokio::test]
  async fn base_path_is_filled_into_the_fallback_document() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), r#"<head><meta name="app-base-path" content="" /></head>"#).unwrap();
    let mut config = config(dir.path(), FallbackMode::Document);
    config.base_path = "/apps/coinprice".to_string();

    let (status, _, body) = fetch(app(&config), "/apps/coinprice/coin/bitcoin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"<head><meta name="app-base-path" content="/apps/coinprice" /></head>"#);
  }

  #[test]
  fn recovery_location_encodes_the_path() {
    assert_eq!(recovery_location("", "/portfolio/a b", None), "/?path=%2Fportfolio%2Fa+b");
    assert_eq!(recovery_location("", "/trending", Some("")), "/?path=%2Ftrending");
  }
}
