// Framework prefetch probes (`.../index.txt?_rsc=...`) get a local `200 {}`.

use std::rc::Rc;
use dioxus::logger::tracing::debug;
use futures::future::{self, FutureExt, LocalBoxFuture};
use js_sys::{
  wasm_bindgen::{prelude::Closure, JsCast, JsValue},
  Function, Promise, Reflect
};
use web_sys::{window, Headers, Request, Response, ResponseInit};

use super::{
  server::AppError,
  transport::{HttpRequest, RawResponse, Transport, EMPTY_JSON}
};

// set on the replacement fetch so a second install can recognise it
const GATE_MARKER: &str = "__coinpriceProbeGate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSignature {
  fragments: Vec<String>
}

impl ProbeSignature {
  pub fn new(fragments: Vec<String>) -> Self {
    Self { fragments }
  }

  // A url is a probe when it contains every fragment. An empty signature matches nothing.
  pub fn matches(&self, url: &str) -> bool {
    !self.fragments.is_empty() && self.fragments.iter().all(|f| url.contains(f.as_str()))
  }
}

pub struct FetchGate {
  inner: Rc<dyn Transport>,
  signature: ProbeSignature
}

impl FetchGate {
  // Puts the gate in front of `inner`. Installing over an already gated transport hands it
  // back as is.
  pub fn install(inner: Rc<dyn Transport>, signature: ProbeSignature) -> Rc<dyn Transport> {
    if inner.is_gated() {
      debug!("fetch gate already installed, not wrapping again");
      return inner;
    }
    Rc::new(FetchGate { inner, signature })
  }
}

impl Transport for FetchGate {
  fn send(&self, request: HttpRequest) -> LocalBoxFuture<'_, Result<RawResponse, AppError>> {
    if self.signature.matches(&request.url) {
      debug!("neutralised probe request to {}", request.url);
      return future::ready(Ok(RawResponse::empty_json())).boxed_local();
    }
    self.inner.send(request)
  }

  fn is_gated(&self) -> bool {
    true
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateInstall {
  Installed,
  AlreadyInstalled
}

fn js_err(e: JsValue) -> AppError {
  AppError::WasmError(format!("{:?}", e))
}

// the global fetch function as a replaceable slot
pub trait FetchSlot {
  fn is_gated(&self) -> Result<bool, AppError>;
  fn gate(&self, signature: ProbeSignature) -> Result<(), AppError>;
}

pub fn install_gate(slot: &dyn FetchSlot, signature: ProbeSignature) -> Result<GateInstall, AppError> {
  if slot.is_gated()? {
    return Ok(GateInstall::AlreadyInstalled);
  }
  slot.gate(signature)?;
  Ok(GateInstall::Installed)
}

// Replaces `window.fetch` with a gated version. Must run before the app issues any request.
pub fn install_window_gate(signature: ProbeSignature) -> Result<GateInstall, AppError> {
  let window = window().ok_or_else(|| AppError::WasmError("global window should exist!".to_string()))?;
  install_gate(&WindowFetch { window }, signature)
}

struct WindowFetch {
  window: web_sys::Window
}

impl WindowFetch {
  fn current(&self) -> Result<JsValue, AppError> {
    Reflect::get(&self.window, &JsValue::from_str("fetch")).map_err(js_err)
  }
}

impl FetchSlot for WindowFetch {
  fn is_gated(&self) -> Result<bool, AppError> {
    let current = self.current()?;
    Ok(Reflect::get(&current, &JsValue::from_str(GATE_MARKER)).map(|v| v.is_truthy()).unwrap_or(false))
  }

  fn gate(&self, signature: ProbeSignature) -> Result<(), AppError> {
    let original: Function = self.current()?.dyn_into().map_err(|_| AppError::WasmError("window.fetch is not a function".to_string()))?;
    let target = self.window.clone();
    let gate = Closure::<dyn Fn(JsValue, JsValue) -> Promise>::new(move |input: JsValue, init: JsValue| {
      let url = FetchInput::from_js(&input).url();
      if signature.matches(&url) {
        debug!("neutralised probe request to {}", url);
        return synthetic_empty_json();
      }
      match original.call2(&target, &input, &init) {
        Ok(result) => result.dyn_into::<Promise>().unwrap_or_else(|other| Promise::resolve(&other)),
        Err(e) => Promise::reject(&e)
      }
    });

    let gate_fn: &Function = gate.as_ref().unchecked_ref();
    Reflect::set(gate_fn, &JsValue::from_str(GATE_MARKER), &JsValue::TRUE).map_err(js_err)?;
    Reflect::set(&self.window, &JsValue::from_str("fetch"), gate_fn).map_err(js_err)?;
    // lives for the rest of the page
    gate.forget();
    Ok(())
  }
}

// What `fetch` was called with: a string, a `Request`, or anything with an `href` (URL).
#[derive(Debug, Clone, PartialEq)]
pub enum FetchInput {
  Text(String),
  Request(String),
  Located(Option<String>)
}

impl FetchInput {
  fn from_js(input: &JsValue) -> Self {
    if let Some(s) = input.as_string() {
      return FetchInput::Text(s);
    }
    if let Some(req) = input.dyn_ref::<Request>() {
      return FetchInput::Request(req.url());
    }
    FetchInput::Located(Reflect::get(input, &JsValue::from_str("href")).ok().and_then(|v| v.as_string()))
  }

  // no href at all matches no probe signature
  pub fn url(self) -> String {
    match self {
      FetchInput::Text(url) | FetchInput::Request(url) => url,
      FetchInput::Located(href) => href.unwrap_or_default()
    }
  }
}

fn synthetic_empty_json() -> Promise {
  let headers = match Headers::new() {
    Ok(h) => h,
    Err(e) => return Promise::reject(&e)
  };
  let _ = headers.set("Content-Type", "application/json");

  let init = ResponseInit::new();
  init.set_status(200);
  init.set_headers(&headers);

  match Response::new_with_opt_str_and_init(Some(EMPTY_JSON), &init) {
    Ok(resp) => Promise::resolve(&JsValue::from(resp)),
    Err(e) => Promise::reject(&e)
  }
}

#[cfg(test)]
mod tests {
  use futures::executor::block_on;

  use super::*;
  use crate::utils::browser::fakes::FakeTransport;

  fn signature() -> ProbeSignature {
    ProbeSignature::new(vec!["_rsc".to_string(), ".txt".to_string()])
  }

  #[test]
  fn probe_urls_get_a_local_empty_json_answer() {
    let upstream = Rc::new(FakeTransport::default());
    let gate = FetchGate::install(upstream.clone(), signature());

    let resp = block_on(gate.send(HttpRequest::get("/coin/bitcoin/index.txt?_rsc=1x9f"))).expect("gate never fails");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "{}");
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));
    assert!(upstream.sent_urls().is_empty());
  }

  #[test]
  fn other_requests_are_forwarded_unchanged() {
    let upstream = Rc::new(FakeTransport::default());
    upstream.respond("https://api.example/coins/bitcoin", 200, r#"{"id":"bitcoin"}"#);
    let gate = FetchGate::install(upstream.clone(), signature());

    let resp = block_on(gate.send(HttpRequest::get("https://api.example/coins/bitcoin"))).unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"id":"bitcoin"}"#);

    // only one of the two fragments present: not a probe
    let resp = block_on(gate.send(HttpRequest::get("/notes.txt"))).unwrap();
    assert_eq!(resp.status, 404);

    assert_eq!(upstream.sent_urls(), vec!["https://api.example/coins/bitcoin".to_string(), "/notes.txt".to_string()]);
  }

  #[test]
  fn installing_twice_does_not_double_wrap() {
    let upstream: Rc<dyn Transport> = Rc::new(FakeTransport::default());
    let once = FetchGate::install(upstream, signature());
    let twice = FetchGate::install(once.clone(), signature());
    assert!(Rc::ptr_eq(&once, &twice));
  }

  #[test]
  fn empty_signature_matches_nothing() {
    assert!(!ProbeSignature::new(vec![]).matches("/index.txt?_rsc=1"));
    assert!(signature().matches("/trending/index.txt?_rsc=abc"));
  }

  // stands in for window.fetch: gating sets the marker, like the real slot
  #[derive(Default)]
  struct FakeSlot {
    marked: std::cell::Cell<bool>,
    gated: std::cell::RefCell<Vec<ProbeSignature>>
  }

  impl FetchSlot for FakeSlot {
    fn is_gated(&self) -> Result<bool, AppError> {
      Ok(self.marked.get())
    }

    fn gate(&self, signature: ProbeSignature) -> Result<(), AppError> {
      self.gated.borrow_mut().push(signature);
      self.marked.set(true);
      Ok(())
    }
  }

  #[test]
  fn window_slot_is_gated_once() {
    let slot = FakeSlot::default();
    assert_eq!(install_gate(&slot, signature()), Ok(GateInstall::Installed));
    assert_eq!(install_gate(&slot, signature()), Ok(GateInstall::AlreadyInstalled));
    assert_eq!(slot.gated.borrow().len(), 1);
  }

  #[test]
  fn every_fetch_input_shape_yields_its_url() {
    let probe = "/coin/a/index.txt?_rsc=9";
    assert!(signature().matches(&FetchInput::Text(probe.into()).url()));
    assert!(signature().matches(&FetchInput::Request(probe.into()).url()));
    assert!(signature().matches(&FetchInput::Located(Some(probe.into())).url()));
    assert_eq!(FetchInput::Located(None).url(), "");
    assert!(!signature().matches(&FetchInput::Located(None).url()));
  }
}
