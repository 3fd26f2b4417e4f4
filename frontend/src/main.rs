#![allow(non_snake_case)]
mod pages;
mod components;
mod utils;

use dioxus::{logger::tracing::{debug, error, info, warn}, prelude::*};

use components::template::Template;
use utils::{
  config::{self, AppConfig},
  dashboard::Dashboard,
  fetch_gate::{install_window_gate, GateInstall, ProbeSignature}
};

fn main() {
  if let Err(e) = dioxus::logger::init(config::log_level()) {
    eprintln!("logger init failed: {:?}", e);
  }

  // before anything else can issue a request
  let config = AppConfig::from_build();
  match install_window_gate(ProbeSignature::new(config.probe_fragments.clone())) {
    Ok(GateInstall::Installed) => info!("probe gate installed for {:?}", config.probe_fragments),
    Ok(GateInstall::AlreadyInstalled) => debug!("probe gate already present"),
    Err(e) => warn!("probe gate not installed: {}", e)
  }

  dioxus::launch(App);
}

fn App() -> Element {
  let booted = use_hook(|| Dashboard::boot(&AppConfig::from_build()));

  match booted {
    Ok(dashboard) => rsx! { Shell { dashboard } },
    Err(e) => {
      error!("boot failed: {}", e);
      rsx! {
        h1 { "Something went wrong" }
        p { "The app could not start in this browser." }
        pre { color: "red", "log:\n{e}" }
      }
    }
  }
}

#[component]
fn Shell(dashboard: Dashboard) -> Element {
  use_context_provider(|| dashboard.clone());

  let route = use_signal(|| dashboard.navigation.current());
  let mut revision = use_signal(|| dashboard.orchestrator.revision());

  // route changes land synchronously, from clicks and from popstate alike
  let navigation = dashboard.navigation.clone();
  let subscription = use_hook(move || {
    navigation.subscribe(move |state| {
      let mut route = route;
      route.set(state.clone());
    })
  });
  let navigation = dashboard.navigation.clone();
  use_drop(move || navigation.unsubscribe(subscription));

  let orchestrator = dashboard.orchestrator.clone();
  use_future(move || {
    let mut revisions = orchestrator.revisions();
    async move {
      while revisions.changed().await.is_ok() {
        let current = *revisions.borrow_and_update();
        revision.set(current);
      }
    }
  });

  let state = route.read();
  let _ = revision();
  let page = pages::render_route(&state.current, dashboard.orchestrator.state());

  rsx! {
    Template {
      {page}
    }
  }
}
