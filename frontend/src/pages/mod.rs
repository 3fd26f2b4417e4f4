pub mod coin;
pub mod home;
pub mod marketcapof;
pub mod not_found;
pub mod portfolio;
pub mod trending;

use dioxus::prelude::*;

use crate::{
  components::status::{EmptyState, ErrorLine, Loading},
  utils::{
    loader::ViewModel,
    orchestrator::FetchState,
    routes::{RouteDescriptor, RoutePatternId},
    server::ErrorKind
  }
};
use coin::CoinDetail;
use home::Home;
use marketcapof::MarketCapOf;
use not_found::PageNotFound;
use portfolio::Portfolio;
use trending::Trending;

pub fn render_route(route: &RouteDescriptor, state: FetchState<ViewModel>) -> Element {
  if route.is_not_found() {
    return rsx! { PageNotFound { path: route.raw_path().to_string() } };
  }

  match state {
    FetchState::Idle | FetchState::Loading { .. } => rsx! { Loading { } },
    FetchState::Error { kind: ErrorKind::NotFound, message, .. } => rsx! {
      EmptyState { title: "Not found", message }
    },
    FetchState::Error { message, .. } => rsx! {
      ErrorLine { message, retry: route.raw_path().to_string() }
    },
    FetchState::Success { data, .. } => render_model(route, data)
  }
}

fn render_model(route: &RouteDescriptor, data: ViewModel) -> Element {
  let param = |name: &str| route.param(name).map(str::to_string);

  match (route.pattern(), data) {
    (RoutePatternId::Listing, ViewModel::Listing { coins, global }) => rsx! { Home { coins, global } },
    (RoutePatternId::AssetDetail, ViewModel::Asset { view, exchanges }) => rsx! { CoinDetail { view, exchanges } },
    (RoutePatternId::Trending, ViewModel::Trending(view)) => rsx! { Trending { view } },
    (RoutePatternId::Portfolio, ViewModel::Portfolio(view)) => rsx! { Portfolio { view, focus: param("holding") } },
    (RoutePatternId::CapComparator, ViewModel::Comparator { coins }) => rsx! {
      MarketCapOf { coins, from: param("from"), to: param("to") }
    },
    // keys are derived from the pattern, so the pair always lines up
    _ => rsx! { Loading { } }
  }
}
