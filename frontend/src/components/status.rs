use dioxus::prelude::*;

use super::template::NavLink;

#[component]
pub fn Loading() -> Element {
  rsx! {
    div {
      class: "status loading",
      span { class: "spinner" }
      "Loading..."
    }
  }
}

// Transient failure. Retrying re-enters the same route, which fetches again.
#[component]
pub fn ErrorLine(message: String, retry: String) -> Element {
  rsx! {
    div {
      class: "status error",
      p { "{message}" }
      NavLink { class: "retry", to: retry, "Try again" }
    }
  }
}

#[component]
pub fn EmptyState(title: String, message: String) -> Element {
  rsx! {
    div {
      class: "status empty",
      h2 { "{title}" }
      p { "{message}" }
      NavLink { class: "cta-button", to: "/", "Back to markets" }
    }
  }
}
