use dioxus::prelude::*;

use crate::components::status::EmptyState;

#[component]
pub fn PageNotFound(path: String) -> Element {
  rsx! {
    EmptyState {
      title: "Page not found",
      message: "Nothing lives at {path}.",
    }
  }
}
