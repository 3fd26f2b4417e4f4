use std::time::Duration;
use dioxus::{logger::tracing::{debug, warn}, prelude::*};

use crate::{
  components::format::usd,
  utils::{api::PricedHit, dashboard::Dashboard}
};

// keystrokes closer together than this share one request
const DEBOUNCE: Duration = Duration::from_millis(300);

pub fn coin_path(id: &str) -> String {
  format!("/coin/{}", id)
}

#[component]
pub fn CoinSearch() -> Element {
  let dashboard = use_context::<Dashboard>();
  let mut query = use_signal(String::new);
  let mut hits: Signal<Vec<PricedHit>> = use_signal(Vec::new);
  let mut loading = use_signal(|| false);
  let mut open = use_signal(|| false);
  // bumped on every keystroke, a search only lands if it is still the latest
  let mut generation = use_signal(|| 0u64);

  let api = dashboard.api.clone();
  let on_input = move |evt: FormEvent| {
    let text = evt.value();
    query.set(text.clone());
    open.set(true);
    let ticket = generation() + 1;
    generation.set(ticket);

    if text.trim().is_empty() {
      hits.set(vec![]);
      loading.set(false);
      return;
    }

    let api = api.clone();
    spawn(async move {
      async_std::task::sleep(DEBOUNCE).await;
      if generation() != ticket {
        return;
      }
      loading.set(true);
      let result = api.search_priced(&text).await;
      if generation() != ticket {
        debug!("dropping search results for {:?}", text);
        return;
      }
      loading.set(false);
      match result {
        Ok(found) => hits.set(found),
        Err(e) => {
          warn!("coin search failed: {}", e);
          hits.set(vec![]);
        }
      }
    });
  };

  let mut clear = move || {
    generation += 1;
    query.set(String::new());
    hits.set(vec![]);
    loading.set(false);
    open.set(false);
  };

  rsx! {
    div {
      class: "coin-search",
      input {
        r#type: "search",
        placeholder: "Search for a coin...",
        value: "{query}",
        oninput: on_input,
        onfocus: move |_| open.set(true),
        onkeydown: move |evt: KeyboardEvent| {
          if evt.key() == Key::Escape {
            open.set(false);
          }
        }
      }
      if !query().is_empty() {
        button {
          class: "search-clear",
          title: "Clear",
          onclick: move |_| clear(),
          "×"
        }
      }
      if open() && !query().is_empty() {
        div {
          class: "search-dropdown",
          if loading() {
            p { class: "muted", "Searching..." }
          } else if hits().is_empty() {
            p { class: "muted", "No results found" }
          } else {
            for found in hits().into_iter() {
              button {
                key: "{found.hit.id}",
                class: "search-hit",
                onclick: {
                  let dashboard = dashboard.clone();
                  let id = found.hit.id.clone();
                  move |_evt| {
                    clear();
                    dashboard.navigate(&coin_path(&id));
                  }
                },
                img { src: "{found.hit.thumb}", alt: "", width: "24", height: "24" }
                span {
                  class: "search-hit-name",
                  "{found.hit.name} "
                  span { class: "coin-symbol", "{found.hit.symbol.to_uppercase()}" }
                }
                if !found.price.is_zero() {
                  span { class: "search-hit-price", "{usd(found.price)}" }
                }
              }
            }
          }
        }
      }
    }
  }
}
