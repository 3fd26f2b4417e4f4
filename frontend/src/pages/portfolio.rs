use std::str::FromStr;
use dioxus::{logger::tracing::{info, warn}, prelude::*};
use rust_decimal::Decimal;

use crate::{
  components::{format::{number, usd}, search::coin_path, template::NavLink},
  utils::{
    dashboard::Dashboard,
    holdings::{HoldingValue, NewHolding, PortfolioView},
    normalize::SearchHit
  }
};

pub fn parse_amount(raw: &str) -> Option<Decimal> {
  Decimal::from_str(raw.trim()).ok().filter(|a| *a > Decimal::ZERO)
}

#[component]
pub fn Portfolio(view: PortfolioView, focus: Option<String>) -> Element {
  rsx! {
    div {
      class: "portfolio-page",
      h1 { "Portfolio" }
      div {
        class: "portfolio-total",
        label { "Total value" }
        span { class: "value", "{usd(view.total_value)}" }
      }
      if view.rows.is_empty() {
        p { class: "muted", "No holdings yet. Search for a coin below to add one." }
      } else {
        table {
          class: "market-table",
          thead {
            tr {
              th { scope: "col", "Coin" },
              th { scope: "col", "Amount" },
              th { scope: "col", "Price" },
              th { scope: "col", "Value" },
              th { scope: "col", "" },
            }
          }
          tbody {
            for row in view.rows.iter() {
              HoldingRow {
                key: "{row.holding.id}",
                row: row.clone(),
                focused: focus.as_deref() == Some(row.holding.id.as_str())
              }
            }
          }
        }
      }
      AddHolding { }
    }
  }
}

#[component]
fn HoldingRow(row: HoldingValue, focused: bool) -> Element {
  let dashboard = use_context::<Dashboard>();
  let id = row.holding.id.clone();

  rsx! {
    tr {
      class: if focused { "focused" },
      td {
        NavLink {
          to: coin_path(&row.holding.coin_id),
          "{row.holding.coin_name} "
          span { class: "coin-symbol", "{row.holding.symbol.to_uppercase()}" }
        }
      },
      td { "{number(row.holding.amount)}" },
      td { "{usd(row.price)}" },
      td { "{usd(row.value)}" },
      td {
        button {
          class: "link-button",
          onclick: move |_evt| {
            match dashboard.holdings.delete(&id) {
              Ok(true) => {
                info!("removed holding {}", id);
                dashboard.orchestrator.reload();
              }
              Ok(false) => warn!("holding {} was already gone", id),
              Err(e) => warn!("could not remove holding {}: {}", id, e)
            }
          },
          "Remove"
        }
      }
    }
  }
}

#[component]
fn AddHolding() -> Element {
  let dashboard = use_context::<Dashboard>();
  let mut query = use_signal(String::new);
  let mut hits: Signal<Vec<SearchHit>> = use_signal(Vec::new);
  let mut picked: Signal<Option<SearchHit>> = use_signal(|| None);
  let mut amount = use_signal(String::new);
  let mut form_error: Signal<Option<String>> = use_signal(|| None);

  let api = dashboard.api.clone();
  let on_search = move |evt: FormEvent| {
    evt.prevent_default();
    let api = api.clone();
    let q = query();
    spawn(async move {
      match api.search(&q).await {
        Ok(found) => {
          form_error.set(None);
          hits.set(found);
        }
        Err(e) => form_error.set(Some(e.user_message()))
      }
    });
  };

  let on_add = move |evt: FormEvent| {
    evt.prevent_default();
    let Some(coin) = picked() else {
      form_error.set(Some("Pick a coin first".to_string()));
      return;
    };
    let Some(value) = parse_amount(&amount()) else {
      form_error.set(Some("Amount must be a positive number".to_string()));
      return;
    };
    let new = NewHolding { coin_id: coin.id, coin_name: coin.name, symbol: coin.symbol, amount: value };
    match dashboard.holdings.create(new) {
      Ok(holding) => {
        info!("added holding {} ({})", holding.id, holding.coin_id);
        picked.set(None);
        hits.set(vec![]);
        amount.set(String::new());
        form_error.set(None);
        dashboard.orchestrator.reload();
      }
      Err(e) => form_error.set(Some(e.to_string()))
    }
  };

  rsx! {
    section {
      class: "add-holding",
      h2 { "Add a holding" }
      form {
        class: "search-form",
        onsubmit: on_search,
        input {
          r#type: "search",
          placeholder: "Search coins",
          value: "{query}",
          oninput: move |evt| query.set(evt.value())
        }
        button { r#type: "submit", "Search" }
      }
      if !hits().is_empty() {
        ul {
          class: "search-hits",
          for hit in hits().into_iter() {
            li {
              key: "{hit.id}",
              class: if picked().as_ref().map(|p| p.id == hit.id).unwrap_or(false) { "picked" },
              onclick: {
                let hit = hit.clone();
                move |_evt| picked.set(Some(hit.clone()))
              },
              img { src: "{hit.thumb}", alt: "", width: "20", height: "20" }
              " {hit.name} "
              span { class: "coin-symbol", "{hit.symbol}" }
            }
          }
        }
      }
      if let Some(coin) = picked() {
        form {
          class: "amount-form",
          onsubmit: on_add,
          label { r#for: "holding-amount", "Amount of {coin.name}" }
          input {
            id: "holding-amount",
            inputmode: "decimal",
            value: "{amount}",
            oninput: move |evt| amount.set(evt.value())
          }
          button { r#type: "submit", "Add" }
        }
      }
      if let Some(msg) = form_error() {
        p { class: "form-error", "{msg}" }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn amounts_must_be_positive_decimals() {
    assert_eq!(parse_amount(" 0.25 "), Some(dec!(0.25)));
    assert_eq!(parse_amount("0"), None);
    assert_eq!(parse_amount("-3"), None);
    assert_eq!(parse_amount("ten"), None);
  }
}
