use dioxus::prelude::*;
use rust_decimal::Decimal;

use crate::{
  components::format::{number, pct, trend, usd},
  utils::{
    comparator::{compare_caps, find_row, picker_rows, PICKER_DEFAULT_ROWS},
    dashboard::Dashboard,
    normalize::MarketRow
  }
};

fn comparator_path(from: &str, to: &str) -> String {
  match (from.is_empty(), to.is_empty()) {
    (true, _) => "/marketcapof".to_string(),
    (false, true) => format!("/marketcapof/{}", from),
    (false, false) => format!("/marketcapof/{}/{}", from, to)
  }
}

#[component]
pub fn MarketCapOf(coins: Vec<MarketRow>, from: Option<String>, to: Option<String>) -> Element {
  let dashboard = use_context::<Dashboard>();
  let subject = find_row(&coins, from.as_deref()).cloned();
  let reference = find_row(&coins, to.as_deref()).cloned();
  let from_id = subject.as_ref().map(|c| c.id.clone()).unwrap_or_default();
  let to_id = reference.as_ref().map(|c| c.id.clone()).unwrap_or_default();

  let on_from = {
    let dashboard = dashboard.clone();
    let to_id = to_id.clone();
    move |evt: FormEvent| dashboard.navigate(&comparator_path(&evt.value(), &to_id))
  };
  let on_to = {
    let from_id = from_id.clone();
    move |evt: FormEvent| dashboard.navigate(&comparator_path(&from_id, &evt.value()))
  };

  let result = match (subject, reference) {
    (Some(a), Some(b)) => rsx! { ComparisonResult { subject: a, reference: b } },
    _ => rsx! { p { class: "muted", "Pick two coins to compare." } }
  };

  rsx! {
    div {
      class: "comparator-page",
      h1 { "Market cap of" }
      p { "Show the price of one coin if it had the market cap of another." }
      div {
        class: "comparator-form",
        CoinSelect { id: "cap-from", label: "Coin", coins: coins.clone(), selected: from_id.clone(), onchange: on_from }
        span { class: "comparator-with", "with the market cap of" }
        CoinSelect { id: "cap-to", label: "Reference", coins: coins.clone(), selected: to_id.clone(), onchange: on_to }
      }
      {result}
    }
  }
}

#[component]
fn CoinSelect(id: String, label: String, coins: Vec<MarketRow>, selected: String, onchange: EventHandler<FormEvent>) -> Element {
  let mut filter = use_signal(String::new);
  let shown: Vec<MarketRow> = picker_rows(&coins, &filter(), &selected).into_iter().cloned().collect();
  let hint = if filter().trim().is_empty() {
    format!("Top {} coins by market cap", PICKER_DEFAULT_ROWS)
  } else {
    format!("{} results", shown.len())
  };

  rsx! {
    div {
      class: "form-field",
      label { r#for: "{id}", "{label}" }
      input {
        r#type: "search",
        class: "picker-filter",
        placeholder: "Name, symbol, >1b or <100m",
        value: "{filter}",
        oninput: move |evt: FormEvent| filter.set(evt.value())
      }
      select {
        id: "{id}",
        onchange: move |evt| onchange.call(evt),
        option { value: "", selected: selected.is_empty(), "Select a coin" }
        for coin in shown.iter() {
          option {
            key: "{coin.id}",
            value: "{coin.id}",
            selected: coin.id == selected,
            "{coin.name} ({coin.symbol.to_uppercase()})"
          }
        }
      }
      span { class: "muted", "{hint}" }
    }
  }
}

#[component]
fn ComparisonResult(subject: MarketRow, reference: MarketRow) -> Element {
  let Some(result) = compare_caps(&subject, &reference) else {
    return rsx! {
      p { class: "muted", "{subject.name} has no circulating supply or price to compare against." }
    };
  };

  rsx! {
    div {
      class: "comparator-result",
      h2 {
        "{subject.name} with the market cap of {reference.name}: "
        span { class: "value", "{usd(result.hypothetical_price)}" }
      }
      p {
        span { class: trend(result.multiplier - Decimal::ONE), "{result.multiplier.round_dp(2)}x" }
        " the current price of {usd(subject.current_price)}"
      }
      p {
        class: "muted",
        "{reference.name} market cap {usd(reference.market_cap)}, {subject.name} supply {number(subject.circulating_supply)} "
        "(24h {pct(subject.change_24h)})"
      }
    }
  }
}
