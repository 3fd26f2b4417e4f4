use dioxus::prelude::*;
use rust_decimal::Decimal;

use crate::{
  components::format::{day, number, pct, trend, usd},
  utils::normalize::{AssetLinks, ExchangeRow, NormalizedAssetView}
};

#[component]
pub fn CoinDetail(view: NormalizedAssetView, exchanges: Vec<ExchangeRow>) -> Element {
  let max_supply = if view.max_supply.is_zero() { "∞".to_string() } else { number(view.max_supply) };

  rsx! {
    div {
      class: "coin-page",
      header {
        class: "coin-header",
        img { src: "{view.image}", alt: "{view.name}", width: "64", height: "64" }
        div {
          h1 { "{view.name} " span { class: "coin-symbol", "{view.symbol.to_uppercase()}" } }
          if view.market_cap_rank > 0 {
            span { class: "rank-badge", "Rank #{view.market_cap_rank}" }
          }
        }
        div {
          class: "coin-price",
          span { class: "value", "{usd(view.current_price)}" }
          span { class: trend(view.price_change_percentage_24h), "{pct(view.price_change_percentage_24h)}" }
        }
      }
      div {
        class: "stat-grid",
        Stat { label: "Market cap", value: usd(view.market_cap) }
        Stat { label: "24h volume", value: usd(view.total_volume) }
        Stat { label: "24h high", value: usd(view.high_24h) }
        Stat { label: "24h low", value: usd(view.low_24h) }
        Stat { label: "Circulating supply", value: number(view.circulating_supply) }
        Stat { label: "Total supply", value: number(view.total_supply) }
        Stat { label: "Max supply", value: max_supply }
        Extreme { label: "All-time high", price: view.ath, change: view.ath_change_percentage, date: day(&view.ath_date).to_string() }
        Extreme { label: "All-time low", price: view.atl, change: view.atl_change_percentage, date: day(&view.atl_date).to_string() }
      }
      if !view.description.is_empty() {
        section {
          class: "coin-description",
          h2 { "About {view.name}" }
          p { "{view.description}" }
        }
      }
      Links { links: view.links.clone() }
      if !exchanges.is_empty() {
        ExchangeTable { exchanges, symbol: view.symbol.clone() }
      }
    }
  }
}

#[component]
fn Stat(label: String, value: String) -> Element {
  rsx! {
    div {
      class: "stat",
      label { "{label}" }
      span { class: "value", "{value}" }
    }
  }
}

#[component]
fn Extreme(label: String, price: Decimal, change: Decimal, date: String) -> Element {
  rsx! {
    div {
      class: "stat",
      label { "{label}" }
      span { class: "value", "{usd(price)}" }
      span { class: trend(change), "{pct(change)}" }
      if !date.is_empty() {
        span { class: "date", "{date}" }
      }
    }
  }
}

#[component]
fn Links(links: AssetLinks) -> Element {
  let mut entries: Vec<(&str, String)> = vec![];
  if !links.homepage.is_empty() { entries.push(("Website", links.homepage.clone())); }
  if !links.blockchain_site.is_empty() { entries.push(("Explorer", links.blockchain_site.clone())); }
  if !links.official_forum_url.is_empty() { entries.push(("Forum", links.official_forum_url.clone())); }
  if !links.subreddit_url.is_empty() { entries.push(("Reddit", links.subreddit_url.clone())); }
  if !links.twitter_screen_name.is_empty() {
    entries.push(("Twitter", format!("https://twitter.com/{}", links.twitter_screen_name)));
  }
  if !links.facebook_username.is_empty() {
    entries.push(("Facebook", format!("https://facebook.com/{}", links.facebook_username)));
  }
  if !links.telegram_channel_identifier.is_empty() {
    entries.push(("Telegram", format!("https://t.me/{}", links.telegram_channel_identifier)));
  }
  for repo in links.github_repos.iter().take(1) {
    entries.push(("Source", repo.clone()));
  }

  rsx! {
    if !entries.is_empty() {
      ul {
        class: "coin-links",
        for (name, url) in entries {
          li {
            key: "{name}",
            a { href: "{url}", target: "_blank", rel: "noopener noreferrer", "{name}" }
          }
        }
      }
    }
  }
}

// Spot market for `symbol` against usdt (usd on a few venues). Unknown exchanges get their homepage.
pub fn trading_pair_url(exchange: &ExchangeRow, symbol: &str) -> String {
  let upper = symbol.to_uppercase();
  let lower = symbol.to_lowercase();
  match exchange.id.as_str() {
    "binance" => format!("https://www.binance.com/en/trade/{}_USDT", upper),
    "bybit" | "bybit_spot" => format!("https://www.bybit.com/en/trade/spot/{}/USDT", upper),
    "coinbase" | "gdax" => format!("https://www.coinbase.com/advanced-trade/{}-USDT", upper),
    "kraken" => format!("https://www.kraken.com/trade/{}USD", upper),
    "kucoin" => format!("https://www.kucoin.com/trade/{}-USDT", upper),
    "bitfinex" => format!("https://trading.bitfinex.com/t/{}:USD", upper),
    "okx" | "okex" => format!("https://www.okx.com/trade-spot/{}-usdt", lower),
    "gate" | "gateio" => format!("https://www.gate.io/trade/{}_USDT", upper),
    "huobi" | "htx" => format!("https://www.htx.com/en-us/trade/{}_usdt/", lower),
    "bingx" => format!("https://bingx.com/en-us/spot/{}-usdt/", lower),
    "bitget" => format!("https://www.bitget.com/spot/{}USDT", upper),
    "bitmart" => format!("https://www.bitmart.com/trade/en?symbol={}_USDT", upper),
    "mexc" => format!("https://www.mexc.com/exchange/{}_USDT", upper),
    "whitebit" => format!("https://whitebit.com/trade/{}-USDT", upper),
    "crypto_com" | "cryptocom" => format!("https://crypto.com/exchange/trade/{}_USDT", upper),
    _ if exchange.url.is_empty() => "#".to_string(),
    _ => exchange.url.clone()
  }
}

#[component]
fn ExchangeTable(exchanges: Vec<ExchangeRow>, symbol: String) -> Element {
  let pair = format!("{}/USDT", symbol.to_uppercase());

  rsx! {
    section {
      class: "exchanges",
      h2 { "Top exchanges" }
      table {
        class: "market-table",
        thead {
          tr {
            th { scope: "col", "#" },
            th { scope: "col", "Exchange" },
            th { scope: "col", "Country" },
            th { scope: "col", "Trust score" },
            th { scope: "col", "24h volume (BTC)" },
            th { scope: "col", "Trade" },
          }
        }
        tbody {
          for ex in exchanges.iter() {
            tr {
              key: "{ex.id}",
              td { "{ex.trust_score_rank}" },
              td {
                a {
                  href: "{ex.url}",
                  target: "_blank",
                  rel: "noopener noreferrer",
                  img { src: "{ex.image}", alt: "", width: "20", height: "20" }
                  " {ex.name}"
                }
              },
              td { "{ex.country}" },
              td { "{ex.trust_score}/10" },
              td { "{number(ex.trade_volume_24h_btc)}" },
              td {
                a {
                  href: "{trading_pair_url(ex, &symbol)}",
                  target: "_blank",
                  rel: "noopener noreferrer",
                  "{pair}"
                }
              },
            }
          }
        }
      }
    }
  }
}
