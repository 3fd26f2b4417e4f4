use dioxus::prelude::*;

use crate::{
  components::{format::{number, pct, trend, usd}, search::coin_path, template::NavLink},
  utils::normalize::{GlobalStats, MarketRow}
};

#[component]
pub fn Home(coins: Vec<MarketRow>, global: GlobalStats) -> Element {
  rsx! {
    div {
      class: "home-page",
      section {
        class : "hero",
        h1 { "Cryptocurrency prices by market cap" },
        p { "Live prices, market caps and volume for the top {coins.len()} coins." }
      },
      GlobalBar { global }
      table {
        class: "market-table",
        thead {
          tr {
            th { scope: "col", "#" },
            th { scope: "col", "Coin" },
            th { scope: "col", "Price" },
            th { scope: "col", "1h" },
            th { scope: "col", "24h" },
            th { scope: "col", "7d" },
            th { scope: "col", "Volume" },
            th { scope: "col", "Market cap" },
          }
        }
        tbody {
          for coin in coins.iter() {
            MarketRowView { key: "{coin.id}", coin: coin.clone() }
          }
        }
      }
    }
  }
}

#[component]
fn GlobalBar(global: GlobalStats) -> Element {
  rsx! {
    div {
      class: "global-bar",
      span { "Coins: " b { "{global.active_cryptocurrencies}" } }
      span { "Exchanges: " b { "{global.markets}" } }
      span {
        "Market cap: "
        b { "{usd(global.total_market_cap)}" }
        span { class: trend(global.market_cap_change_percentage_24h), " {pct(global.market_cap_change_percentage_24h)}" }
      }
      span { "24h vol: " b { "{usd(global.total_volume)}" } }
      span { "Dominance: " b { "BTC {pct(global.btc_dominance)} ETH {pct(global.eth_dominance)}" } }
    }
  }
}

#[component]
fn MarketRowView(coin: MarketRow) -> Element {
  let href = coin_path(&coin.id);
  rsx! {
    tr {
      td { "{coin.market_cap_rank}" },
      td {
        NavLink {
          class: "coin-cell",
          to: href,
          img { src: "{coin.image}", alt: "", width: "24", height: "24" }
          span { class: "coin-name", "{coin.name}" }
          span { class: "coin-symbol", "{coin.symbol.to_uppercase()}" }
        }
      },
      td { "{usd(coin.current_price)}" },
      td { class: trend(coin.change_1h), "{pct(coin.change_1h)}" },
      td { class: trend(coin.change_24h), "{pct(coin.change_24h)}" },
      td { class: trend(coin.change_7d), "{pct(coin.change_7d)}" },
      td { "{usd(coin.total_volume)}" },
      td { "{number(coin.market_cap)}" },
    }
  }
}
