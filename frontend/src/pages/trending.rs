use dioxus::prelude::*;

use crate::{
  components::{format::{pct, trend}, search::coin_path, template::NavLink},
  utils::normalize::TrendingView
};

#[component]
pub fn Trending(view: TrendingView) -> Element {
  rsx! {
    div {
      class: "trending-page",
      h1 { "Trending" }
      p { "Most searched coins and NFTs over the last 24 hours." }
      section {
        class: "trending-coins",
        h2 { "Coins" }
        if view.coins.is_empty() {
          p { class: "muted", "Nothing is trending right now." }
        }
        ol {
          for coin in view.coins.iter() {
            li {
              key: "{coin.id}",
              NavLink {
                class: "coin-cell",
                to: coin_path(&coin.id),
                img { src: "{coin.thumb}", alt: "", width: "24", height: "24" }
                span { class: "coin-name", "{coin.name}" }
                span { class: "coin-symbol", "{coin.symbol}" }
              }
              if !coin.price.is_empty() {
                span { class: "value", "{coin.price}" }
              }
              if coin.market_cap_rank > 0 {
                span { class: "rank-badge", "#{coin.market_cap_rank}" }
              }
            }
          }
        }
      }
      if !view.nfts.is_empty() {
        section {
          class: "trending-nfts",
          h2 { "NFTs" }
          table {
            class: "market-table",
            thead {
              tr {
                th { scope: "col", "Collection" },
                th { scope: "col", "Floor" },
                th { scope: "col", "24h" },
                th { scope: "col", "Volume" },
              }
            }
            tbody {
              for nft in view.nfts.iter() {
                tr {
                  key: "{nft.id}",
                  td {
                    img { src: "{nft.thumb}", alt: "", width: "20", height: "20" }
                    " {nft.name} "
                    span { class: "coin-symbol", "{nft.symbol}" }
                  },
                  td { "{nft.floor_price}" },
                  td { class: trend(nft.floor_price_change_24h), "{pct(nft.floor_price_change_24h)}" },
                  td { "{nft.volume_24h}" },
                }
              }
            }
          }
        }
      }
    }
  }
}
