// absent or null upstream values become "", zero or []. Lookups try the upstream path
// first and the flat name second, so a serialised view reads back unchanged.

use std::{collections::HashMap, str::FromStr};
use dioxus::logger::tracing::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::server::AppError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetLinks {
  pub homepage: String,
  pub blockchain_site: String,
  pub official_forum_url: String,
  pub subreddit_url: String,
  pub twitter_screen_name: String,
  pub facebook_username: String,
  pub telegram_channel_identifier: String,
  pub github_repos: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedAssetView {
  pub id: String,
  pub symbol: String,
  pub name: String,
  pub image: String,
  pub current_price: Decimal,
  pub market_cap: Decimal,
  pub total_volume: Decimal,
  pub high_24h: Decimal,
  pub low_24h: Decimal,
  pub price_change_percentage_24h: Decimal,
  pub market_cap_rank: u32,
  pub circulating_supply: Decimal,
  pub total_supply: Decimal,
  pub max_supply: Decimal,
  pub ath: Decimal,
  pub ath_change_percentage: Decimal,
  pub ath_date: String,
  pub atl: Decimal,
  pub atl_change_percentage: Decimal,
  pub atl_date: String,
  pub description: String,
  pub links: AssetLinks
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketRow {
  pub id: String,
  pub symbol: String,
  pub name: String,
  pub image: String,
  pub current_price: Decimal,
  pub market_cap: Decimal,
  pub market_cap_rank: u32,
  pub total_volume: Decimal,
  pub circulating_supply: Decimal,
  pub change_1h: Decimal,
  pub change_24h: Decimal,
  pub change_7d: Decimal
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalStats {
  pub active_cryptocurrencies: u64,
  pub markets: u64,
  pub total_market_cap: Decimal,
  pub total_volume: Decimal,
  pub market_cap_change_percentage_24h: Decimal,
  pub btc_dominance: Decimal,
  pub eth_dominance: Decimal
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendingCoin {
  pub id: String,
  pub name: String,
  pub symbol: String,
  pub thumb: String,
  pub market_cap_rank: u32,
  pub price_btc: Decimal,
  pub price: String,
  pub market_cap: String,
  pub total_volume: String
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendingNft {
  pub id: String,
  pub name: String,
  pub symbol: String,
  pub thumb: String,
  pub floor_price: String,
  pub floor_price_change_24h: Decimal,
  pub volume_24h: String
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendingView {
  pub coins: Vec<TrendingCoin>,
  pub nfts: Vec<TrendingNft>
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExchangeRow {
  pub id: String,
  pub name: String,
  pub country: String,
  pub url: String,
  pub image: String,
  pub trust_score: u32,
  pub trust_score_rank: u32,
  pub trade_volume_24h_btc: Decimal
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchHit {
  pub id: String,
  pub name: String,
  pub symbol: String,
  pub thumb: String,
  pub market_cap_rank: u32
}

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
  path.split('.').try_fold(raw, |value, key| value.get(key)).filter(|v| !v.is_null())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
  let s = s.trim();
  if s.contains(|c| c == 'e' || c == 'E') {
    Decimal::from_scientific(s).ok()
  } else {
    Decimal::from_str(s).ok()
  }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
  match value {
    Value::Number(n) => parse_decimal(&n.to_string()),
    Value::String(s) => parse_decimal(s),
    _ => None
  }
}

fn text(raw: &Value, paths: &[&str]) -> String {
  paths.iter()
    .find_map(|p| lookup(raw, p).and_then(Value::as_str))
    .unwrap_or_default()
    .to_string()
}

// upstream sometimes sends a number where a label is expected
fn label(raw: &Value, paths: &[&str]) -> String {
  paths.iter()
    .find_map(|p| match lookup(raw, p) {
      Some(Value::String(s)) => Some(s.clone()),
      Some(Value::Number(n)) => Some(n.to_string()),
      _ => None
    })
    .unwrap_or_default()
}

// link fields arrive either as a string or as a list padded with empty strings
fn first_text(raw: &Value, paths: &[&str]) -> String {
  paths.iter()
    .find_map(|p| match lookup(raw, p) {
      Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
      Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).find(|s| !s.is_empty()).map(str::to_string),
      _ => None
    })
    .unwrap_or_default()
}

fn strings(raw: &Value, paths: &[&str]) -> Vec<String> {
  paths.iter()
    .find_map(|p| lookup(raw, p).and_then(Value::as_array))
    .map(|items| items.iter().filter_map(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string).collect())
    .unwrap_or_default()
}

fn decimal(raw: &Value, paths: &[&str]) -> Decimal {
  paths.iter().find_map(|p| lookup(raw, p).and_then(as_decimal)).unwrap_or(Decimal::ZERO)
}

fn count(raw: &Value, paths: &[&str]) -> u64 {
  paths.iter()
    .find_map(|p| match lookup(raw, p) {
      Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
      Some(Value::String(s)) => s.trim().parse().ok(),
      _ => None
    })
    .unwrap_or(0)
}

fn rank(raw: &Value, paths: &[&str]) -> u32 {
  u32::try_from(count(raw, paths)).unwrap_or(u32::MAX)
}

// Coin detail payload (or an already normalised view) into the fixed schema.
// A payload without an id is not a coin and is rejected.
pub fn normalize_asset(raw: &Value) -> Result<NormalizedAssetView, AppError> {
  let id = text(raw, &["id"]);
  if id.is_empty() {
    return Err(AppError::MalformedPayload("coin payload has no id".to_string()));
  }

  Ok(NormalizedAssetView {
    id,
    symbol: text(raw, &["symbol"]),
    name: text(raw, &["name"]),
    image: text(raw, &["image.large", "image"]),
    current_price: decimal(raw, &["market_data.current_price.usd", "current_price"]),
    market_cap: decimal(raw, &["market_data.market_cap.usd", "market_cap"]),
    total_volume: decimal(raw, &["market_data.total_volume.usd", "total_volume"]),
    high_24h: decimal(raw, &["market_data.high_24h.usd", "high_24h"]),
    low_24h: decimal(raw, &["market_data.low_24h.usd", "low_24h"]),
    price_change_percentage_24h: decimal(raw, &["market_data.price_change_percentage_24h", "price_change_percentage_24h"]),
    market_cap_rank: rank(raw, &["market_cap_rank"]),
    circulating_supply: decimal(raw, &["market_data.circulating_supply", "circulating_supply"]),
    total_supply: decimal(raw, &["market_data.total_supply", "total_supply"]),
    max_supply: decimal(raw, &["market_data.max_supply", "max_supply"]),
    ath: decimal(raw, &["market_data.ath.usd", "ath"]),
    ath_change_percentage: decimal(raw, &["market_data.ath_change_percentage.usd", "ath_change_percentage"]),
    ath_date: text(raw, &["market_data.ath_date.usd", "ath_date"]),
    atl: decimal(raw, &["market_data.atl.usd", "atl"]),
    atl_change_percentage: decimal(raw, &["market_data.atl_change_percentage.usd", "atl_change_percentage"]),
    atl_date: text(raw, &["market_data.atl_date.usd", "atl_date"]),
    description: text(raw, &["description.en", "description"]),
    links: AssetLinks {
      homepage: first_text(raw, &["links.homepage"]),
      blockchain_site: first_text(raw, &["links.blockchain_site"]),
      official_forum_url: first_text(raw, &["links.official_forum_url"]),
      subreddit_url: first_text(raw, &["links.subreddit_url"]),
      twitter_screen_name: first_text(raw, &["links.twitter_screen_name"]),
      facebook_username: first_text(raw, &["links.facebook_username"]),
      telegram_channel_identifier: first_text(raw, &["links.telegram_channel_identifier"]),
      github_repos: strings(raw, &["links.repos_url.github", "links.github_repos"])
    }
  })
}

fn normalize_market_row(raw: &Value) -> Option<MarketRow> {
  let id = text(raw, &["id"]);
  if id.is_empty() {
    return None;
  }
  Some(MarketRow {
    id,
    symbol: text(raw, &["symbol"]),
    name: text(raw, &["name"]),
    image: text(raw, &["image"]),
    current_price: decimal(raw, &["current_price"]),
    market_cap: decimal(raw, &["market_cap"]),
    market_cap_rank: rank(raw, &["market_cap_rank"]),
    total_volume: decimal(raw, &["total_volume"]),
    circulating_supply: decimal(raw, &["circulating_supply"]),
    change_1h: decimal(raw, &["price_change_percentage_1h_in_currency", "change_1h"]),
    change_24h: decimal(raw, &["price_change_percentage_24h_in_currency", "price_change_percentage_24h", "change_24h"]),
    change_7d: decimal(raw, &["price_change_percentage_7d_in_currency", "change_7d"])
  })
}

pub fn normalize_markets(raw: &Value) -> Result<Vec<MarketRow>, AppError> {
  let rows = raw.as_array().ok_or_else(|| AppError::MalformedPayload("markets payload is not a list".to_string()))?;
  let normalized: Vec<MarketRow> = rows.iter().filter_map(normalize_market_row).collect();
  if normalized.len() < rows.len() {
    warn!("dropped {} market rows without an id", rows.len() - normalized.len());
  }
  Ok(normalized)
}

pub fn normalize_global(raw: &Value) -> Result<GlobalStats, AppError> {
  let data = raw.get("data").filter(|d| d.is_object())
    .ok_or_else(|| AppError::MalformedPayload("global payload has no data".to_string()))?;
  Ok(GlobalStats {
    active_cryptocurrencies: count(data, &["active_cryptocurrencies"]),
    markets: count(data, &["markets"]),
    total_market_cap: decimal(data, &["total_market_cap.usd"]),
    total_volume: decimal(data, &["total_volume.usd"]),
    market_cap_change_percentage_24h: decimal(data, &["market_cap_change_percentage_24h_usd"]),
    btc_dominance: decimal(data, &["market_cap_percentage.btc"]),
    eth_dominance: decimal(data, &["market_cap_percentage.eth"])
  })
}

pub fn normalize_trending(raw: &Value) -> Result<TrendingView, AppError> {
  if !raw.is_object() {
    return Err(AppError::MalformedPayload("trending payload is not an object".to_string()));
  }
  let empty = vec![];

  let coins = raw.get("coins").and_then(Value::as_array).unwrap_or(&empty).iter()
    .filter_map(|entry| {
      let item = entry.get("item").unwrap_or(entry);
      let id = text(item, &["id"]);
      (!id.is_empty()).then(|| TrendingCoin {
        id,
        name: text(item, &["name"]),
        symbol: text(item, &["symbol"]),
        thumb: text(item, &["large", "thumb"]),
        market_cap_rank: rank(item, &["market_cap_rank"]),
        price_btc: decimal(item, &["data.price_btc", "price_btc"]),
        price: label(item, &["data.price", "price"]),
        market_cap: label(item, &["data.market_cap", "market_cap"]),
        total_volume: label(item, &["data.total_volume", "total_volume"])
      })
    })
    .collect();

  let nfts = raw.get("nfts").and_then(Value::as_array).unwrap_or(&empty).iter()
    .filter_map(|nft| {
      let id = text(nft, &["id"]);
      (!id.is_empty()).then(|| TrendingNft {
        id,
        name: text(nft, &["name"]),
        symbol: text(nft, &["symbol"]),
        thumb: text(nft, &["thumb"]),
        floor_price: label(nft, &["data.floor_price", "floor_price"]),
        floor_price_change_24h: decimal(nft, &["floor_price_24h_percentage_change", "floor_price_change_24h"]),
        volume_24h: label(nft, &["data.h24_volume", "volume_24h"])
      })
    })
    .collect();

  Ok(TrendingView { coins, nfts })
}

pub fn normalize_exchanges(raw: &Value) -> Result<Vec<ExchangeRow>, AppError> {
  let rows = raw.as_array().ok_or_else(|| AppError::MalformedPayload("exchanges payload is not a list".to_string()))?;
  Ok(rows.iter()
    .filter_map(|row| {
      let id = text(row, &["id"]);
      (!id.is_empty()).then(|| ExchangeRow {
        id,
        name: text(row, &["name"]),
        country: text(row, &["country"]),
        url: text(row, &["url"]),
        image: text(row, &["image"]),
        trust_score: rank(row, &["trust_score"]),
        trust_score_rank: rank(row, &["trust_score_rank"]),
        trade_volume_24h_btc: decimal(row, &["trade_volume_24h_btc"])
      })
    })
    .collect())
}

// `{"bitcoin": {"usd": 67000.1}}` -> `bitcoin => 67000.1`
pub fn normalize_prices(raw: &Value) -> Result<HashMap<String, Decimal>, AppError> {
  let map = raw.as_object().ok_or_else(|| AppError::MalformedPayload("price payload is not an object".to_string()))?;
  Ok(map.iter()
    .map(|(id, quote)| (id.clone(), decimal(quote, &["usd"])))
    .collect())
}

pub fn normalize_search(raw: &Value) -> Result<Vec<SearchHit>, AppError> {
  let coins = raw.get("coins").and_then(Value::as_array)
    .ok_or_else(|| AppError::MalformedPayload("search payload has no coins".to_string()))?;
  Ok(coins.iter()
    .filter_map(|coin| {
      let id = text(coin, &["id"]);
      (!id.is_empty()).then(|| SearchHit {
        id,
        name: text(coin, &["name"]),
        symbol: text(coin, &["symbol"]),
        thumb: text(coin, &["thumb"]),
        market_cap_rank: rank(coin, &["market_cap_rank"])
      })
    })
    .collect())
}
