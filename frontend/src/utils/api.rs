use std::{collections::HashMap, rc::Rc};
use dioxus::logger::tracing::{debug, warn};
use rust_decimal::Decimal;
use serde_json::Value;
use url::form_urlencoded;

use super::{
  normalize::{
    normalize_asset, normalize_exchanges, normalize_global, normalize_markets, normalize_prices,
    normalize_search, normalize_trending, ExchangeRow, GlobalStats, MarketRow, NormalizedAssetView,
    SearchHit, TrendingView
  },
  server::AppError,
  transport::{HttpRequest, Transport}
};

pub const API_KEY_PARAM: &str = "x_cg_demo_api_key";
pub const MARKETS_PER_PAGE: u32 = 100;
pub const EXCHANGES_PER_PAGE: u32 = 10;
pub const PRICED_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PricedHit {
  pub hit: SearchHit,
  // zero when the price lookup had nothing for this coin
  pub price: Decimal
}

#[derive(Clone)]
pub struct MarketApi {
  transport: Rc<dyn Transport>,
  base_url: String,
  api_key: Option<String>
}

impl MarketApi {
  pub fn new(transport: Rc<dyn Transport>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
    Self { transport, base_url: base_url.into().trim_end_matches('/').to_string(), api_key }
  }

  pub fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
      query.append_pair(name, value);
    }
    if let Some(key) = &self.api_key {
      query.append_pair(API_KEY_PARAM, key);
    }
    let query = query.finish();
    if query.is_empty() {
      format!("{}{}", self.base_url, path)
    } else {
      format!("{}{}?{}", self.base_url, path, query)
    }
  }

  async fn get_json(&self, url: String, what: &str) -> Result<Value, AppError> {
    debug!("GET {}", url);
    let resp = self.transport.send(HttpRequest::get(url)).await?;
    if !resp.is_success() {
      warn!("{} request failed with status {}", what, resp.status);
      return Err(AppError::from_status(resp.status, what));
    }
    resp.json()
  }

  pub fn markets_url(&self) -> String {
    let per_page = MARKETS_PER_PAGE.to_string();
    self.url("/coins/markets", &[
      ("vs_currency", "usd"),
      ("order", "market_cap_desc"),
      ("per_page", &per_page),
      ("page", "1"),
      ("sparkline", "false"),
      ("price_change_percentage", "1h,24h,7d")
    ])
  }

  pub async fn markets(&self) -> Result<Vec<MarketRow>, AppError> {
    let raw = self.get_json(self.markets_url(), "Market data").await?;
    normalize_markets(&raw)
  }

  pub async fn global(&self) -> Result<GlobalStats, AppError> {
    let raw = self.get_json(self.url("/global", &[]), "Global data").await?;
    normalize_global(&raw)
  }

  pub fn coin_url(&self, id: &str) -> String {
    self.url(&format!("/coins/{}", id), &[
      ("localization", "false"),
      ("tickers", "false"),
      ("market_data", "true"),
      ("community_data", "false"),
      ("developer_data", "false"),
      ("sparkline", "false")
    ])
  }

  pub async fn coin(&self, id: &str) -> Result<NormalizedAssetView, AppError> {
    let raw = self.get_json(self.coin_url(id), "Coin").await?;
    normalize_asset(&raw)
  }

  pub async fn trending(&self) -> Result<TrendingView, AppError> {
    let raw = self.get_json(self.url("/search/trending", &[]), "Trending data").await?;
    normalize_trending(&raw)
  }

  pub fn exchanges_url(&self) -> String {
    let per_page = EXCHANGES_PER_PAGE.to_string();
    self.url("/exchanges", &[("per_page", &per_page), ("page", "1")])
  }

  pub async fn exchanges(&self) -> Result<Vec<ExchangeRow>, AppError> {
    let raw = self.get_json(self.exchanges_url(), "Exchange data").await?;
    normalize_exchanges(&raw)
  }

  pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
    let query = query.trim();
    if query.is_empty() {
      return Ok(vec![]);
    }
    let raw = self.get_json(self.url("/search", &[("query", query)]), "Search results").await?;
    normalize_search(&raw)
  }

  // Top search hits with a spot price each. A failed price lookup still returns the hits.
  pub async fn search_priced(&self, query: &str) -> Result<Vec<PricedHit>, AppError> {
    let mut hits = self.search(query).await?;
    hits.truncate(PRICED_SEARCH_LIMIT);

    let ids: Vec<String> = hits.iter().map(|h| h.id.clone()).collect();
    let prices = self.simple_prices(&ids).await.unwrap_or_else(|e| {
      warn!("search prices unavailable: {}", e);
      HashMap::new()
    });

    Ok(hits.into_iter()
      .map(|hit| {
        let price = prices.get(&hit.id).copied().unwrap_or(Decimal::ZERO);
        PricedHit { hit, price }
      })
      .collect())
  }

  pub fn simple_prices_url(&self, ids: &[String]) -> String {
    let ids = ids.join(",");
    self.url("/simple/price", &[("ids", &ids), ("vs_currencies", "usd")])
  }

  pub async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, Decimal>, AppError> {
    if ids.is_empty() {
      return Ok(HashMap::new());
    }
    let raw = self.get_json(self.simple_prices_url(ids), "Price data").await?;
    normalize_prices(&raw)
  }
}

#[cfg(test)]
mod tests {
  use futures::executor::block_on;
  use rust_decimal_macros::dec;

  use super::*;
  use crate::utils::{browser::fakes::FakeTransport, server::ErrorKind};

  fn api(key: Option<&str>) -> (Rc<FakeTransport>, MarketApi) {
    let transport = Rc::new(FakeTransport::default());
    let api = MarketApi::new(transport.clone(), "https://api.test/v3/", key.map(str::to_string));
    (transport, api)
  }

  #[test]
  fn api_key_rides_along_as_a_query_param() {
    let (_, plain) = api(None);
    assert_eq!(plain.url("/global", &[]), "https://api.test/v3/global");

    let (_, keyed) = api(Some("k-1"));
    assert_eq!(keyed.url("/global", &[]), "https://api.test/v3/global?x_cg_demo_api_key=k-1");
    assert_eq!(keyed.url("/search", &[("query", "bit coin")]), "https://api.test/v3/search?query=bit+coin&x_cg_demo_api_key=k-1");
  }

  #[test]
  fn coin_detail_is_normalised() {
    let (transport, api) = api(None);
    transport.respond(&api.coin_url("bitcoin"), 200, r#"{"id":"bitcoin","name":"Bitcoin","market_data":{"current_price":{"usd":50000}}}"#);

    let view = block_on(api.coin("bitcoin")).unwrap();
    assert_eq!(view.name, "Bitcoin");
    assert_eq!(view.current_price, dec!(50000));
  }

  #[test]
  fn missing_coin_is_not_found() {
    let (_, api) = api(None);
    let err = block_on(api.coin("nope")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.user_message(), "Coin not found");
  }

  #[test]
  fn server_errors_are_transient() {
    let (transport, api) = api(None);
    transport.respond(&api.markets_url(), 503, "");
    let err = block_on(api.markets()).unwrap_err();
    assert_eq!(err, AppError::UpstreamStatus { status: 503, message: "Failed to fetch market data".into() });
  }

  #[test]
  fn bad_json_is_a_deserialize_error() {
    let (transport, api) = api(None);
    transport.respond(&api.url("/global", &[]), 200, "<html>");
    assert!(matches!(block_on(api.global()), Err(AppError::DeserializeError(_))));
  }

  #[test]
  fn empty_inputs_skip_the_network() {
    let (transport, api) = api(None);
    assert!(block_on(api.simple_prices(&[])).unwrap().is_empty());
    assert!(block_on(api.search("  ")).unwrap().is_empty());
    assert!(transport.sent_urls().is_empty());
  }

  #[test]
  fn simple_prices_join_ids() {
    let (transport, api) = api(None);
    let ids = vec!["bitcoin".to_string(), "ethereum".to_string()];
    transport.respond(&api.simple_prices_url(&ids), 200, r#"{"bitcoin":{"usd":1},"ethereum":{"usd":2}}"#);

    let prices = block_on(api.simple_prices(&ids)).unwrap();
    assert_eq!(prices.get("ethereum"), Some(&dec!(2)));
    assert!(transport.sent_urls()[0].contains("ids=bitcoin%2Cethereum"));
  }

  fn search_payload(count: usize) -> String {
    let coins: Vec<String> = (0..count)
      .map(|i| format!(r#"{{"id":"coin-{i}","name":"Coin {i}","symbol":"C{i}","thumb":""}}"#))
      .collect();
    format!(r#"{{"coins":[{}]}}"#, coins.join(","))
  }

  #[test]
  fn priced_search_keeps_the_top_ten() {
    let (transport, api) = api(None);
    transport.respond(&api.url("/search", &[("query", "coin")]), 200, &search_payload(12));
    let ids: Vec<String> = (0..10).map(|i| format!("coin-{i}")).collect();
    transport.respond(&api.simple_prices_url(&ids), 200, r#"{"coin-0":{"usd":3.5}}"#);

    let hits = block_on(api.search_priced("coin")).unwrap();
    assert_eq!(hits.len(), 10);
    assert_eq!(hits[0].price, dec!(3.5));
    assert_eq!(hits[9].hit.id, "coin-9");
    assert_eq!(hits[9].price, Decimal::ZERO);
  }

  #[test]
  fn priced_search_survives_a_price_failure() {
    let (transport, api) = api(None);
    transport.respond(&api.url("/search", &[("query", "coin")]), 200, &search_payload(2));

    let hits = block_on(api.search_priced("coin")).unwrap();
    assert_eq!(hits.iter().map(|h| h.hit.id.as_str()).collect::<Vec<_>>(), vec!["coin-0", "coin-1"]);
    assert!(hits.iter().all(|h| h.price.is_zero()));
    assert_eq!(transport.sent_urls().len(), 2);
  }
}
