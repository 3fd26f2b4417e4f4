use dioxus::logger::tracing::warn;
use futures::future::{join, try_join, FutureExt, LocalBoxFuture};

use super::{
  api::MarketApi,
  holdings::{value_portfolio, HoldingsStore, PortfolioView},
  normalize::{ExchangeRow, GlobalStats, MarketRow, NormalizedAssetView, TrendingView},
  orchestrator::{Loader, RequestKey},
  server::AppError
};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewModel {
  Listing { coins: Vec<MarketRow>, global: GlobalStats },
  Asset { view: NormalizedAssetView, exchanges: Vec<ExchangeRow> },
  Trending(TrendingView),
  Portfolio(PortfolioView),
  Comparator { coins: Vec<MarketRow> }
}

#[derive(Clone)]
pub struct DashboardLoader {
  api: MarketApi,
  holdings: HoldingsStore
}

impl DashboardLoader {
  pub fn new(api: MarketApi, holdings: HoldingsStore) -> Self {
    Self { api, holdings }
  }

  async fn listing(&self) -> Result<ViewModel, AppError> {
    let (coins, global) = try_join(self.api.markets(), self.api.global()).await?;
    Ok(ViewModel::Listing { coins, global })
  }

  // the exchange table is decoration, a failure there does not fail the page
  async fn asset(&self, id: &str) -> Result<ViewModel, AppError> {
    let (view, exchanges) = join(self.api.coin(id), self.api.exchanges()).await;
    let exchanges = exchanges.unwrap_or_else(|e| {
      warn!("exchange list unavailable: {}", e);
      vec![]
    });
    Ok(ViewModel::Asset { view: view?, exchanges })
  }

  async fn portfolio(&self) -> Result<ViewModel, AppError> {
    let holdings = self.holdings.list();
    let mut ids: Vec<String> = holdings.iter().map(|h| h.coin_id.clone()).collect();
    ids.sort();
    ids.dedup();
    let prices = self.api.simple_prices(&ids).await?;
    Ok(ViewModel::Portfolio(value_portfolio(holdings, &prices)))
  }
}

impl Loader for DashboardLoader {
  fn load(&self, key: &RequestKey) -> LocalBoxFuture<'_, Result<ViewModel, AppError>> {
    let key = key.clone();
    async move {
      match key {
        RequestKey::Listing => self.listing().await,
        RequestKey::Asset(id) => self.asset(&id).await,
        RequestKey::Trending => Ok(ViewModel::Trending(self.api.trending().await?)),
        RequestKey::Portfolio => self.portfolio().await,
        RequestKey::Markets => Ok(ViewModel::Comparator { coins: self.api.markets().await? })
      }
    }.boxed_local()
  }
}

#[cfg(test)]
mod tests {
  use std::rc::Rc;
  use futures::executor::block_on;
  use rust_decimal_macros::dec;

  use super::*;
  use crate::utils::{
    browser::{fakes::FakeTransport, MemoryStore},
    holdings::NewHolding,
    server::ErrorKind
  };

  fn setup() -> (Rc<FakeTransport>, MarketApi, HoldingsStore, DashboardLoader) {
    let transport = Rc::new(FakeTransport::default());
    let api = MarketApi::new(transport.clone(), "https://api.test", None);
    let holdings = HoldingsStore::new(Rc::new(MemoryStore::default()));
    let loader = DashboardLoader::new(api.clone(), holdings.clone());
    (transport, api, holdings, loader)
  }

  #[test]
  fn listing_needs_markets_and_global() {
    let (transport, api, _, loader) = setup();
    transport.respond(&api.markets_url(), 200, r#"[{"id":"bitcoin","current_price":1}]"#);
    transport.respond(&api.url("/global", &[]), 200, r#"{"data":{"markets":900}}"#);

    match block_on(loader.load(&RequestKey::Listing)).unwrap() {
      ViewModel::Listing { coins, global } => {
        assert_eq!(coins.len(), 1);
        assert_eq!(global.markets, 900);
      }
      other => panic!("unexpected view model {:?}", other)
    }
  }

  #[test]
  fn asset_survives_missing_exchanges() {
    let (transport, api, _, loader) = setup();
    transport.respond(&api.coin_url("bitcoin"), 200, r#"{"id":"bitcoin"}"#);

    let model = block_on(loader.load(&RequestKey::Asset("bitcoin".into()))).unwrap();
    assert!(matches!(model, ViewModel::Asset { ref exchanges, .. } if exchanges.is_empty()));
  }

  #[test]
  fn unknown_asset_is_not_found() {
    let (_, _, _, loader) = setup();
    let err = block_on(loader.load(&RequestKey::Asset("nope".into()))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[test]
  fn empty_portfolio_makes_no_requests() {
    let (transport, _, _, loader) = setup();
    let model = block_on(loader.load(&RequestKey::Portfolio)).unwrap();
    assert_eq!(model, ViewModel::Portfolio(PortfolioView::default()));
    assert!(transport.sent_urls().is_empty());
  }

  #[test]
  fn portfolio_quotes_each_coin_once() {
    let (transport, api, holdings, loader) = setup();
    for amount in [dec!(1), dec!(2)] {
      holdings.create(NewHolding { coin_id: "bitcoin".into(), coin_name: "Bitcoin".into(), symbol: "btc".into(), amount }).unwrap();
    }
    transport.respond(&api.simple_prices_url(&["bitcoin".to_string()]), 200, r#"{"bitcoin":{"usd":10}}"#);

    match block_on(loader.load(&RequestKey::Portfolio)).unwrap() {
      ViewModel::Portfolio(view) => assert_eq!(view.total_value, dec!(30)),
      other => panic!("unexpected view model {:?}", other)
    }
    assert_eq!(transport.sent_urls().len(), 1);
  }
}
