use std::{collections::HashMap, rc::Rc};
use dioxus::logger::tracing::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{browser::KeyValueStore, server::AppError};

pub const HOLDINGS_KEY: &str = "coinprice.portfolio";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
  pub id: String,
  pub coin_id: String,
  pub coin_name: String,
  pub symbol: String,
  pub amount: Decimal
}

#[derive(Debug, Clone)]
pub struct NewHolding {
  pub coin_id: String,
  pub coin_name: String,
  pub symbol: String,
  pub amount: Decimal
}

#[derive(Clone)]
pub struct HoldingsStore {
  store: Rc<dyn KeyValueStore>
}

impl HoldingsStore {
  pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  pub fn list(&self) -> Vec<Holding> {
    let Some(raw) = self.store.get(HOLDINGS_KEY) else {
      return vec![];
    };
    match serde_json::from_str::<Vec<Holding>>(&raw) {
      Ok(holdings) => holdings,
      Err(e) => {
        warn!("ignoring unreadable holdings: {}", e);
        vec![]
      }
    }
  }

  pub fn create(&self, new: NewHolding) -> Result<Holding, AppError> {
    if new.amount <= Decimal::ZERO {
      return Err(AppError::StorageError("holding amount must be positive".to_string()));
    }
    let holding = Holding {
      id: Uuid::new_v4().to_string(),
      coin_id: new.coin_id,
      coin_name: new.coin_name,
      symbol: new.symbol,
      amount: new.amount
    };
    let mut holdings = self.list();
    holdings.push(holding.clone());
    self.save(&holdings)?;
    Ok(holding)
  }

  // false when nothing had that id
  pub fn delete(&self, id: &str) -> Result<bool, AppError> {
    let mut holdings = self.list();
    let before = holdings.len();
    holdings.retain(|h| h.id != id);
    if holdings.len() == before {
      return Ok(false);
    }
    self.save(&holdings)?;
    Ok(true)
  }

  fn save(&self, holdings: &[Holding]) -> Result<(), AppError> {
    let raw = serde_json::to_string(holdings).map_err(|e| AppError::StorageError(e.to_string()))?;
    self.store.set(HOLDINGS_KEY, &raw)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValue {
  pub holding: Holding,
  pub price: Decimal,
  pub value: Decimal
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioView {
  pub rows: Vec<HoldingValue>,
  pub total_value: Decimal
}

// Prices missing from the quote count as zero.
pub fn value_portfolio(holdings: Vec<Holding>, prices: &HashMap<String, Decimal>) -> PortfolioView {
  let rows: Vec<HoldingValue> = holdings.into_iter()
    .map(|holding| {
      let price = prices.get(&holding.coin_id).copied().unwrap_or(Decimal::ZERO);
      let value = price.checked_mul(holding.amount).unwrap_or(Decimal::MAX);
      HoldingValue { holding, price, value }
    })
    .collect();
  let total_value = rows.iter().fold(Decimal::ZERO, |acc, row| acc.saturating_add(row.value));
  PortfolioView { rows, total_value }
}
