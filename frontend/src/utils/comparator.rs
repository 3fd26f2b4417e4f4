use std::{cmp::Ordering, str::FromStr};
use rust_decimal::Decimal;

use super::normalize::MarketRow;

// rows offered by the picker before anything is typed
pub const PICKER_DEFAULT_ROWS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct CapComparison {
  // price of the subject if it had the reference's market cap
  pub hypothetical_price: Decimal,
  // hypothetical price over current price
  pub multiplier: Decimal
}

// "What would A cost with B's market cap": `B.market_cap / A.circulating_supply`.
// None when A has no supply or no price to compare against.
pub fn compare_caps(subject: &MarketRow, reference: &MarketRow) -> Option<CapComparison> {
  if subject.circulating_supply.is_zero() || subject.current_price.is_zero() {
    return None;
  }
  let hypothetical_price = reference.market_cap.checked_div(subject.circulating_supply)?;
  let multiplier = hypothetical_price.checked_div(subject.current_price)?;
  Some(CapComparison { hypothetical_price, multiplier })
}

pub fn find_row<'a>(rows: &'a [MarketRow], id: Option<&str>) -> Option<&'a MarketRow> {
  let id = id?;
  rows.iter().find(|row| row.id == id)
}

// `"1.5b"` -> 1_500_000_000, `"100m"`, `"250k"`, plain numbers as is.
pub fn parse_cap_amount(raw: &str) -> Option<Decimal> {
  let lower = raw.trim().to_lowercase();
  let digits: String = lower.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
  let amount = Decimal::from_str(&digits).ok()?;
  let scale = if lower.contains('b') {
    Decimal::from(1_000_000_000u64)
  } else if lower.contains('m') {
    Decimal::from(1_000_000u64)
  } else if lower.contains('k') {
    Decimal::from(1_000u64)
  } else {
    Decimal::ONE
  };
  amount.checked_mul(scale)
}

// Picker filter: name or symbol substring, or a market cap bound like `>1b` / `<100m`.
// An empty query gives the top of the list.
pub fn filter_rows<'a>(rows: &'a [MarketRow], query: &str) -> Vec<&'a MarketRow> {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return rows.iter().take(PICKER_DEFAULT_ROWS).collect();
  }

  let bound = query.strip_prefix('>').map(|rest| (Ordering::Greater, rest))
    .or_else(|| query.strip_prefix('<').map(|rest| (Ordering::Less, rest)))
    .and_then(|(side, rest)| parse_cap_amount(rest).map(|cap| (side, cap)));

  rows.iter()
    .filter(|row| {
      row.name.to_lowercase().contains(&query)
        || row.symbol.to_lowercase().contains(&query)
        || bound.is_some_and(|(side, cap)| row.market_cap.cmp(&cap) == side)
    })
    .collect()
}

// Filtered rows, with the current pick kept on top so the select never loses it.
pub fn picker_rows<'a>(rows: &'a [MarketRow], query: &str, selected: &str) -> Vec<&'a MarketRow> {
  let mut shown = filter_rows(rows, query);
  if let Some(pick) = find_row(rows, Some(selected)) {
    if !shown.iter().any(|row| row.id == pick.id) {
      shown.insert(0, pick);
    }
  }
  shown
}
