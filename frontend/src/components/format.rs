use rust_decimal::Decimal;

fn group_thousands(value: Decimal) -> String {
  let raw = value.to_string();
  let (sign, unsigned) = match raw.strip_prefix('-') {
    Some(rest) => ("-", rest),
    None => ("", raw.as_str())
  };
  let (int_part, frac_part) = match unsigned.split_once('.') {
    Some((i, f)) => (i, Some(f)),
    None => (unsigned, None)
  };

  let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
  for (idx, ch) in int_part.chars().enumerate() {
    if idx > 0 && (int_part.len() - idx) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }

  match frac_part {
    Some(f) => format!("{}{}.{}", sign, grouped, f),
    None => format!("{}{}", sign, grouped)
  }
}

// Sub-dollar prices keep six places, everything else two.
pub fn usd(value: Decimal) -> String {
  let places = if value.abs() >= Decimal::ONE { 2 } else { 6 };
  format!("${}", group_thousands(value.round_dp(places)))
}

pub fn number(value: Decimal) -> String {
  group_thousands(value.round_dp(2))
}

pub fn pct(value: Decimal) -> String {
  format!("{}%", value.round_dp(2))
}

pub fn trend(value: Decimal) -> &'static str {
  if value.is_sign_negative() && !value.is_zero() { "down" } else { "up" }
}

// upstream dates are ISO timestamps, only the day is shown
pub fn day(timestamp: &str) -> &str {
  timestamp.split('T').next().unwrap_or_default()
}
