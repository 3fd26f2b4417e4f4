use std::{collections::BTreeMap, fmt};
use regex::{Captures, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutePatternId {
  Listing,
  AssetDetail,
  Trending,
  Portfolio,
  CapComparator,
  NotFound
}

impl fmt::Display for RoutePatternId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RoutePatternId::Listing => "listing",
      RoutePatternId::AssetDetail => "asset-detail",
      RoutePatternId::Trending => "trending",
      RoutePatternId::Portfolio => "portfolio",
      RoutePatternId::CapComparator => "cap-comparator",
      RoutePatternId::NotFound => "not-found"
    };
    write!(f, "{}", name)
  }
}

pub type RouteParams = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
  raw_path: String,
  pattern: RoutePatternId,
  params: RouteParams
}

impl RouteDescriptor {
  pub fn raw_path(&self) -> &str {
    &self.raw_path
  }

  pub fn pattern(&self) -> RoutePatternId {
    self.pattern
  }

  pub fn params(&self) -> &RouteParams {
    &self.params
  }

  pub fn param(&self, name: &str) -> Option<&str> {
    self.params.get(name).map(String::as_str)
  }

  pub fn is_not_found(&self) -> bool {
    self.pattern == RoutePatternId::NotFound
  }
}

struct RouteRule {
  pattern: RoutePatternId,
  regex: Regex,
  extract: fn(&Captures) -> RouteParams
}

impl RouteRule {
  fn new(pattern: RoutePatternId, re: &str, extract: fn(&Captures) -> RouteParams) -> Self {
    let regex = Regex::new(re).expect("static route pattern must compile");
    Self { pattern, regex, extract }
  }

  fn matches(&self, path: &str) -> bool {
    self.regex.is_match(path)
  }

  fn params(&self, path: &str) -> RouteParams {
    self.regex.captures(path).map(|caps| (self.extract)(&caps)).unwrap_or_default()
  }
}

fn no_params(_: &Captures) -> RouteParams {
  RouteParams::new()
}

// every named group that took part in the match becomes a param
fn named_params(caps: &Captures) -> RouteParams {
  let mut params = RouteParams::new();
  for name in ["id", "holding", "from", "to"] {
    if let Some(m) = caps.name(name) {
      params.insert(name.to_string(), m.as_str().to_string());
    }
  }
  params
}

// /coin/bitcoin/cash -> id=bitcoin-cash
fn slug_params(caps: &Captures) -> RouteParams {
  let mut params = RouteParams::new();
  if let Some(slug) = caps.name("slug") {
    params.insert("id".to_string(), slug.as_str().split('/').collect::<Vec<_>>().join("-"));
  }
  params
}

pub struct RouteTable {
  rules: Vec<RouteRule>
}

impl RouteTable {
  pub fn standard() -> Self {
    let rules = vec![
      RouteRule::new(RoutePatternId::Listing, r"^/$", no_params),
      RouteRule::new(RoutePatternId::AssetDetail, r"^/coin/(?P<id>[^/]+)$", named_params),
      RouteRule::new(RoutePatternId::AssetDetail, r"^/coin/(?P<slug>[\w-]+(?:/[\w-]+)+)$", slug_params),
      RouteRule::new(RoutePatternId::Trending, r"^/trending$", no_params),
      RouteRule::new(RoutePatternId::Portfolio, r"^/portfolio(?:/(?P<holding>[\w-]+))?$", named_params),
      RouteRule::new(RoutePatternId::CapComparator, r"^/marketcapof(?:/(?P<from>[\w-]+)(?:/(?P<to>[\w-]+))?)?$", named_params),
    ];
    Self { rules }
  }

  // Never fails: a path no rule accepts is a `NotFound` descriptor.
  pub fn resolve(&self, path: &str) -> RouteDescriptor {
    let raw_path = normalize_path(path);
    let matched = self.rules.iter().find(|rule| rule.matches(&raw_path));
    match matched {
      Some(rule) => {
        let params = rule.params(&raw_path);
        RouteDescriptor { pattern: rule.pattern, params, raw_path }
      },
      None => RouteDescriptor { pattern: RoutePatternId::NotFound, params: RouteParams::new(), raw_path }
    }
  }
}

// Canonical form used for matching and for history entries.
// `/trending/`, `/trending.html` and `//trending?x=1#top` all become `/trending`.
pub fn normalize_path(path: &str) -> String {
  let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
  let segments: Vec<&str> = path[..end].split('/').filter(|s| !s.is_empty()).collect();

  let mut segments: Vec<String> = segments.into_iter().map(str::to_string).collect();
  if let Some(last) = segments.last_mut() {
    if let Some(stem) = last.strip_suffix(".html") {
      *last = stem.to_string();
    }
  }
  if segments.last().map(|s| s == "index").unwrap_or(false) {
    segments.pop();
  }

  format!("/{}", segments.join("/"))
}
