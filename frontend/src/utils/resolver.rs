// Boot signals, first hit wins: `?path=` from the host redirect, the session stash left by
// index.html, then the address bar. Single use, rewritten with replace.

use dioxus::logger::tracing::{info, warn};
use url::form_urlencoded;

use super::{
  browser::{BrowserHistory, KeyValueStore},
  routes::{normalize_path, RouteDescriptor, RouteTable}
};

// session storage key written by the boot script
pub const STASH_KEY: &str = "spa_navigation_path";
// query parameter written by the host's not-found redirect
pub const RECOVERY_PARAM: &str = "path";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySource {
  QueryParam,
  SessionStash,
  AddressBar,
  Root
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub descriptor: RouteDescriptor,
  pub source: RecoverySource
}

pub struct RouteResolver<'a> {
  table: &'a RouteTable,
  history: &'a dyn BrowserHistory,
  session: &'a dyn KeyValueStore
}

impl<'a> RouteResolver<'a> {
  pub fn new(table: &'a RouteTable, history: &'a dyn BrowserHistory, session: &'a dyn KeyValueStore) -> Self {
    Self { table, history, session }
  }

  pub fn resolve(self) -> Resolution {
    let (query_path, remaining_query) = split_recovery_param(&self.history.search());

    // taken out unconditionally so a later reload of this tab can never replay it
    let stashed = self.session.get(STASH_KEY);
    if stashed.is_some() {
      self.session.remove(STASH_KEY);
    }

    let resolution = if let Some(path) = query_path.filter(|p| is_local_path(p)) {
      self.adopt(&path, &remaining_query, RecoverySource::QueryParam)
    } else if let Some(stashed) = stashed.filter(|p| is_local_path(p)) {
      // the boot script stores pathname + search, the search wins over the root's own
      let (path, stashed_query) = stashed.split_once('?').unwrap_or((stashed.as_str(), ""));
      let (_, stashed_query) = split_recovery_param(stashed_query);
      let query = if stashed_query.is_empty() { remaining_query } else { stashed_query };
      self.adopt(path, &query, RecoverySource::SessionStash)
    } else {
      let visible = self.history.pathname();
      let source = if normalize_path(&visible) == "/" { RecoverySource::Root } else { RecoverySource::AddressBar };
      self.adopt(&visible, &remaining_query, source)
    };

    info!("boot route {} ({}) recovered from {:?}", resolution.descriptor.raw_path(), resolution.descriptor.pattern(), resolution.source);
    resolution
  }

  fn adopt(&self, path: &str, remaining_query: &str, source: RecoverySource) -> Resolution {
    let descriptor = self.table.resolve(path);
    let target = format!("{}{}", descriptor.raw_path(), remaining_query);
    let visible = format!("{}{}", self.history.pathname(), self.history.search());

    if visible != target {
      if let Err(e) = self.history.replace(&target) {
        warn!("could not rewrite address bar to {}: {}", target, e);
      }
    }
    Resolution { descriptor, source }
  }
}

// Only same-origin absolute paths are accepted; `//host/...` would leave the site.
fn is_local_path(path: &str) -> bool {
  path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

// Splits `?path=/coin/x&ref=tw` into (`Some("/coin/x")`, `"?ref=tw"`).
fn split_recovery_param(search: &str) -> (Option<String>, String) {
  let query = search.trim_start_matches('?');
  if query.is_empty() {
    return (None, String::new());
  }

  let mut recovered = None;
  let mut rest = form_urlencoded::Serializer::new(String::new());
  let mut kept = 0;
  for (key, value) in form_urlencoded::parse(query.as_bytes()) {
    if key == RECOVERY_PARAM {
      if recovered.is_none() && !value.is_empty() {
        recovered = Some(value.into_owned());
      }
    } else {
      rest.append_pair(&key, &value);
      kept += 1;
    }
  }

  let remaining = if kept == 0 { String::new() } else { format!("?{}", rest.finish()) };
  (recovered, remaining)
}
