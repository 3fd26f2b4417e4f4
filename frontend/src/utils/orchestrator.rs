// A settlement lands only if its tagged sequence is still the navigation's current one.

use std::{cell::RefCell, collections::HashMap, fmt, rc::{Rc, Weak}};
use dioxus::logger::tracing::{debug, info, warn};
use futures::future::{FutureExt, LocalBoxFuture};
use tokio::sync::watch;

use super::{
  loader::ViewModel,
  navigation::{NavigationController, NavigationState},
  routes::{RouteDescriptor, RoutePatternId},
  server::{AppError, ErrorKind}
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
  Listing,
  Asset(String),
  Trending,
  Portfolio,
  Markets
}

impl RequestKey {
  // None for routes that load nothing.
  pub fn for_route(descriptor: &RouteDescriptor) -> Option<Self> {
    match descriptor.pattern() {
      RoutePatternId::Listing => Some(RequestKey::Listing),
      RoutePatternId::AssetDetail => descriptor.param("id").map(|id| RequestKey::Asset(id.to_string())),
      RoutePatternId::Trending => Some(RequestKey::Trending),
      RoutePatternId::Portfolio => Some(RequestKey::Portfolio),
      RoutePatternId::CapComparator => Some(RequestKey::Markets),
      RoutePatternId::NotFound => None
    }
  }
}

impl fmt::Display for RequestKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RequestKey::Listing => write!(f, "listing"),
      RequestKey::Asset(id) => write!(f, "asset:{}", id),
      RequestKey::Trending => write!(f, "trending"),
      RequestKey::Portfolio => write!(f, "portfolio"),
      RequestKey::Markets => write!(f, "markets")
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
  Idle,
  Loading { key: RequestKey },
  Success { key: RequestKey, data: T },
  Error { key: RequestKey, kind: ErrorKind, message: String }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
  pub key: RequestKey,
  pub sequence: u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
  Accepted,
  Discarded
}

pub trait Loader {
  fn load(&self, key: &RequestKey) -> LocalBoxFuture<'_, Result<ViewModel, AppError>>;
}

type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

struct Inner {
  loader: Rc<dyn Loader>,
  navigation: NavigationController,
  states: RefCell<HashMap<RequestKey, FetchState<ViewModel>>>,
  // key -> sequence the pending request currently answers for
  in_flight: RefCell<HashMap<RequestKey, u64>>,
  revision: watch::Sender<u64>,
  spawner: RefCell<Option<Spawner>>
}

#[derive(Clone)]
pub struct DataOrchestrator {
  inner: Rc<Inner>
}

impl PartialEq for DataOrchestrator {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.inner, &other.inner)
  }
}

impl DataOrchestrator {
  pub fn new(loader: Rc<dyn Loader>, navigation: NavigationController) -> Self {
    let (revision, _) = watch::channel(0);
    let inner = Inner {
      loader,
      navigation,
      states: RefCell::new(HashMap::new()),
      in_flight: RefCell::new(HashMap::new()),
      revision,
      spawner: RefCell::new(None)
    };
    Self { inner: Rc::new(inner) }
  }

  pub fn attach(&self, spawner: impl Fn(LocalBoxFuture<'static, ()>) + 'static) {
    *self.inner.spawner.borrow_mut() = Some(Rc::new(spawner));
    let weak: Weak<Inner> = Rc::downgrade(&self.inner);
    self.inner.navigation.subscribe(move |state| {
      if let Some(inner) = weak.upgrade() {
        DataOrchestrator { inner }.on_route(state);
      }
    });
    self.on_route(&self.inner.navigation.current());
  }

  // Fetches the current route again, e.g. after local data behind it changed.
  pub fn reload(&self) {
    self.on_route(&self.inner.navigation.current());
  }

  fn on_route(&self, state: &NavigationState) {
    if let Some(dispatch) = self.begin(&state.current, state.sequence()) {
      self.spawn(dispatch);
    }
  }

  fn spawn(&self, dispatch: Dispatch) {
    let spawner = self.inner.spawner.borrow().clone();
    match spawner {
      Some(spawn) => spawn(self.clone().run(dispatch).boxed_local()),
      None => warn!("no spawner attached, {} not fetched", dispatch.key)
    }
  }

  // Synchronous half of a route change. Marks the key loading and returns the request to
  // issue, or None when nothing needs to go out.
  pub fn begin(&self, descriptor: &RouteDescriptor, sequence: u64) -> Option<Dispatch> {
    let key = RequestKey::for_route(descriptor);
    self.release_except(key.as_ref());
    let key = key?;

    {
      let mut in_flight = self.inner.in_flight.borrow_mut();
      if let Some(tagged) = in_flight.get_mut(&key) {
        debug!("{} already in flight, retagged #{} -> #{}", key, tagged, sequence);
        *tagged = sequence;
        return None;
      }
      in_flight.insert(key.clone(), sequence);
    }

    self.inner.states.borrow_mut().insert(key.clone(), FetchState::Loading { key: key.clone() });
    self.bump();
    debug!("dispatch {} for route #{}", key, sequence);
    Some(Dispatch { key, sequence })
  }

  // a settled state is only ever read while its route is on screen, and a revisit refetches
  fn release_except(&self, keep: Option<&RequestKey>) {
    let in_flight = self.inner.in_flight.borrow();
    self.inner.states.borrow_mut().retain(|key, _| Some(key) == keep || in_flight.contains_key(key));
  }

  pub async fn run(self, dispatch: Dispatch) {
    let loader = self.inner.loader.clone();
    let result = loader.load(&dispatch.key).await;
    self.settle(dispatch, result);
  }

  pub fn settle(&self, dispatch: Dispatch, result: Result<ViewModel, AppError>) -> Settlement {
    let tagged = self.inner.in_flight.borrow_mut().remove(&dispatch.key);
    let current = self.inner.navigation.sequence();
    if tagged != Some(current) {
      debug!("discarding stale {} (route #{:?}, now #{})", dispatch.key, tagged, current);
      return Settlement::Discarded;
    }

    let key = dispatch.key;
    let next = match result {
      Ok(data) => {
        info!("loaded {}", key);
        FetchState::Success { key: key.clone(), data }
      }
      Err(e) => {
        warn!("{} failed: {}", key, e);
        FetchState::Error { key: key.clone(), kind: e.kind(), message: e.user_message() }
      }
    };
    self.inner.states.borrow_mut().insert(key, next);
    self.bump();
    Settlement::Accepted
  }

  pub fn state(&self) -> FetchState<ViewModel> {
    match RequestKey::for_route(&self.inner.navigation.current().current) {
      Some(key) => self.state_for(&key),
      None => FetchState::Idle
    }
  }

  pub fn state_for(&self, key: &RequestKey) -> FetchState<ViewModel> {
    self.inner.states.borrow().get(key).cloned().unwrap_or(FetchState::Idle)
  }

  // Ticks once per visible state transition.
  pub fn revisions(&self) -> watch::Receiver<u64> {
    self.inner.revision.subscribe()
  }

  pub fn revision(&self) -> u64 {
    *self.inner.revision.borrow()
  }

  fn bump(&self) {
    self.inner.revision.send_modify(|r| *r += 1);
  }
}

#[cfg(test)]
mod tests {
  use futures::{
    channel::oneshot,
    executor::LocalPool,
    task::LocalSpawnExt
  };

  use super::*;
  use crate::utils::{
    browser::fakes::FakeHistory,
    normalize::{NormalizedAssetView, TrendingView},
    routes::RouteTable
  };

  type Reply = Result<ViewModel, AppError>;

  // Each load parks until the test answers it.
  #[derive(Default)]
  struct FakeLoader {
    pending: RefCell<Vec<(RequestKey, oneshot::Sender<Reply>)>>,
    calls: RefCell<Vec<RequestKey>>
  }

  impl FakeLoader {
    fn answer(&self, key: &RequestKey, reply: Reply) {
      let mut pending = self.pending.borrow_mut();
      let idx = pending.iter().position(|(k, _)| k == key).expect("no pending load for key");
      let (_, tx) = pending.remove(idx);
      let _ = tx.send(reply);
    }

    fn calls(&self) -> Vec<RequestKey> {
      self.calls.borrow().clone()
    }
  }

  impl Loader for FakeLoader {
    fn load(&self, key: &RequestKey) -> LocalBoxFuture<'_, Reply> {
      let (tx, rx) = oneshot::channel();
      self.pending.borrow_mut().push((key.clone(), tx));
      self.calls.borrow_mut().push(key.clone());
      async move { rx.await.unwrap_or_else(|_| Err(AppError::Network("dropped".into()))) }.boxed_local()
    }
  }

  fn asset(id: &str) -> ViewModel {
    ViewModel::Asset { view: NormalizedAssetView { id: id.into(), ..Default::default() }, exchanges: vec![] }
  }

  fn key(id: &str) -> RequestKey {
    RequestKey::Asset(id.into())
  }

  struct Harness {
    pool: LocalPool,
    loader: Rc<FakeLoader>,
    nav: NavigationController,
    orch: DataOrchestrator
  }

  fn harness(path: &str) -> Harness {
    let table = RouteTable::standard();
    let initial = table.resolve(path);
    let nav = NavigationController::new(table, Rc::new(FakeHistory::at(path)), initial);
    let loader = Rc::new(FakeLoader::default());
    let orch = DataOrchestrator::new(loader.clone(), nav.clone());
    let pool = LocalPool::new();
    let spawner = pool.spawner();
    orch.attach(move |fut| {
      let _ = spawner.spawn_local(fut);
    });
    Harness { pool, loader, nav, orch }
  }

  #[test]
  fn route_keys() {
    let table = RouteTable::standard();
    assert_eq!(RequestKey::for_route(&table.resolve("/")), Some(RequestKey::Listing));
    assert_eq!(RequestKey::for_route(&table.resolve("/coin/bitcoin")), Some(key("bitcoin")));
    assert_eq!(RequestKey::for_route(&table.resolve("/coin/wrapped/bitcoin")), Some(key("wrapped-bitcoin")));
    assert_eq!(RequestKey::for_route(&table.resolve("/portfolio/abc")), Some(RequestKey::Portfolio));
    assert_eq!(RequestKey::for_route(&table.resolve("/marketcapof/a/b")), Some(RequestKey::Markets));
    assert_eq!(RequestKey::for_route(&table.resolve("/nope/nope/nope")), None);
  }

  #[test]
  fn route_change_shows_loading_immediately() {
    let mut h = harness("/coin/a");
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state(), FetchState::Loading { key: key("a") });

    h.loader.answer(&key("a"), Ok(asset("a")));
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state(), FetchState::Success { key: key("a"), data: asset("a") });

    h.nav.navigate("/coin/b");
    assert_eq!(h.orch.state(), FetchState::Loading { key: key("b") });
  }

  #[test]
  fn rapid_a_b_a_never_shows_b() {
    let mut h = harness("/coin/a");
    h.pool.run_until_stalled();
    h.nav.navigate("/coin/b");
    h.pool.run_until_stalled();
    h.nav.navigate("/coin/a");
    h.pool.run_until_stalled();

    // a was still pending when we came back, so it was not requested again
    assert_eq!(h.loader.calls(), vec![key("a"), key("b")]);

    h.loader.answer(&key("b"), Ok(asset("b")));
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state_for(&key("b")), FetchState::Loading { key: key("b") });
    assert_eq!(h.orch.state(), FetchState::Loading { key: key("a") });

    h.loader.answer(&key("a"), Ok(asset("a")));
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state(), FetchState::Success { key: key("a"), data: asset("a") });
  }

  #[test]
  fn discarded_key_is_fetched_again_on_revisit() {
    let mut h = harness("/coin/a");
    h.pool.run_until_stalled();
    h.nav.navigate("/trending");
    h.pool.run_until_stalled();

    h.loader.answer(&key("a"), Ok(asset("a")));
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state_for(&key("a")), FetchState::Loading { key: key("a") });

    h.nav.navigate("/coin/a");
    h.pool.run_until_stalled();
    assert_eq!(h.loader.calls(), vec![key("a"), RequestKey::Trending, key("a")]);
  }

  #[test]
  fn settled_states_are_released_when_the_route_moves_on() {
    let mut h = harness("/coin/a");
    h.pool.run_until_stalled();
    h.loader.answer(&key("a"), Ok(asset("a")));
    h.pool.run_until_stalled();

    h.nav.navigate("/coin/missing");
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state_for(&key("a")), FetchState::Idle);
    h.loader.answer(&key("missing"), Err(AppError::from_status(404, "Coin")));
    h.pool.run_until_stalled();

    h.nav.navigate("/no/such/page");
    assert_eq!(h.orch.state_for(&key("missing")), FetchState::Idle);
    assert!(h.orch.inner.states.borrow().is_empty());
  }

  #[test]
  fn stale_settlement_is_discarded_without_a_transition() {
    let h = harness("/coin/a");
    let dispatch = Dispatch { key: key("zzz"), sequence: 0 };
    let before = h.orch.revision();

    assert_eq!(h.orch.settle(dispatch, Ok(asset("zzz"))), Settlement::Discarded);
    assert_eq!(h.orch.revision(), before);
    assert_eq!(h.orch.state_for(&key("zzz")), FetchState::Idle);
  }

  #[test]
  fn each_accepted_settlement_is_one_transition() {
    let mut h = harness("/trending");
    h.pool.run_until_stalled();
    let loading = h.orch.revision();

    h.loader.answer(&RequestKey::Trending, Ok(ViewModel::Trending(TrendingView::default())));
    h.pool.run_until_stalled();
    assert_eq!(h.orch.revision(), loading + 1);
  }

  #[test]
  fn failures_are_classified() {
    let mut h = harness("/coin/missing");
    h.pool.run_until_stalled();
    h.loader.answer(&key("missing"), Err(AppError::from_status(404, "Coin")));
    h.pool.run_until_stalled();
    assert_eq!(h.orch.state(), FetchState::Error {
      key: key("missing"),
      kind: ErrorKind::NotFound,
      message: "Coin not found".into()
    });

    h.nav.navigate("/trending");
    h.pool.run_until_stalled();
    h.loader.answer(&RequestKey::Trending, Err(AppError::Network("offline".into())));
    h.pool.run_until_stalled();
    assert!(matches!(h.orch.state(), FetchState::Error { kind: ErrorKind::TransientFetchFailure, .. }));
  }

  #[test]
  fn not_found_route_issues_nothing() {
    let mut h = harness("/no/such/page");
    h.pool.run_until_stalled();
    assert!(h.loader.calls().is_empty());
    assert_eq!(h.orch.state(), FetchState::Idle);
  }

  #[test]
  fn reload_refetches_the_current_route() {
    let mut h = harness("/portfolio");
    h.pool.run_until_stalled();
    h.loader.answer(&RequestKey::Portfolio, Ok(ViewModel::Portfolio(Default::default())));
    h.pool.run_until_stalled();

    h.orch.reload();
    h.pool.run_until_stalled();
    assert_eq!(h.loader.calls(), vec![RequestKey::Portfolio, RequestKey::Portfolio]);
    assert_eq!(h.orch.state(), FetchState::Loading { key: RequestKey::Portfolio });
  }
}
