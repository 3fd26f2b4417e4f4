// Owns the logical route after boot. Every change publishes a state with a larger sequence.

use std::{cell::{Cell, RefCell}, rc::Rc};
use dioxus::logger::tracing::{debug, warn};
use js_sys::wasm_bindgen::{prelude::Closure, JsCast};
use web_sys::{window, Event, Window};

use super::{
  browser::BrowserHistory,
  routes::{RouteDescriptor, RouteTable},
  server::AppError
};

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
  pub current: RouteDescriptor,
  sequence: u64
}

impl NavigationState {
  // Only used to tell whether a settled request still belongs to the route on screen.
  pub fn sequence(&self) -> u64 {
    self.sequence
  }
}

pub type SubscriptionId = u64;
type Listener = Rc<dyn Fn(&NavigationState)>;

struct Inner {
  table: RouteTable,
  history: Rc<dyn BrowserHistory>,
  state: RefCell<NavigationState>,
  listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
  next_id: Cell<SubscriptionId>
}

#[derive(Clone)]
pub struct NavigationController {
  inner: Rc<Inner>
}

impl PartialEq for NavigationController {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.inner, &other.inner)
  }
}

impl NavigationController {
  pub fn new(table: RouteTable, history: Rc<dyn BrowserHistory>, initial: RouteDescriptor) -> Self {
    let inner = Inner {
      table,
      history,
      state: RefCell::new(NavigationState { current: initial, sequence: 0 }),
      listeners: RefCell::new(vec![]),
      next_id: Cell::new(0)
    };
    Self { inner: Rc::new(inner) }
  }

  pub fn current(&self) -> NavigationState {
    self.inner.state.borrow().clone()
  }

  pub fn sequence(&self) -> u64 {
    self.inner.state.borrow().sequence
  }

  // Link activation: new history entry, no reload.
  pub fn navigate(&self, path: &str) -> NavigationState {
    let descriptor = self.inner.table.resolve(path);
    if let Err(e) = self.inner.history.push(descriptor.raw_path()) {
      warn!("history push for {} failed: {}", descriptor.raw_path(), e);
    }
    self.publish(descriptor)
  }

  // Back/forward: the browser already moved its entry, we only re-read the address bar.
  pub fn sync_from_address_bar(&self) -> NavigationState {
    let descriptor = self.inner.table.resolve(&self.inner.history.pathname());
    self.publish(descriptor)
  }

  pub fn subscribe(&self, listener: impl Fn(&NavigationState) + 'static) -> SubscriptionId {
    let id = self.inner.next_id.get();
    self.inner.next_id.set(id + 1);
    self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
    id
  }

  pub fn unsubscribe(&self, id: SubscriptionId) {
    self.inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
  }

  fn publish(&self, descriptor: RouteDescriptor) -> NavigationState {
    let next = {
      let mut state = self.inner.state.borrow_mut();
      *state = NavigationState { current: descriptor, sequence: state.sequence + 1 };
      state.clone()
    };
    debug!("route #{} -> {} ({})", next.sequence, next.current.raw_path(), next.current.pattern());

    // listeners may navigate again, so nothing stays borrowed while they run
    let listeners: Vec<Listener> = self.inner.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
    for listener in listeners {
      listener(&next);
    }
    next
  }

  // Hooks the browser's `popstate` event. Dropping the returned guard unhooks it.
  pub fn listen_to_popstate(&self) -> Result<PopstateListener, AppError> {
    let window = window().ok_or_else(|| AppError::WasmError("global window should exist!".to_string()))?;
    let controller = self.clone();
    let callback = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
      controller.sync_from_address_bar();
    });
    window.add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref())
      .map_err(|e| AppError::WasmError(format!("{:?}", e)))?;
    Ok(PopstateListener { window, callback })
  }
}

pub struct PopstateListener {
  window: Window,
  callback: Closure<dyn FnMut(Event)>
}

impl Drop for PopstateListener {
  fn drop(&mut self) {
    let _ = self.window.remove_event_listener_with_callback("popstate", self.callback.as_ref().unchecked_ref());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils::{
    browser::fakes::{FakeHistory, HistoryOp},
    routes::RoutePatternId
  };

  fn controller_at(path: &str) -> (NavigationController, Rc<FakeHistory>) {
    let table = RouteTable::standard();
    let history = Rc::new(FakeHistory::at(path));
    let initial = table.resolve(path);
    (NavigationController::new(table, history.clone(), initial), history)
  }

  #[test]
  fn navigate_pushes_and_publishes_increasing_sequences() {
    let (nav, history) = controller_at("/");
    let seen = Rc::new(RefCell::new(vec![]));
    let sink = seen.clone();
    nav.subscribe(move |state| sink.borrow_mut().push((state.sequence(), state.current.raw_path().to_string())));

    let a = nav.navigate("/coin/bitcoin");
    let b = nav.navigate("/trending");

    assert!(b.sequence() > a.sequence());
    assert!(a.sequence() > 0);
    assert_eq!(a.current.param("id"), Some("bitcoin"));
    assert_eq!(*seen.borrow(), vec![(1, "/coin/bitcoin".to_string()), (2, "/trending".to_string())]);
    assert_eq!(history.ops(), vec![
      HistoryOp::Push("/coin/bitcoin".to_string()),
      HistoryOp::Push("/trending".to_string())
    ]);
    assert_eq!(nav.current(), b);
  }

  #[test]
  fn back_forward_republishes_without_pushing() {
    let (nav, history) = controller_at("/");
    nav.navigate("/coin/bitcoin");
    let pushes = history.ops().len();

    history.set_address("/");
    let state = nav.sync_from_address_bar();

    assert_eq!(state.current.pattern(), RoutePatternId::Listing);
    assert_eq!(state.sequence(), 2);
    assert_eq!(history.ops().len(), pushes);
  }

  #[test]
  fn unknown_path_is_a_normal_state() {
    let (nav, _) = controller_at("/");
    let state = nav.navigate("/does/not/exist");
    assert!(state.current.is_not_found());
    assert_eq!(nav.sequence(), 1);
  }

  #[test]
  fn earlier_states_are_untouched_by_later_navigation() {
    let (nav, _) = controller_at("/coin/bitcoin");
    let before = nav.current();
    nav.navigate("/coin/ethereum");
    assert_eq!(before.current.param("id"), Some("bitcoin"));
    assert_eq!(before.sequence(), 0);
  }

  #[test]
  fn unsubscribed_listeners_stop_hearing() {
    let (nav, _) = controller_at("/");
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let id = nav.subscribe(move |_| counter.set(counter.get() + 1));

    nav.navigate("/trending");
    nav.unsubscribe(id);
    nav.navigate("/portfolio");

    assert_eq!(hits.get(), 1);
  }

  #[test]
  fn listeners_may_navigate_reentrantly() {
    let (nav, _) = controller_at("/");
    let redirecting = nav.clone();
    nav.subscribe(move |state| {
      if state.current.raw_path() == "/portfolio/legacy" {
        redirecting.navigate("/portfolio");
      }
    });

    nav.navigate("/portfolio/legacy");
    assert_eq!(nav.current().current.raw_path(), "/portfolio");
    assert_eq!(nav.sequence(), 2);
  }
}
