use std::rc::Rc;
use dioxus::logger::tracing::warn;

use super::{
  api::MarketApi,
  browser::{with_base, KeyValueStore, MemoryStore, WebHistory, WebStorage},
  config::AppConfig,
  fetch_gate::{FetchGate, ProbeSignature},
  holdings::HoldingsStore,
  loader::DashboardLoader,
  navigation::{NavigationController, PopstateListener},
  orchestrator::DataOrchestrator,
  resolver::RouteResolver,
  routes::RouteTable,
  server::AppError,
  transport::{ReqwestTransport, Transport}
};

#[derive(Clone)]
pub struct Dashboard {
  pub navigation: NavigationController,
  pub orchestrator: DataOrchestrator,
  pub holdings: HoldingsStore,
  pub api: MarketApi,
  pub base_path: String,
  _popstate: Option<Rc<PopstateListener>>
}

impl PartialEq for Dashboard {
  fn eq(&self, other: &Self) -> bool {
    self.navigation == other.navigation && self.orchestrator == other.orchestrator
  }
}

fn storage_or_memory(storage: Result<WebStorage, AppError>, what: &str) -> Rc<dyn KeyValueStore> {
  match storage {
    Ok(storage) => Rc::new(storage),
    Err(e) => {
      warn!("{} storage unavailable, keeping it in memory: {}", what, e);
      Rc::new(MemoryStore::default())
    }
  }
}

impl Dashboard {
  pub fn boot(config: &AppConfig) -> Result<Self, AppError> {
    let table = RouteTable::standard();
    let history = Rc::new(WebHistory::new(&config.base_path)?);
    let session = storage_or_memory(WebStorage::session(), "session");

    let resolution = RouteResolver::new(&table, history.as_ref(), session.as_ref()).resolve();

    let navigation = NavigationController::new(table, history, resolution.descriptor);

    let transport: Rc<dyn Transport> = Rc::new(ReqwestTransport::new(reqwest::Client::new()));
    let transport = FetchGate::install(transport, ProbeSignature::new(config.probe_fragments.clone()));
    let api = MarketApi::new(transport, config.api_url.clone(), config.api_key.clone());

    let holdings = HoldingsStore::new(storage_or_memory(WebStorage::local(), "local"));
    let loader = DashboardLoader::new(api.clone(), holdings.clone());
    let orchestrator = DataOrchestrator::new(Rc::new(loader), navigation.clone());
    orchestrator.attach(|fut| wasm_bindgen_futures::spawn_local(fut));

    let popstate = match navigation.listen_to_popstate() {
      Ok(listener) => Some(Rc::new(listener)),
      Err(e) => {
        warn!("back/forward will not be tracked: {}", e);
        None
      }
    };

    Ok(Self { navigation, orchestrator, holdings, api, base_path: config.base_path.clone(), _popstate: popstate })
  }

  pub fn navigate(&self, path: &str) {
    self.navigation.navigate(path);
  }

  // What goes in an anchor's href, so copy-link and new-tab still work.
  pub fn href(&self, path: &str) -> String {
    with_base(&self.base_path, path)
  }
}
