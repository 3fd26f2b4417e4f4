pub mod api;
pub mod browser;
pub mod comparator;
pub mod config;
pub mod dashboard;
pub mod fetch_gate;
pub mod holdings;
pub mod loader;
pub mod navigation;
pub mod normalize;
pub mod orchestrator;
pub mod resolver;
pub mod routes;
pub mod server;
pub mod transport;
