pub mod app;
pub mod config;
pub mod holdings;
pub mod prices;
pub mod snapshot;
pub mod store;
