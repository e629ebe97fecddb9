// Infrastructure layer - External dependencies and adapters
pub mod catalog_client;
pub mod config;
pub mod credentials;
pub mod grafana_client;
pub mod results_store;

#[cfg(test)]
pub mod canned_server;
