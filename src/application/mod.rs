// Application layer - Provisioning use cases and collaborator seams
pub mod bootstrap_service;
pub mod dashboard_fetcher;
pub mod grafana_api;
pub mod import_service;
pub mod org_resolver;

#[cfg(test)]
pub mod testing;
