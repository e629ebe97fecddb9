// Source of raw dashboard documents
use crate::domain::dashboard::{DashboardDocument, DashboardSource};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not fetch {location}: {reason}")]
    Unreachable { location: String, reason: String },
    #[error("fetching {location} returned status {status}")]
    Status { location: String, status: u16 },
    #[error("{location} is not a dashboard document: {reason}")]
    Decode { location: String, reason: String },
}

#[async_trait]
pub trait DashboardFetcher: Send + Sync {
    async fn fetch(&self, source: &DashboardSource) -> Result<DashboardDocument, FetchError>;
}
