//! The remote store seam used by loading, committing and metadata updates.

use std::future::Future;

use thiserror::Error;

use crate::models::{AccessKey, EntryId, EntryWire, LinkMetadata, RepoMetaPatch, RepoWire};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} ({status})")]
    Api { status: u16, message: String },
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Access to the authoritative remote store.
///
/// Each batch call is atomic from the engine's point of view: it either fully
/// succeeds or fully fails. Timeouts and retries belong to the implementation.
pub trait EntryTransport: Send + Sync {
    /// Fetch a repo's metadata and its full entry list.
    fn fetch_repo(&self, key: &AccessKey)
        -> impl Future<Output = TransportResult<RepoWire>> + Send;

    fn create_entries(
        &self,
        key: &AccessKey,
        entries: &[EntryWire],
    ) -> impl Future<Output = TransportResult<()>> + Send;

    fn update_entries(
        &self,
        key: &AccessKey,
        entries: &[EntryWire],
    ) -> impl Future<Output = TransportResult<()>> + Send;

    fn delete_entries(
        &self,
        key: &AccessKey,
        ids: &[EntryId],
    ) -> impl Future<Output = TransportResult<()>> + Send;

    fn update_repo(
        &self,
        key: &AccessKey,
        patch: &RepoMetaPatch,
    ) -> impl Future<Output = TransportResult<()>> + Send;

    /// Scrape title, description and image for a URL.
    fn fetch_link_metadata(
        &self,
        url: &str,
    ) -> impl Future<Output = TransportResult<LinkMetadata>> + Send;
}
