//! An open repo: its metadata, its entry collection and the commit coordinator.

use std::sync::Arc;

use tokio::sync::MutexGuard;

use crate::edit::{EntryCollection, IdentityAllocator};
use crate::error::{Error, Result};
use crate::models::{AccessKey, EntryId, EntryVariant, RepoMeta, RepoMetaPatch, RepoWire};
use crate::sync::{CommitOutcome, EntryTransport, SharedEntries, SyncCoordinator};
use crate::util::is_http_url;

/// One editing session on a repo.
///
/// The entry collection is shared behind an async mutex so it can be edited
/// while a commit is outstanding.
#[derive(Debug)]
pub struct Repo {
    meta: RepoMeta,
    entries: Arc<SharedEntries>,
    coordinator: SyncCoordinator,
}

impl Repo {
    /// Fetch a repo and open an editing session on it.
    pub async fn load<T: EntryTransport>(transport: &T, access_key: &AccessKey) -> Result<Self> {
        let wire = transport.fetch_repo(access_key).await?;
        if &wire.access_key != access_key {
            return Err(Error::InvalidInput(format!(
                "server returned repo '{}' for '{access_key}'",
                wire.access_key
            )));
        }
        Self::from_wire(wire, IdentityAllocator::new())
    }

    /// Open a session on an already fetched repo.
    ///
    /// Entries are ordered by their server sequence; gaps in the numbering
    /// mark the renumbered entries as changed.
    pub fn from_wire(wire: RepoWire, ids: IdentityAllocator) -> Result<Self> {
        let meta = wire.meta();
        let access_key = wire.access_key.clone();
        let collection = EntryCollection::from_server(wire.server_entries()?, ids);

        tracing::info!(
            access_key = %access_key,
            entries = collection.len(),
            renumbered = collection.iter().filter(|e| e.state.is_dirty()).count(),
            "Loaded repo"
        );
        Ok(Self {
            meta,
            entries: Arc::new(SharedEntries::new(collection)),
            coordinator: SyncCoordinator::new(access_key),
        })
    }

    pub const fn access_key(&self) -> &AccessKey {
        self.coordinator.access_key()
    }

    pub const fn meta(&self) -> &RepoMeta {
        &self.meta
    }

    /// Shared handle to the entry collection and its commit guard.
    pub fn entries(&self) -> Arc<SharedEntries> {
        Arc::clone(&self.entries)
    }

    pub async fn lock(&self) -> MutexGuard<'_, EntryCollection> {
        self.entries.lock().await
    }

    pub fn is_committing(&self) -> bool {
        self.entries.is_committing()
    }

    /// Send local changes and reconcile with the server.
    pub async fn commit<T: EntryTransport>(&self, transport: &T) -> Result<CommitOutcome> {
        self.coordinator.commit(&self.entries, transport).await
    }

    /// Update title, description or visibility.
    ///
    /// Local metadata changes only once the server accepted the update.
    pub async fn update_meta<T: EntryTransport>(
        &mut self,
        transport: &T,
        patch: &RepoMetaPatch,
    ) -> Result<()> {
        patch.validate()?;
        transport.update_repo(self.access_key(), patch).await?;
        self.meta.apply(patch);
        tracing::info!(access_key = %self.access_key(), "Updated repo metadata");
        Ok(())
    }

    /// Append a link and fill it in from the page's metadata.
    ///
    /// Returns the new entry's placeholder id. When metadata cannot be
    /// fetched the link keeps its URL as title.
    pub async fn add_link<T: EntryTransport>(&self, transport: &T, url: &str) -> Result<EntryId> {
        let url = url.trim();
        if !is_http_url(url) {
            return Err(Error::InvalidInput(format!(
                "link URL must start with http:// or https://: {url}"
            )));
        }

        let id = {
            let mut entries = self.entries.lock().await;
            let index = entries.append(EntryVariant::new_link(url))?;
            entries.entries()[index].id
        };

        let metadata = match transport.fetch_link_metadata(url).await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(url, %error, "Could not fetch link metadata; keeping bare link");
                return Ok(id);
            }
        };

        // The entry may have moved or been removed while the request was out.
        let mut entries = self.entries.lock().await;
        match entries.position(id) {
            Some(index) => {
                if let Err(error) = entries.apply_metadata(index, &metadata) {
                    tracing::warn!(url, %error, "Ignoring unusable link metadata");
                }
            }
            None => tracing::debug!(%id, "Link removed before its metadata arrived"),
        }
        Ok(id)
    }
}
