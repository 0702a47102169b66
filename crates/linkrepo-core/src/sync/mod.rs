//! Batched commit of local edits and reconciliation with the remote store.

mod http;
#[cfg(test)]
pub(crate) mod memory;
mod reconcile;
mod transport;

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use crate::edit::EntryCollection;
use crate::error::{Error, Result};
use crate::models::AccessKey;
use reconcile::{reconcile, Reconciliation, Snapshot};

pub use http::HttpTransport;
pub use transport::{EntryTransport, TransportError, TransportResult};

/// Number of entries sent in each batch of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Successful result of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The collection had no dirty entries and no pending deletions
    NothingToSync,
    /// Batches were accepted and the collection was reconciled with the server
    Applied(CommitSummary),
}

impl CommitOutcome {
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Self::NothingToSync => "Nothing to sync.",
            Self::Applied(_) => "Changes saved.",
        }
    }
}

/// An entry collection shared by editors and commits.
///
/// Carries the collection's single-commit guard, so every coordinator
/// committing the same collection sees the same in-flight flag.
#[derive(Debug, Default)]
pub struct SharedEntries {
    collection: Mutex<EntryCollection>,
    in_flight: AtomicBool,
}

impl SharedEntries {
    pub fn new(collection: EntryCollection) -> Self {
        Self {
            collection: Mutex::new(collection),
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, EntryCollection> {
        self.collection.lock().await
    }

    /// Whether a commit of this collection is outstanding.
    pub fn is_committing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the collection's commit slot, or fail with `SyncInProgress`.
    fn begin_commit(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SyncInProgress)?;
        Ok(InFlight(&self.in_flight))
    }
}

/// Sends a collection's local changes to the remote store.
#[derive(Debug)]
pub struct SyncCoordinator {
    access_key: AccessKey,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncCoordinator {
    pub const fn new(access_key: AccessKey) -> Self {
        Self { access_key }
    }

    pub const fn access_key(&self) -> &AccessKey {
        &self.access_key
    }

    /// Send every pending change and reconcile `entries` with the server.
    ///
    /// At most one commit per collection runs at a time; another attempt fails
    /// with [`Error::SyncInProgress`]. Batches go out in order (create, update,
    /// delete) and the first failure aborts the commit with the collection
    /// untouched, so a retry resends the same diff. The collection is locked
    /// only to read the diff and to apply the server's state; edits made in
    /// between are kept for the next commit.
    pub async fn commit<T: EntryTransport>(
        &self,
        entries: &SharedEntries,
        transport: &T,
    ) -> Result<CommitOutcome> {
        let _in_flight = entries.begin_commit()?;

        let snapshot = Snapshot::capture(&*entries.lock().await);
        if snapshot.is_empty() {
            tracing::debug!(access_key = %self.access_key, "Nothing to sync");
            return Ok(CommitOutcome::NothingToSync);
        }

        let summary = snapshot.summary();
        tracing::info!(
            access_key = %self.access_key,
            created = summary.created,
            updated = summary.updated,
            deleted = summary.deleted,
            "Committing entry changes"
        );
        self.send_batches(&snapshot, transport).await?;

        let repo = transport
            .fetch_repo(&self.access_key)
            .await
            .map_err(|error| batch_failed("fetch", error))?;
        let fetched = repo.server_entries()?;

        let mut collection = entries.lock().await;
        match reconcile(&mut collection, &snapshot, fetched) {
            Reconciliation::Replaced => {
                tracing::info!(entries = collection.len(), "Reconciled entries with server");
            }
            Reconciliation::Rebased { kept_local } => {
                tracing::debug!(
                    entries = collection.len(),
                    kept_local,
                    "Reconciled entries with server, keeping edits made during commit"
                );
            }
        }
        Ok(CommitOutcome::Applied(summary))
    }

    async fn send_batches<T: EntryTransport>(
        &self,
        snapshot: &Snapshot,
        transport: &T,
    ) -> Result<()> {
        let key = &self.access_key;
        if !snapshot.to_create.is_empty() {
            transport
                .create_entries(key, &snapshot.to_create)
                .await
                .map_err(|error| batch_failed("create", error))?;
        }
        if !snapshot.to_update.is_empty() {
            transport
                .update_entries(key, &snapshot.to_update)
                .await
                .map_err(|error| batch_failed("update", error))?;
        }
        if !snapshot.to_delete.is_empty() {
            transport
                .delete_entries(key, &snapshot.to_delete)
                .await
                .map_err(|error| batch_failed("delete", error))?;
        }
        Ok(())
    }
}

fn batch_failed(call: &'static str, error: TransportError) -> Error {
    tracing::warn!(call, %error, "Commit aborted; local changes kept for retry");
    Error::Transport(error)
}
