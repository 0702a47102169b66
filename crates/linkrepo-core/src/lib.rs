//! linkrepo-core - Core library for Link Repo
//!
//! This crate holds the local edit buffer for a repo's ordered entries, the
//! dirty-state rules that decide what a commit sends, and the coordinator that
//! batches changes to the remote store and reconciles with its answer.

pub mod config;
pub mod edit;
pub mod error;
pub mod models;
pub mod repo;
pub mod sync;
pub mod util;

pub use config::ClientConfig;
pub use edit::{EditState, EntryCollection, IdentityAllocator};
pub use error::{Error, Result};
pub use models::{AccessKey, Entry, EntryId, EntryKind, EntryPatch, EntryVariant};
pub use repo::Repo;
pub use sync::{
    CommitOutcome, CommitSummary, EntryTransport, HttpTransport, SharedEntries, SyncCoordinator,
};
