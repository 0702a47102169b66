//! Data models for Link Repo

mod entry;
mod repo;
mod wire;

pub use entry::{
    Entry, EntryFields, EntryId, EntryKind, EntryPatch, EntryVariant, MAX_RATING,
};
pub use repo::{AccessKey, RepoMeta, RepoMetaPatch, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
pub use wire::{EntryWire, LinkMetadata, RepoWire};
