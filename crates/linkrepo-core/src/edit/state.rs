//! Per-entry dirty-state rules

use serde::{Deserialize, Serialize};

/// Whether an entry matches the remote store or must be sent on the next commit.
///
/// Pending deletion is not a state: removed entries leave the active list and
/// their ids move to the collection's deletion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditState {
    /// Matches the last known server state
    #[default]
    Original,
    /// Created locally, never synced
    New,
    /// Synced before, modified since
    Change,
}

impl EditState {
    /// State of an entry that was just created locally.
    pub const fn created() -> Self {
        Self::New
    }

    /// State after any field or sequence edit.
    ///
    /// `New` stays `New` (there is no server row to update yet) and `Change`
    /// never falls back to `Original`.
    #[must_use]
    pub const fn after_edit(self) -> Self {
        match self {
            Self::Original | Self::Change => Self::Change,
            Self::New => Self::New,
        }
    }

    /// State after a successful reconciliation with the server.
    #[must_use]
    pub const fn after_reconcile(self) -> Self {
        Self::Original
    }

    /// Whether the entry has to be part of the next commit.
    pub const fn is_dirty(self) -> bool {
        !matches!(self, Self::Original)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::New => "NEW",
            Self::Change => "CHANGE",
        }
    }
}

impl std::fmt::Display for EditState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
