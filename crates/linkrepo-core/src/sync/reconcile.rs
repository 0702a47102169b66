//! Diff snapshots and post-commit reconciliation.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::edit::{EditState, EntryCollection};
use crate::models::{Entry, EntryId, EntryWire};

use super::CommitSummary;

/// What one commit sends, captured under the collection lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub revision: u64,
    /// Ids in display order at capture time
    pub order: Vec<EntryId>,
    pub to_create: Vec<EntryWire>,
    pub to_update: Vec<EntryWire>,
    pub to_delete: Vec<EntryId>,
}

impl Snapshot {
    pub fn capture(collection: &EntryCollection) -> Self {
        let mut to_create = Vec::new();
        let mut to_update = Vec::new();
        for entry in collection {
            match entry.state {
                EditState::New => to_create.push(EntryWire::from(entry)),
                EditState::Change => to_update.push(EntryWire::from(entry)),
                EditState::Original => {}
            }
        }

        Self {
            revision: collection.revision(),
            order: collection.iter().map(|entry| entry.id).collect(),
            to_create,
            to_update,
            to_delete: collection.pending_deletion().iter().copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn summary(&self) -> CommitSummary {
        CommitSummary {
            created: self.to_create.len(),
            updated: self.to_update.len(),
            deleted: self.to_delete.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconciliation {
    /// Nothing changed locally during the commit; the server list was installed as is
    Replaced,
    /// Local edits made during the commit were carried over onto the server list
    Rebased { kept_local: usize },
}

/// Bring `collection` in line with the server's entries after a successful commit.
pub(crate) fn reconcile(
    collection: &mut EntryCollection,
    snapshot: &Snapshot,
    mut fetched: Vec<Entry>,
) -> Reconciliation {
    if collection.revision() == snapshot.revision {
        collection.install_committed(fetched);
        return Reconciliation::Replaced;
    }

    // Sequences were contiguous and fully sent, so the server list lines up
    // with the snapshot position by position.
    fetched.sort_by_key(|entry| entry.sequence);
    let id_map: HashMap<EntryId, EntryId> = if fetched.len() == snapshot.order.len() {
        snapshot
            .order
            .iter()
            .copied()
            .zip(fetched.iter().map(|entry| entry.id))
            .collect()
    } else {
        tracing::warn!(
            committed = snapshot.order.len(),
            fetched = fetched.len(),
            "Server entry count differs from the committed list; placeholder ids stay unresolved"
        );
        HashMap::new()
    };
    let translate = |id: EntryId| id_map.get(&id).copied().unwrap_or(id);

    let slots: HashMap<EntryId, usize> = fetched
        .iter()
        .enumerate()
        .map(|(slot, entry)| (entry.id, slot))
        .collect();
    let mut remote: Vec<Option<Entry>> = fetched.into_iter().map(Some).collect();

    let sent: HashSet<EntryId> = snapshot.to_delete.iter().copied().collect();
    let mut pending: BTreeSet<EntryId> = collection
        .pending_deletion()
        .iter()
        .copied()
        .filter(|id| !sent.contains(id))
        .map(translate)
        .collect();

    let local = collection.take_entries();
    let local_ids: HashSet<EntryId> = local.iter().map(|entry| entry.id).collect();
    let mut merged = Vec::with_capacity(local.len());
    let mut kept_local = 0;

    for mut entry in local {
        let server_id = translate(entry.id);
        let server_copy = slots
            .get(&server_id)
            .and_then(|&slot| remote.get_mut(slot))
            .and_then(Option::take);

        if entry.touched > snapshot.revision {
            if server_copy.is_some() {
                entry.id = server_id;
                entry.state = entry.state.after_reconcile().after_edit();
            }
            kept_local += 1;
            merged.push(entry);
        } else if let Some(server_copy) = server_copy {
            merged.push(server_copy);
        } else {
            tracing::warn!(id = %entry.id, "Entry missing from server list; keeping local copy");
            merged.push(entry);
        }
    }

    // Committed entries removed locally before the commit finished.
    for id in &snapshot.order {
        if !local_ids.contains(id) {
            let server_id = translate(*id);
            if !server_id.is_placeholder() {
                pending.insert(server_id);
            }
        }
    }

    for leftover in remote.into_iter().flatten() {
        if !pending.contains(&leftover.id) {
            merged.push(leftover);
        }
    }

    collection.replace_rebased(merged, pending);
    Reconciliation::Rebased { kept_local }
}
