//! Ordered entry list owned by one editing session

use std::collections::BTreeSet;

use crate::edit::{EditState, IdentityAllocator};
use crate::error::{Error, Result};
use crate::models::{Entry, EntryId, EntryPatch, EntryVariant, LinkMetadata};

/// The active entries of a repo, in display order, plus the ids removed
/// locally that still have to be deleted remotely.
///
/// Every structural mutator leaves `sequence` equal to each entry's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCollection {
    entries: Vec<Entry>,
    pending_deletion: BTreeSet<EntryId>,
    ids: IdentityAllocator,
    revision: u64,
}

impl EntryCollection {
    /// Empty collection drawing placeholder ids from `ids`.
    pub const fn new(ids: IdentityAllocator) -> Self {
        Self {
            entries: Vec::new(),
            pending_deletion: BTreeSet::new(),
            ids,
            revision: 0,
        }
    }

    /// Collection holding the server's entries, ordered by their server sequence.
    pub fn from_server(entries: Vec<Entry>, ids: IdentityAllocator) -> Self {
        let mut collection = Self::new(ids);
        collection.install(entries);
        collection
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Ids removed locally that the next commit deletes remotely.
    pub const fn pending_deletion(&self) -> &BTreeSet<EntryId> {
        &self.pending_deletion
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Counter bumped by every local mutation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a commit would send anything.
    pub fn has_changes(&self) -> bool {
        !self.pending_deletion.is_empty() || self.entries.iter().any(|e| e.state.is_dirty())
    }

    /// Append a locally created entry and return its index.
    ///
    /// Fails only when the session has run out of placeholder ids.
    pub fn append(&mut self, variant: EntryVariant) -> Result<usize> {
        let id = self.ids.next_id()?;
        let revision = self.bump();
        let index = self.entries.len();
        let mut entry = Entry::new_local(id, variant, index);
        entry.touched = revision;
        self.entries.push(entry);
        self.resequence();
        Ok(index)
    }

    /// Apply a field patch to the entry at `index`.
    ///
    /// The entry is left untouched when the patch is rejected.
    pub fn edit(&mut self, index: usize, patch: &EntryPatch) -> Result<&Entry> {
        let len = self.entries.len();
        let current = self
            .entries
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        let variant = patch.apply(&current.variant)?;

        let revision = self.bump();
        let entry = &mut self.entries[index];
        entry.variant = variant;
        entry.state = entry.state.after_edit();
        entry.touched = revision;
        Ok(entry)
    }

    /// Copy scraped page metadata onto the entry at `index`.
    pub fn apply_metadata(&mut self, index: usize, metadata: &LinkMetadata) -> Result<&Entry> {
        self.edit(index, &metadata.to_patch())
    }

    /// Remove the entry at `index`.
    ///
    /// An entry the server never saw is simply dropped; any other entry's id is
    /// queued for remote deletion.
    pub fn remove_at(&mut self, index: usize) -> Result<Entry> {
        self.check_index(index)?;
        self.bump();
        let removed = self.entries.remove(index);
        if removed.state != EditState::New {
            self.pending_deletion.insert(removed.id);
        }
        self.resequence();
        Ok(removed)
    }

    /// Move the entry at `index` by `delta` positions, wrapping around the ends.
    ///
    /// Returns the entry's new index.
    pub fn move_by(&mut self, index: usize, delta: isize) -> Result<usize> {
        self.check_index(index)?;
        let target = wrap_target(index, delta, self.entries.len());
        if target != index {
            self.bump();
            let entry = self.entries.remove(index);
            self.entries.insert(target, entry);
        }
        self.resequence();
        Ok(target)
    }

    /// Renumber entries to their positions; renumbered entries count as edited.
    pub fn resequence(&mut self) {
        let mut stamp = None;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.sequence != index {
                entry.sequence = index;
                entry.state = entry.state.after_edit();
                entry.touched = *stamp.get_or_insert_with(|| {
                    self.revision += 1;
                    self.revision
                });
            }
        }
    }

    /// Replace everything with the server's entries and forget pending deletions.
    ///
    /// Gaps in the server's numbering are closed and the renumbered entries
    /// marked changed, so the next commit writes the contiguous order back.
    pub(crate) fn install(&mut self, entries: Vec<Entry>) {
        self.replace_with_server(entries);
        self.resequence();
    }

    /// Like [`Self::install`], but after a successful commit: every entry ends
    /// up ORIGINAL even if the server's numbering had gaps.
    pub(crate) fn install_committed(&mut self, entries: Vec<Entry>) {
        self.replace_with_server(entries);
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.sequence = index;
        }
    }

    fn replace_with_server(&mut self, mut entries: Vec<Entry>) {
        entries.sort_by_key(|entry| entry.sequence);
        for entry in &mut entries {
            entry.state = entry.state.after_reconcile();
        }
        self.entries = entries;
        self.pending_deletion.clear();
        self.bump();
    }

    pub(crate) fn take_entries(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn replace_rebased(&mut self, entries: Vec<Entry>, pending: BTreeSet<EntryId>) {
        self.entries = entries;
        self.pending_deletion = pending;
        self.bump();
        self.resequence();
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}

impl Default for EntryCollection {
    fn default() -> Self {
        Self::new(IdentityAllocator::new())
    }
}

impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Destination index for moving `index` by `delta` in a list of `len`.
///
/// One step before the front lands at the end and one step past the end lands
/// at the front; any other out-of-range target is taken modulo the length of
/// the list with the moved entry taken out.
fn wrap_target(index: usize, delta: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let (Ok(index), Ok(len)) = (isize::try_from(index), isize::try_from(len)) else {
        return 0;
    };
    let target = index.saturating_add(delta);
    let wrapped = if (0..len).contains(&target) {
        target
    } else if target == -1 {
        len - 1
    } else if target == len {
        0
    } else {
        target.rem_euclid(len - 1)
    };
    usize::try_from(wrapped).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use pretty_assertions::assert_eq;

    fn server_entry(id: i64, sequence: usize) -> Entry {
        Entry::from_server(
            EntryId::new(id),
            EntryVariant::Divider {
                title: format!("Divider {id}"),
                url: None,
                rating: 0,
            },
            sequence,
        )
    }

    fn synced(count: usize) -> EntryCollection {
        let entries = (0..count)
            .map(|i| server_entry(i64::try_from(i).unwrap() + 1, i))
            .collect();
        EntryCollection::from_server(entries, IdentityAllocator::new())
    }

    fn ids(collection: &EntryCollection) -> Vec<i64> {
        collection.iter().map(|entry| entry.id.get()).collect()
    }

    fn assert_contiguous(collection: &EntryCollection) {
        for (index, entry) in collection.iter().enumerate() {
            assert_eq!(entry.sequence, index);
        }
    }

    #[test]
    fn test_append_to_empty() {
        let mut collection = EntryCollection::default();
        let index = collection.append(EntryVariant::new_text_box()).unwrap();

        let entry = collection.get(index).unwrap();
        assert_eq!(index, 0);
        assert_eq!(entry.state, EditState::New);
        assert_eq!(entry.sequence, 0);
        assert!(entry.id.is_placeholder());
        assert_eq!(entry.kind(), EntryKind::TextBox);
    }

    #[test]
    fn test_append_uses_injected_allocator() {
        let mut collection = EntryCollection::new(IdentityAllocator::starting_at(-10).unwrap());
        collection.append(EntryVariant::new_divider()).unwrap();
        collection.append(EntryVariant::new_divider()).unwrap();
        assert_eq!(ids(&collection), vec![-10, -11]);
    }

    #[test]
    fn test_append_fails_once_ids_run_out() {
        let mut collection = EntryCollection::new(IdentityAllocator::starting_at(i64::MIN).unwrap());
        collection.append(EntryVariant::new_divider()).unwrap();
        let before = collection.clone();

        let err = collection.append(EntryVariant::new_divider()).unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(collection, before);
    }

    #[test]
    fn test_committed_install_closes_gaps_without_marking_changes() {
        let mut collection = EntryCollection::default();
        collection.install_committed(vec![server_entry(1, 0), server_entry(2, 5), server_entry(3, 2)]);

        assert_eq!(ids(&collection), vec![1, 3, 2]);
        assert_contiguous(&collection);
        assert!(collection.iter().all(|e| e.state == EditState::Original));
        assert!(!collection.has_changes());
    }

    #[test]
    fn test_from_server_orders_by_sequence() {
        let collection = EntryCollection::from_server(
            vec![server_entry(5, 2), server_entry(6, 0), server_entry(7, 1)],
            IdentityAllocator::new(),
        );
        assert_eq!(ids(&collection), vec![6, 7, 5]);
        assert!(collection.iter().all(|e| e.state == EditState::Original));
        assert!(!collection.has_changes());
    }

    #[test]
    fn test_from_server_marks_gaps_for_renumbering() {
        let collection = EntryCollection::from_server(
            vec![server_entry(1, 0), server_entry(2, 5), server_entry(3, usize::MAX)],
            IdentityAllocator::new(),
        );
        assert_contiguous(&collection);
        let states: Vec<_> = collection.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![EditState::Original, EditState::Change, EditState::Change]
        );
    }

    #[test]
    fn test_edit_transitions() {
        let mut collection = synced(1);
        let patch = EntryPatch::title("Renamed");

        assert_eq!(collection.edit(0, &patch).unwrap().state, EditState::Change);
        assert_eq!(collection.edit(0, &patch).unwrap().state, EditState::Change);

        let index = collection.append(EntryVariant::new_divider()).unwrap();
        assert_eq!(collection.edit(index, &patch).unwrap().state, EditState::New);
        assert_eq!(collection.get(index).unwrap().variant.title(), "Renamed");
    }

    #[test]
    fn test_edit_out_of_range() {
        let mut collection = synced(2);
        let err = collection.edit(2, &EntryPatch::title("x")).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_rejected_edit_leaves_entry_clean() {
        let mut collection = synced(1);
        let patch = EntryPatch {
            rating: Some(9),
            ..EntryPatch::default()
        };
        assert!(collection.edit(0, &patch).is_err());
        assert_eq!(collection.get(0).unwrap().state, EditState::Original);
    }

    #[test]
    fn test_remove_original_queues_deletion() {
        let mut collection = synced(3);
        let removed = collection.remove_at(1).unwrap();

        assert_eq!(removed.id, EntryId::new(2));
        assert_eq!(ids(&collection), vec![1, 3]);
        assert_contiguous(&collection);
        assert_eq!(
            collection.pending_deletion().iter().copied().collect::<Vec<_>>(),
            vec![EntryId::new(2)]
        );
        // Entry 3 moved from sequence 2 to 1
        assert_eq!(collection.get(1).unwrap().state, EditState::Change);
    }

    #[test]
    fn test_remove_changed_queues_deletion() {
        let mut collection = synced(2);
        collection.edit(0, &EntryPatch::title("edited")).unwrap();
        collection.remove_at(0).unwrap();
        assert!(collection.pending_deletion().contains(&EntryId::new(1)));
    }

    #[test]
    fn test_remove_new_is_discarded() {
        let mut collection = synced(1);
        let index = collection.append(EntryVariant::new_link("https://example.com")).unwrap();
        let removed = collection.remove_at(index).unwrap();

        assert!(removed.id.is_placeholder());
        assert!(collection.pending_deletion().is_empty());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut collection = EntryCollection::default();
        assert!(matches!(
            collection.remove_at(0),
            Err(Error::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_move_first_up_wraps_to_end() {
        let mut collection = synced(4);
        assert_eq!(collection.move_by(0, -1).unwrap(), 3);
        assert_eq!(ids(&collection), vec![2, 3, 4, 1]);
        assert_contiguous(&collection);
    }

    #[test]
    fn test_move_last_down_wraps_to_front() {
        let mut collection = synced(4);
        assert_eq!(collection.move_by(3, 1).unwrap(), 0);
        assert_eq!(ids(&collection), vec![4, 1, 2, 3]);
        assert_contiguous(&collection);
    }

    #[test]
    fn test_move_within_bounds() {
        let mut collection = synced(4);
        assert_eq!(collection.move_by(1, 1).unwrap(), 2);
        assert_eq!(ids(&collection), vec![1, 3, 2, 4]);

        let states: Vec<_> = collection.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                EditState::Original,
                EditState::Change,
                EditState::Change,
                EditState::Original
            ]
        );
    }

    #[test]
    fn test_move_far_out_of_range_uses_modulo() {
        let mut collection = synced(4);
        // 1 - 3 = -2, taken modulo the three remaining entries
        assert_eq!(collection.move_by(1, -3).unwrap(), 1);
        assert_eq!(ids(&collection), vec![1, 2, 3, 4]);

        // 2 + 5 = 7, 7 mod 3 = 1
        assert_eq!(collection.move_by(2, 5).unwrap(), 1);
        assert_eq!(ids(&collection), vec![1, 3, 2, 4]);
        assert_contiguous(&collection);
    }

    #[test]
    fn test_move_single_entry_is_noop() {
        let mut collection = synced(1);
        assert_eq!(collection.move_by(0, -1).unwrap(), 0);
        assert_eq!(collection.get(0).unwrap().state, EditState::Original);
    }

    #[test]
    fn test_moved_new_entry_stays_new() {
        let mut collection = synced(2);
        let index = collection.append(EntryVariant::new_divider()).unwrap();
        let target = collection.move_by(index, 1).unwrap();
        assert_eq!(target, 0);
        assert_eq!(collection.get(0).unwrap().state, EditState::New);
    }

    #[test]
    fn test_sequences_stay_contiguous_through_mixed_mutations() {
        let mut collection = synced(3);
        collection.append(EntryVariant::new_text_box()).unwrap();
        collection.move_by(3, -2).unwrap();
        collection.remove_at(0).unwrap();
        collection.append(EntryVariant::new_link("https://crates.io")).unwrap();
        collection.move_by(0, -1).unwrap();
        collection.remove_at(2).unwrap();
        collection.move_by(2, 7).unwrap();
        assert_contiguous(&collection);
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let mut collection = synced(2);
        let start = collection.revision();
        collection.move_by(0, 1).unwrap();
        assert!(collection.revision() > start);

        let before_noop = collection.revision();
        collection.resequence();
        assert_eq!(collection.revision(), before_noop);
    }

    #[test]
    fn test_apply_metadata_fills_link() {
        let mut collection = EntryCollection::default();
        let index = collection.append(EntryVariant::new_link("https://blog.rust-lang.org")).unwrap();
        let metadata = LinkMetadata {
            title: Some("Rust Blog".to_string()),
            image: Some("https://blog.rust-lang.org/logo.png".to_string()),
            ..LinkMetadata::default()
        };
        let entry = collection.apply_metadata(index, &metadata).unwrap();
        assert_eq!(entry.variant.title(), "Rust Blog");
        assert_eq!(entry.variant.image(), Some("https://blog.rust-lang.org/logo.png"));
        assert_eq!(entry.variant.url(), Some("https://blog.rust-lang.org"));
        assert_eq!(entry.state, EditState::New);
    }
}
