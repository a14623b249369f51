//! Selected-boxes accumulator for one batch session.
//!
//! An ordered list of resolved boxes, unique by label identifier, kept in
//! insertion order (oldest first) so the most recent scan can be undone.
//! The list is owned by exactly one session and is never persisted.

use crate::boxes::BoxRef;
use crate::types::LabelIdentifier;

/// Result of [`SelectedBoxes::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// `false` when the box was already on the list (nothing changed).
    pub was_new: bool,
}

/// Ordered, deduplicated list of boxes awaiting a batch operation.
#[derive(Debug, Clone, Default)]
pub struct SelectedBoxes {
    boxes: Vec<BoxRef>,
}

impl SelectedBoxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `resolved` unless a box with the same label identifier is
    /// already present. Existing order is never changed.
    pub fn add(&mut self, resolved: BoxRef) -> AddOutcome {
        if self.contains(&resolved.label_identifier) {
            return AddOutcome { was_new: false };
        }
        self.boxes.push(resolved);
        AddOutcome { was_new: true }
    }

    /// Remove and return the most recently added box, or `None` when empty.
    pub fn undo_last(&mut self) -> Option<BoxRef> {
        self.boxes.pop()
    }

    /// Empty the list unconditionally.
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    /// Remove every box matching `predicate`, returning the removed boxes in
    /// their original order.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<BoxRef>
    where
        F: FnMut(&BoxRef) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.boxes.drain(..).partition(|b| predicate(b));
        self.boxes = kept;
        removed
    }

    pub fn contains(&self, label_identifier: &str) -> bool {
        self.boxes
            .iter()
            .any(|b| b.label_identifier == label_identifier)
    }

    pub fn count(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Read-only view of the current contents, oldest first.
    pub fn contents(&self) -> &[BoxRef] {
        &self.boxes
    }

    /// Label identifiers in insertion order.
    pub fn label_identifiers(&self) -> Vec<LabelIdentifier> {
        self.boxes
            .iter()
            .map(|b| b.label_identifier.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::box_state::BoxState;
    use crate::boxes::fixtures::{in_stock, with_state};

    #[test]
    fn add_appends_new_boxes_in_order() {
        let mut list = SelectedBoxes::new();
        assert!(list.add(in_stock("1")).was_new);
        assert!(list.add(in_stock("2")).was_new);
        assert_eq!(list.label_identifiers(), vec!["1", "2"]);
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let mut list = SelectedBoxes::new();
        list.add(in_stock("1"));
        list.add(in_stock("2"));

        let before = list.count();
        let outcome = list.add(in_stock("1"));

        assert!(!outcome.was_new);
        assert_eq!(list.count(), before);
        assert_eq!(list.label_identifiers(), vec!["1", "2"]);
    }

    #[test]
    fn duplicate_with_newer_snapshot_keeps_original() {
        let mut list = SelectedBoxes::new();
        list.add(in_stock("1"));
        list.add(with_state("1", BoxState::Lost));
        assert_eq!(list.contents()[0].state, BoxState::InStock);
    }

    #[test]
    fn undo_last_removes_most_recent() {
        let mut list = SelectedBoxes::new();
        list.add(in_stock("1"));
        list.add(in_stock("2"));

        let undone = list.undo_last().unwrap();
        assert_eq!(undone.label_identifier, "2");
        assert_eq!(list.label_identifiers(), vec!["1"]);
    }

    #[test]
    fn undo_last_on_empty_returns_none() {
        let mut list = SelectedBoxes::new();
        assert!(list.undo_last().is_none());
        assert_eq!(list.count(), 0);
        assert!(list.undo_last().is_none());
    }

    #[test]
    fn clear_empties_the_list() {
        let mut list = SelectedBoxes::new();
        list.add(in_stock("1"));
        list.add(in_stock("2"));
        list.clear();
        assert!(list.is_empty());
        assert!(list.add(in_stock("1")).was_new);
    }

    #[test]
    fn remove_where_strips_ineligible_boxes() {
        let mut list = SelectedBoxes::new();
        list.add(in_stock("1"));
        list.add(with_state("2", BoxState::MarkedForShipment));
        list.add(in_stock("3"));
        list.add(with_state("4", BoxState::Lost));

        let removed = list.remove_where(|b| !b.state.is_assignable_to_shipment());

        let removed_ids: Vec<_> = removed.iter().map(|b| b.label_identifier.as_str()).collect();
        assert_eq!(removed_ids, vec!["2", "4"]);
        assert_eq!(list.label_identifiers(), vec!["1", "3"]);
    }

    #[test]
    fn pruning_failed_leaves_only_updated() {
        let ids: Vec<String> = (1..=6).map(|i| i.to_string()).collect();
        for k in 0..=ids.len() {
            let mut list = SelectedBoxes::new();
            for id in &ids {
                list.add(in_stock(id));
            }
            let invalid: HashSet<&str> = ids[..k].iter().map(String::as_str).collect();
            let updated: HashSet<&str> = ids[k..].iter().map(String::as_str).collect();

            list.remove_where(|b| invalid.contains(b.label_identifier.as_str()));

            assert_eq!(list.count(), ids.len() - k);
            assert!(list
                .contents()
                .iter()
                .all(|b| updated.contains(b.label_identifier.as_str())));
        }
    }

    #[test]
    fn never_holds_duplicate_identifiers() {
        let mut list = SelectedBoxes::new();
        for id in ["1", "2", "1", "3", "2", "2", "4"] {
            list.add(in_stock(id));
        }
        let unique: HashSet<_> = list.label_identifiers().into_iter().collect();
        assert_eq!(unique.len(), list.count());
        assert_eq!(list.count(), 4);
    }
}
