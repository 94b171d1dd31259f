//! Cross-page selection state.
//!
//! Ids live in one of two disjoint sets: `included` (explicitly selected) or
//! `excluded` (explicitly deselected). An id in neither is undecided and reads
//! as not selected. Every mutation inserts into one set and removes from the
//! other, so the sets never overlap.

use crate::error::{SelectError, SelectResult};
use crate::types::{Identified, ItemId};
use std::collections::HashSet;

/// Explicit state of a single id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    Selected,
    Deselected,
    Undecided,
}

/// Selection across every page the session has touched, visited or not.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    included: HashSet<ItemId>,
    excluded: HashSet<ItemId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) lookup.
    #[inline]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.included.contains(&id) && !self.excluded.contains(&id)
    }

    pub fn membership(&self, id: ItemId) -> Membership {
        if self.is_selected(id) {
            Membership::Selected
        } else if self.excluded.contains(&id) {
            Membership::Deselected
        } else {
            Membership::Undecided
        }
    }

    /// Idempotent.
    pub fn set_selected(&mut self, id: ItemId, selected: bool) {
        if selected {
            self.excluded.remove(&id);
            self.included.insert(id);
        } else {
            self.included.remove(&id);
            self.excluded.insert(id);
        }
    }

    /// Reconciles a whole page against the full subset the user now has checked
    /// on it. Items of the page missing from `selected_subset` become explicitly
    /// deselected, so no id on the page is left undecided.
    ///
    /// Ids in `selected_subset` that are not on the page are ignored.
    pub fn apply_page_selection<T, S>(&mut self, page_items: &[T], selected_subset: &[S])
    where
        T: Identified,
        S: Identified,
    {
        let checked: HashSet<ItemId> = selected_subset.iter().map(Identified::id).collect();
        for item in page_items {
            let id = item.id();
            self.set_selected(id, checked.contains(&id));
        }
    }

    /// Header checkbox: same state for every item on the page.
    pub fn set_page_all_selected<T: Identified>(&mut self, page_items: &[T], selected: bool) {
        for item in page_items {
            self.set_selected(item.id(), selected);
        }
    }

    /// Selects the first `take` items of the page and deselects the rest.
    ///
    /// Returns how many items were selected (`take` clamped to the page length).
    pub fn select_prefix<T: Identified>(&mut self, page_items: &[T], take: usize) -> usize {
        let take = take.min(page_items.len());
        let (head, tail) = page_items.split_at(take);
        self.set_page_all_selected(head, true);
        self.set_page_all_selected(tail, false);
        take
    }

    /// Items of the page currently shown as checked, in page order.
    pub fn selected_on_page<'a, T: Identified>(&self, page_items: &'a [T]) -> Vec<&'a T> {
        page_items
            .iter()
            .filter(|item| self.is_selected(item.id()))
            .collect()
    }

    /// Header checkbox state. An empty page is never "all selected".
    pub fn is_page_all_selected<T: Identified>(&self, page_items: &[T]) -> bool {
        !page_items.is_empty() && page_items.iter().all(|item| self.is_selected(item.id()))
    }

    /// Size of the effective selected set.
    pub fn selection_count(&self) -> usize {
        // `included` and `excluded` are disjoint, so this is just `included`.
        self.included.len()
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.included.iter().copied()
    }

    pub fn clear(&mut self) {
        self.included.clear();
        self.excluded.clear();
    }

    /// Verifies the disjointness invariant.
    pub fn check_invariant(&self) -> SelectResult<()> {
        match self.included.intersection(&self.excluded).next() {
            Some(id) => Err(SelectError::Internal(format!(
                "id {id} is both included and excluded"
            ))),
            None => Ok(()),
        }
    }
}

/// Parses a user-typed bulk count. Only strictly positive integers pass.
pub fn parse_count(raw: &str) -> SelectResult<u64> {
    let trimmed = raw.trim();
    let n: i64 = trimmed
        .parse()
        .map_err(|_| SelectError::InvalidInput(format!("not a number: {trimmed:?}")))?;
    if n <= 0 {
        return Err(SelectError::InvalidInput(format!(
            "count must be positive, got {n}"
        )));
    }
    Ok(n as u64)
}
