//! Bulk "select the first N items" across page boundaries.
//!
//! Walks pages in order starting from the one the caller already has loaded,
//! fetching the rest on demand through a [`PageLoader`]. Every item it sees is
//! explicitly decided: the first `n` in global order are selected, the rest of
//! each visited page is deselected.

use crate::PageLoader;
use pagesel_core::error::{SelectError, SelectResult};
use pagesel_core::{Page, SelectionState};
use serde::Serialize;

/// Default cap on pages visited in one run, the loaded page included.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Why a bulk run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    /// All `n` items selected.
    Satisfied,
    /// An empty or undecodable page was reached.
    EndOfCollection,
    /// The page cap was hit before `n` items were found.
    PageLimit,
    /// A fetch failed. Pages visited before it keep their decisions.
    FetchFailed(String),
}

/// Summary of one bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub requested: u64,
    pub selected: u64,
    pub deselected: u64,
    pub pages_visited: u32,
    pub stop: StopReason,
}

impl BulkOutcome {
    /// `true` only when every requested item got selected.
    pub fn completed(&self) -> bool {
        self.stop == StopReason::Satisfied
    }
}

/// Cross-page bulk selector.
///
/// Owns a loader and walks pages strictly one after another; there is no
/// parallel fetching and no cancellation beyond the stop conditions.
///
/// ```ignore
/// let selector = BulkSelector::new(loader).with_max_pages(50);
/// let outcome = selector.select_first_n(&mut state, 15, &page, 1).await?;
/// ```
pub struct BulkSelector<L> {
    loader: L,
    max_pages: u32,
}

impl<L: PageLoader> BulkSelector<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Override the page cap (default: 100). Values below 1 become 1.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Selects the first `n` items starting at `current_page`, deselecting every
    /// other item on the pages it visits.
    ///
    /// `current_page` is consumed as-is; later pages come from the loader.
    /// A non-positive `n` is rejected before anything is touched. Fetch
    /// failures do not surface as `Err`: they end the walk and show up in
    /// [`BulkOutcome::stop`], with earlier pages left committed.
    ///
    /// The `&mut` borrow keeps other mutations out while the run is in flight.
    pub async fn select_first_n(
        &self,
        state: &mut SelectionState,
        n: i64,
        current_page: &Page<L::Item>,
        current_page_index: u32,
    ) -> SelectResult<BulkOutcome> {
        if n <= 0 {
            return Err(SelectError::InvalidInput(format!(
                "bulk count must be positive, got {n}"
            )));
        }

        let requested = n as u64;
        let mut remaining = requested;
        let mut outcome = BulkOutcome {
            requested,
            selected: 0,
            deselected: 0,
            pages_visited: 0,
            stop: StopReason::Satisfied,
        };

        tracing::info!(
            n = requested,
            start_page = current_page_index,
            max_pages = self.max_pages,
            "bulk select started"
        );

        let mut page_index = current_page_index;
        let mut fetched: Option<Page<L::Item>> = None;

        let stop = loop {
            if outcome.pages_visited >= self.max_pages {
                tracing::warn!(
                    page_index,
                    max_pages = self.max_pages,
                    remaining,
                    "page cap reached"
                );
                break StopReason::PageLimit;
            }

            let page: &Page<L::Item> = if outcome.pages_visited == 0 {
                current_page
            } else {
                match self.loader.fetch_page(page_index).await {
                    Ok(page) => &*fetched.insert(page),
                    Err(SelectError::MalformedPage(reason)) => {
                        tracing::warn!(page_index, reason = %reason, "malformed page, treating as end");
                        break StopReason::EndOfCollection;
                    }
                    Err(e) => {
                        tracing::warn!(page_index, error = %e, "page fetch failed, keeping selections so far");
                        break StopReason::FetchFailed(e.to_string());
                    }
                }
            };

            if page.is_empty() {
                tracing::debug!(page_index, "empty page, end of collection");
                break StopReason::EndOfCollection;
            }

            let take = usize::try_from(remaining).unwrap_or(usize::MAX);
            let selected = state.select_prefix(&page.items, take);

            outcome.selected += selected as u64;
            outcome.deselected += (page.len() - selected) as u64;
            outcome.pages_visited += 1;
            remaining -= selected as u64;

            tracing::debug!(page_index, selected, remaining, "page consumed");

            if remaining == 0 {
                break StopReason::Satisfied;
            }

            page_index = match page_index.checked_add(1) {
                Some(next) => next,
                None => break StopReason::PageLimit,
            };
        };

        outcome.stop = stop;

        tracing::info!(
            selected = outcome.selected,
            deselected = outcome.deselected,
            pages_visited = outcome.pages_visited,
            stop = ?outcome.stop,
            "bulk select done"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryPageLoader;
    use pagesel_core::{ItemId, Membership};

    /// 30 items, pages of 12 / 12 / 6.
    fn selector() -> BulkSelector<MemoryPageLoader<ItemId>> {
        BulkSelector::new(MemoryPageLoader::new((1..=30).map(ItemId).collect(), 12))
    }

    fn selected_ids(state: &SelectionState) -> Vec<u64> {
        let mut ids: Vec<u64> = state.selected_ids().map(|id| id.0).collect();
        ids.sort_unstable();
        ids
    }

    #[tokio::test]
    async fn crosses_into_second_page() {
        let selector = selector();
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 15, &page1, 1)
            .await
            .unwrap();

        assert_eq!(selected_ids(&state), (1..=15).collect::<Vec<_>>());
        for id in 16..=24 {
            assert_eq!(state.membership(ItemId(id)), Membership::Deselected);
        }
        for id in 25..=30 {
            assert_eq!(state.membership(ItemId(id)), Membership::Undecided);
        }
        assert_eq!(selector.loader().requested(), vec![2]);
        assert_eq!(outcome.selected, 15);
        assert_eq!(outcome.deselected, 9);
        assert_eq!(outcome.pages_visited, 2);
        assert!(outcome.completed());
    }

    #[tokio::test]
    async fn exact_page_fetches_nothing() {
        let selector = selector();
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 12, &page1, 1)
            .await
            .unwrap();

        assert_eq!(selected_ids(&state), (1..=12).collect::<Vec<_>>());
        assert!(selector.loader().requested().is_empty());
        assert_eq!(outcome.pages_visited, 1);
        assert!(outcome.completed());
    }

    #[tokio::test]
    async fn stops_at_end_of_collection() {
        let selector = selector();
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 1000, &page1, 1)
            .await
            .unwrap();

        assert_eq!(state.selection_count(), 30);
        assert_eq!(selector.loader().requested(), vec![2, 3, 4]);
        assert_eq!(outcome.stop, StopReason::EndOfCollection);
        assert_eq!(outcome.pages_visited, 3);
        assert!(!outcome.completed());
    }

    #[tokio::test]
    async fn non_positive_count_is_rejected_untouched() {
        let selector = selector();
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();
        state.set_selected(ItemId(3), true);

        for n in [0, -1, i64::MIN] {
            let err = selector
                .select_first_n(&mut state, n, &page1, 1)
                .await
                .unwrap_err();
            assert!(matches!(err, SelectError::InvalidInput(_)));
        }

        assert_eq!(selected_ids(&state), vec![3]);
        assert_eq!(state.membership(ItemId(4)), Membership::Undecided);
        assert!(selector.loader().requested().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_earlier_pages() {
        let selector =
            BulkSelector::new(MemoryPageLoader::new((1..=30).map(ItemId).collect(), 12).failing_on(2));
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 20, &page1, 1)
            .await
            .unwrap();

        assert_eq!(selected_ids(&state), (1..=12).collect::<Vec<_>>());
        assert!(matches!(outcome.stop, StopReason::FetchFailed(_)));
        assert_eq!(outcome.selected, 12);
        assert_eq!(selector.loader().requested(), vec![2]);
    }

    #[tokio::test]
    async fn malformed_page_counts_as_end() {
        let selector =
            BulkSelector::new(MemoryPageLoader::new((1..=30).map(ItemId).collect(), 12).malformed_on(3));
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 30, &page1, 1)
            .await
            .unwrap();

        assert_eq!(outcome.stop, StopReason::EndOfCollection);
        assert_eq!(state.selection_count(), 24);
    }

    #[tokio::test]
    async fn page_cap_bounds_fetching() {
        let loader = MemoryPageLoader::new((1..=1_000).map(ItemId).collect(), 10);
        let selector = BulkSelector::new(loader).with_max_pages(3);
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 500, &page1, 1)
            .await
            .unwrap();

        assert_eq!(outcome.stop, StopReason::PageLimit);
        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(state.selection_count(), 30);
        assert_eq!(selector.loader().requested(), vec![2, 3]);
    }

    #[tokio::test]
    async fn starts_from_current_page() {
        let selector = selector();
        let page2 = selector.loader().page(2);
        let mut state = SelectionState::new();

        selector
            .select_first_n(&mut state, 14, &page2, 2)
            .await
            .unwrap();

        assert_eq!(selected_ids(&state), (13..=26).collect::<Vec<_>>());
        assert_eq!(state.membership(ItemId(1)), Membership::Undecided);
        for id in 27..=30 {
            assert_eq!(state.membership(ItemId(id)), Membership::Deselected);
        }
        assert_eq!(selector.loader().requested(), vec![3]);
    }

    #[tokio::test]
    async fn overrides_earlier_choices_on_visited_pages() {
        let selector = selector();
        let page1 = selector.loader().page(1);
        let mut state = SelectionState::new();
        state.set_page_all_selected(&page1.items, true);
        state.set_selected(ItemId(2), false);

        selector
            .select_first_n(&mut state, 5, &page1, 1)
            .await
            .unwrap();

        assert_eq!(selected_ids(&state), (1..=5).collect::<Vec<_>>());
        assert_eq!(state.membership(ItemId(12)), Membership::Deselected);
    }

    #[tokio::test]
    async fn empty_current_page_ends_immediately() {
        let selector = selector();
        let beyond = selector.loader().page(9);
        let mut state = SelectionState::new();

        let outcome = selector
            .select_first_n(&mut state, 5, &beyond, 9)
            .await
            .unwrap();

        assert_eq!(outcome.stop, StopReason::EndOfCollection);
        assert_eq!(outcome.pages_visited, 0);
        assert!(selector.loader().requested().is_empty());
    }

    #[tokio::test]
    async fn count_matches_enumeration_after_mixed_ops() {
        let selector = selector();
        let page1 = selector.loader().page(1);
        let page3 = selector.loader().page(3);
        let mut state = SelectionState::new();

        selector
            .select_first_n(&mut state, 17, &page1, 1)
            .await
            .unwrap();
        state.apply_page_selection(&page3.items, &page3.items[..2]);
        state.set_selected(ItemId(4), false);
        state.set_page_all_selected(&page1.items[6..], false);

        let enumerated = (1..=30).filter(|id| state.is_selected(ItemId(*id))).count();
        assert_eq!(state.selection_count(), enumerated);
        assert!(state.check_invariant().is_ok());
    }

    #[test]
    fn outcome_serializes_with_reason_tag() {
        let outcome = BulkOutcome {
            requested: 20,
            selected: 12,
            deselected: 0,
            pages_visited: 1,
            stop: StopReason::FetchFailed("boom".into()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["stop"]["reason"], "fetch_failed");
        assert_eq!(json["stop"]["detail"], "boom");
    }
}
