//! In-memory page loader over a fixed item list.
//!
//! Backs the CLI's `--synthetic` mode, tests, and benchmarks. Records every
//! page index it is asked for so callers can assert on traversal order.

use crate::PageLoader;
use async_trait::async_trait;
use pagesel_core::error::{SelectError, SelectResult};
use pagesel_core::{Artwork, Identified, Page};
use std::sync::Mutex;

pub struct MemoryPageLoader<T> {
    items: Vec<T>,
    page_size: usize,
    fail_on: Option<u32>,
    malformed_on: Option<u32>,
    requested: Mutex<Vec<u32>>,
}

impl<T: Identified + Clone + Send + Sync> MemoryPageLoader<T> {
    /// A zero `page_size` is bumped to 1.
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            fail_on: None,
            malformed_on: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Makes `fetch_page(page_index)` return a provider error.
    pub fn failing_on(mut self, page_index: u32) -> Self {
        self.fail_on = Some(page_index);
        self
    }

    /// Makes `fetch_page(page_index)` return an undecodable-payload error.
    pub fn malformed_on(mut self, page_index: u32) -> Self {
        self.malformed_on = Some(page_index);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Builds a page without recording a request. Used for the page a caller
    /// already has on screen.
    pub fn page(&self, page_index: u32) -> Page<T> {
        let total = self.items.len() as u64;
        let start = (page_index.saturating_sub(1) as usize).saturating_mul(self.page_size);
        let items = if page_index == 0 || start >= self.items.len() {
            Vec::new()
        } else {
            let end = (start + self.page_size).min(self.items.len());
            self.items[start..end].to_vec()
        };
        Page::new(items, total, self.page_size, page_index)
    }

    /// Page indices requested through [`PageLoader::fetch_page`], in order.
    pub fn requested(&self) -> Vec<u32> {
        self.requested
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl MemoryPageLoader<Artwork> {
    /// `total` placeholder artworks with ids `1..=total`.
    pub fn synthetic(total: u64, page_size: usize) -> Self {
        let items = (1..=total)
            .map(|id| {
                let mut art = Artwork::with_id(id);
                art.title = Some(format!("Untitled #{id}"));
                art
            })
            .collect();
        Self::new(items, page_size)
    }
}

#[async_trait]
impl<T: Identified + Clone + Send + Sync> PageLoader for MemoryPageLoader<T> {
    type Item = T;

    async fn fetch_page(&self, page_index: u32) -> SelectResult<Page<T>> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(page_index);
        }

        if self.fail_on == Some(page_index) {
            return Err(SelectError::Provider(format!(
                "page {page_index} unavailable"
            )));
        }
        if self.malformed_on == Some(page_index) {
            return Err(SelectError::MalformedPage(format!(
                "page {page_index}: truncated body"
            )));
        }

        Ok(self.page(page_index))
    }
}
