//! Page loading and cross-page bulk selection for pagesel.

pub mod bulk;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use pagesel_core::error::SelectResult;
use pagesel_core::{Identified, Page};

pub use bulk::{BulkOutcome, BulkSelector, StopReason};
pub use http::HttpPageLoader;
pub use memory::MemoryPageLoader;

/// Abstraction for fetching one page of the collection from any source.
///
/// No caching, retries, or rate limiting are expected here; every call may
/// hit the backing source.
#[async_trait]
pub trait PageLoader: Send + Sync {
    type Item: Identified + Send;

    /// `page_index` is 1-based. An empty page means the collection ended.
    async fn fetch_page(&self, page_index: u32) -> SelectResult<Page<Self::Item>>;
}
