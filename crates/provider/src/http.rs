//! HTTP page loader for the public artworks API.

use crate::PageLoader;
use async_trait::async_trait;
use pagesel_core::error::{SelectError, SelectResult};
use pagesel_core::{Artwork, Page};
use serde::Deserialize;
use url::Url;

/// Public Art Institute of Chicago API.
pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";

/// Rows per page in the table this loader feeds.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Only the columns the table shows; keeps payloads small.
const FIELDS: &str = "id,title,place_of_origin,artist_display,inscriptions,date_start,date_end";

/// Fetches pages of artworks over HTTP.
///
/// ```ignore
/// let loader = HttpPageLoader::new("https://api.artic.edu/api/v1")?.with_page_size(12);
/// let page = loader.fetch_page(1).await?;
/// ```
pub struct HttpPageLoader {
    client: reqwest::Client,
    base_url: Url,
    page_size: usize,
}

impl HttpPageLoader {
    pub fn new(base_url: &str) -> SelectResult<Self> {
        if base_url.trim().is_empty() {
            return Err(SelectError::InvalidInput("base URL must not be empty".into()));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| SelectError::InvalidInput(format!("bad base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SelectError::InvalidInput(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("pagesel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SelectError::Provider(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(base_url = %base_url, "http loader ready");

        Ok(Self {
            client,
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override rows per page (default: 12). Zero is ignored.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        if page_size > 0 {
            self.page_size = page_size;
        }
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn page_url(&self, page_index: u32) -> SelectResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SelectError::Internal(format!("{} lost its path", self.base_url)))?
            .pop_if_empty()
            .push("artworks");
        url.query_pairs_mut()
            .append_pair("page", &page_index.to_string())
            .append_pair("limit", &self.page_size.to_string())
            .append_pair("fields", FIELDS);
        Ok(url)
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    type Item = Artwork;

    async fn fetch_page(&self, page_index: u32) -> SelectResult<Page<Artwork>> {
        if page_index == 0 {
            return Err(SelectError::InvalidInput("page index is 1-based".into()));
        }

        let url = self.page_url(page_index)?;
        tracing::debug!(page_index, url = %url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SelectError::Provider(format!("Failed to fetch page {page_index}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SelectError::Provider(format!(
                "Page {page_index} returned HTTP {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            SelectError::Provider(format!("Failed to read page {page_index}: {e}"))
        })?;

        let page = decode_page(&body, page_index, self.page_size)?;
        tracing::info!(page_index, items = page.len(), total = page.total, "fetched page");
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    /// Absent on some error payloads; treated as an empty page.
    #[serde(default)]
    data: Vec<Artwork>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// `offset`, `total_pages` and `current_page` are also sent; unused here.
#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    limit: usize,
}

/// Decodes one response body. `page_size` fills in when the body omits it.
pub(crate) fn decode_page(
    body: &str,
    page_index: u32,
    page_size: usize,
) -> SelectResult<Page<Artwork>> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SelectError::MalformedPage(format!("page {page_index}: {e}")))?;

    let (total, limit) = match response.pagination {
        Some(p) => (p.total, if p.limit > 0 { p.limit } else { page_size }),
        None => (response.data.len() as u64, page_size),
    };

    Ok(Page::new(response.data, total, limit, page_index))
}
