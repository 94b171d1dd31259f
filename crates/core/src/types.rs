//! Domain types for pagesel.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identifier of one record in the remote collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl From<u64> for ItemId {
    #[inline]
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Anything the selection tracker can reason about. Only the id matters.
pub trait Identified {
    fn id(&self) -> ItemId;
}

impl Identified for ItemId {
    #[inline]
    fn id(&self) -> ItemId {
        *self
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    #[inline]
    fn id(&self) -> ItemId {
        (**self).id()
    }
}

// ---------------------------------------------------------------------------
// Artwork
// ---------------------------------------------------------------------------

/// One row of the artworks collection -- only the fields the table shows.
///
/// Every field but `id` may come back `null` from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub artist_display: Option<String>,
    #[serde(default)]
    pub inscriptions: Option<String>,
    #[serde(default)]
    pub date_start: Option<i64>,
    #[serde(default)]
    pub date_end: Option<i64>,
}

impl Artwork {
    /// Bare record with only an id; the rest left empty.
    pub fn with_id(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
        }
    }
}

impl Identified for Artwork {
    #[inline]
    fn id(&self) -> ItemId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// An ordered slice of the collection plus the metadata needed to page it.
///
/// `page_index` is 1-based. Pages are transient: the tracker never keeps one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole collection as reported by the source.
    pub total: u64,
    pub page_size: usize,
    pub page_index: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page_size: usize, page_index: u32) -> Self {
        Self {
            items,
            total,
            page_size,
            page_index,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages needed for `total` at this page size.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }
}

impl<T: Identified> Page<T> {
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(Identified::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artwork_decodes_with_nulls() {
        let raw = r#"{"id": 27992, "title": "A Sunday on La Grande Jatte", "inscriptions": null}"#;
        let art: Artwork = serde_json::from_str(raw).unwrap();
        assert_eq!(art.id, ItemId(27992));
        assert_eq!(art.title.as_deref(), Some("A Sunday on La Grande Jatte"));
        assert!(art.inscriptions.is_none());
        assert!(art.date_start.is_none());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<ItemId> = Page::new(Vec::new(), 30, 12, 1);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(Page::<ItemId>::new(Vec::new(), 30, 0, 1).total_pages(), 0);
    }

    #[test]
    fn ids_follow_page_order() {
        let page = Page::new(vec![ItemId(9), ItemId(3), ItemId(5)], 3, 3, 1);
        let ids: Vec<_> = page.ids().collect();
        assert_eq!(ids, vec![ItemId(9), ItemId(3), ItemId(5)]);
    }
}
