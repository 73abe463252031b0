/// Configuration for [`crate::PaginationState`].
///
/// Both values are clamped to at least 1 when read through the accessors; a zero page size or
/// window width would make every page empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PagerOptions {
    /// Number of items shown per page.
    pub items_per_page: usize,
    /// Maximum number of numbered page buttons in the sliding window.
    pub max_pages: usize,
}

impl PagerOptions {
    pub fn new(items_per_page: usize, max_pages: usize) -> Self {
        Self {
            items_per_page,
            max_pages,
        }
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page.max(1)
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages.max(1)
    }
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            items_per_page: 15,
            max_pages: 10,
        }
    }
}
