use alloc::vec::Vec;

use crate::{ButtonKind, NavAffordances, PageButton, PageSlice, PageWindow, PagerOptions, WindowSpec};

/// Pagination state over a changing item count.
///
/// This is plain data: every transition (`recompute`, `go_to`, `seed_from_param`) returns a new
/// value and keeps `1 <= current_page <= max(total_pages, 1)`. Derived values (page window, item
/// slice, button spec) are computed on demand and never cached, so they cannot drift from the
/// item count they were computed for.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "StateFields"))]
pub struct PaginationState {
    current_page: usize,
    items_per_page: usize,
    max_pages: usize,
    total_items: usize,
}

impl PaginationState {
    /// Creates an empty state on page 1.
    pub fn new(options: PagerOptions) -> Self {
        Self {
            current_page: 1,
            items_per_page: options.items_per_page(),
            max_pages: options.max_pages(),
            total_items: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// `ceil(total_items / items_per_page)`, `0` for an empty collection.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page)
    }

    fn last_page(&self) -> usize {
        self.total_pages().max(1)
    }

    /// Applies a fresh item count and clamps the current page into range.
    ///
    /// Idempotent: recomputing twice with the same count yields the same state.
    #[must_use]
    pub fn recompute(mut self, total_items: usize) -> Self {
        self.total_items = total_items;
        self.current_page = self.current_page.clamp(1, self.last_page());
        pdebug!(
            total_items,
            total_pages = self.total_pages(),
            current_page = self.current_page,
            "PaginationState::recompute"
        );
        self
    }

    /// Moves to `page`, clamped into `[1, max(total_pages, 1)]`.
    #[must_use]
    pub fn go_to(mut self, page: usize) -> Self {
        self.current_page = page.clamp(1, self.last_page());
        self
    }

    /// Seeds the current page from a parsed URL parameter.
    ///
    /// A missing value or a value below 1 selects page 1; a value past the end selects the last
    /// page (or page 1 when there are no pages).
    #[must_use]
    pub fn seed_from_param(self, param: Option<i64>) -> Self {
        let page = match param {
            Some(p) if p >= 1 => usize::try_from(p).unwrap_or(usize::MAX),
            _ => 1,
        };
        self.go_to(page)
    }

    /// Computes the sliding window of numbered page buttons, centered on the current page.
    ///
    /// Returns `None` when there are no pages.
    pub fn page_window(&self) -> Option<PageWindow> {
        let total_pages = self.total_pages();
        if total_pages == 0 {
            return None;
        }

        let total = total_pages as i64;
        let max = self.max_pages as i64;
        let current = self.current_page as i64;
        let half = max / 2;

        let mut start = current - half;
        let mut end = current + half;
        if max % 2 == 0 {
            end -= 1;
        }

        if start < 1 {
            end += 1 - start;
            start = 1;
        }
        if end > total {
            start -= end - total;
            end = total;
            if start < 1 {
                start = 1;
            }
        }
        if end - start + 1 > max {
            end = (start + max - 1).min(total);
        }

        Some(PageWindow {
            start: start as usize,
            end: end as usize,
        })
    }

    pub fn nav(&self) -> NavAffordances {
        let has_prev = self.current_page > 1;
        let has_next = self.current_page < self.total_pages();
        NavAffordances {
            first: has_prev,
            prev: has_prev,
            next: has_next,
            last: has_next,
        }
    }

    /// Returns the item index range shown for `page`.
    ///
    /// Pages past the end yield an empty slice positioned at `total_items`.
    pub fn slice_for(&self, page: usize) -> PageSlice {
        let start_index = page
            .saturating_sub(1)
            .saturating_mul(self.items_per_page)
            .min(self.total_items);
        let end_index = start_index
            .saturating_add(self.items_per_page)
            .min(self.total_items);
        PageSlice {
            start_index,
            end_index,
        }
    }

    /// The item index range shown for the current page.
    pub fn page_slice(&self) -> PageSlice {
        self.slice_for(self.current_page)
    }

    /// Builds the ordered button list for the current page: `<<`, `<`, numbered pages, `>`, `>>`.
    pub fn window_spec(&self) -> WindowSpec {
        let total_pages = self.total_pages();
        let current = self.current_page;
        let mut buttons = Vec::new();

        if let Some(window) = self.page_window() {
            let nav = self.nav();
            let mut push = |kind: ButtonKind, page: usize| {
                buttons.push(PageButton {
                    kind,
                    page,
                    active: kind == ButtonKind::Page && page == current,
                })
            };

            if nav.first {
                push(ButtonKind::First, 1);
            }
            if nav.prev {
                push(ButtonKind::Prev, current - 1);
            }
            for page in window.pages() {
                push(ButtonKind::Page, page);
            }
            if nav.next {
                push(ButtonKind::Next, current + 1);
            }
            if nav.last {
                push(ButtonKind::Last, total_pages);
            }
        }

        WindowSpec {
            current_page: current,
            total_pages,
            buttons,
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(PagerOptions::default())
    }
}

/// Wire form of [`PaginationState`]; normalized on the way in so a decoded state upholds the same
/// bounds as a constructed one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StateFields {
    current_page: usize,
    items_per_page: usize,
    max_pages: usize,
    total_items: usize,
}

#[cfg(feature = "serde")]
impl From<StateFields> for PaginationState {
    fn from(fields: StateFields) -> Self {
        Self::new(PagerOptions::new(fields.items_per_page, fields.max_pages))
            .recompute(fields.total_items)
            .go_to(fields.current_page)
    }
}
