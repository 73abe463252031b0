use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A contiguous, inclusive range of page numbers shown as page buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageWindow {
    pub start: usize,
    pub end: usize, // inclusive
}

impl PageWindow {
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, page: usize) -> bool {
        (self.start..=self.end).contains(&page)
    }

    pub fn pages(&self) -> core::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// The half-open index range `[start_index, end_index)` of items shown for one page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSlice {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl PageSlice {
    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
    }
}

/// Which edge-jump buttons apply to the current page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavAffordances {
    pub first: bool,
    pub prev: bool,
    pub next: bool,
    pub last: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonKind {
    First,
    Prev,
    Page,
    Next,
    Last,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageButton {
    pub kind: ButtonKind,
    /// The page this button navigates to.
    pub page: usize,
    /// `true` only for the page button of the current page.
    pub active: bool,
}

impl PageButton {
    pub fn label(&self) -> String {
        match self.kind {
            ButtonKind::First => "<<".to_string(),
            ButtonKind::Prev => "<".to_string(),
            ButtonKind::Page => self.page.to_string(),
            ButtonKind::Next => ">".to_string(),
            ButtonKind::Last => ">>".to_string(),
        }
    }
}

/// Everything a render sink needs to draw the page controls, in display order.
///
/// An empty spec (no buttons) means there is nothing to paginate; sinks are expected to hide the
/// surface in that case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowSpec {
    pub current_page: usize,
    pub total_pages: usize,
    pub buttons: Vec<PageButton>,
}

impl WindowSpec {
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn page_buttons(&self) -> impl Iterator<Item = &PageButton> + '_ {
        self.buttons.iter().filter(|b| b.kind == ButtonKind::Page)
    }

    pub fn has(&self, kind: ButtonKind) -> bool {
        self.buttons.iter().any(|b| b.kind == kind)
    }
}
