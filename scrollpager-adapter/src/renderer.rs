use scrollpager::{PageSlice, PaginationState};

use crate::{ContentProvider, HostError, RenderSink};

/// Whether a render should bring the content region into view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollIntent {
    /// The user changed pages: scroll the region into view.
    IntoView,
    /// A background resync: leave the scroll position alone.
    Preserve,
}

/// Where a page is drawn.
#[derive(Debug)]
pub struct RenderTarget<'a, N> {
    pub region: &'a N,
    pub surface: &'a N,
}

/// Shows exactly the items of the current page and hides every other item.
///
/// Visibility is recomputed for the whole collection on every call; nothing is diffed against the
/// previous page.
pub fn apply_visibility<P: ContentProvider + ?Sized>(
    provider: &mut P,
    items: &[P::Item],
    state: &PaginationState,
) -> PageSlice {
    let slice = state.page_slice();
    for (index, item) in items.iter().enumerate() {
        provider.set_item_visible(item, slice.contains(index));
    }
    slice
}

/// Applies `state` to the items and to the render surface.
///
/// With no pages to show, the surface is hidden and receives an empty button list.
pub fn render_page<P, S>(
    provider: &mut P,
    sink: &mut S,
    target: RenderTarget<'_, P::Node>,
    items: &[P::Item],
    state: &PaginationState,
    scroll: ScrollIntent,
) -> Result<PageSlice, HostError>
where
    P: ContentProvider + ?Sized,
    S: RenderSink<Node = P::Node> + ?Sized,
{
    let slice = apply_visibility(provider, items, state);

    let spec = state.window_spec();
    sink.set_surface_visible(target.surface, !spec.is_empty());
    sink.set_buttons(target.surface, &spec)?;

    if scroll == ScrollIntent::IntoView {
        sink.scroll_into_view(target.region);
    }

    adebug!(
        page = state.current_page(),
        total_pages = state.total_pages(),
        shown = slice.len(),
        "page rendered"
    );
    Ok(slice)
}

/// Makes every item visible again, handing the list back to the source's native behavior.
pub fn restore_visibility<P: ContentProvider + ?Sized>(provider: &mut P, items: &[P::Item]) {
    for item in items {
        provider.set_item_visible(item, true);
    }
}
