use scrollpager::PaginationState;

use crate::renderer::RenderTarget;

/// Everything owned by one route activation, from the first render until teardown.
#[derive(Debug)]
pub(crate) struct Session<N, I, Sub> {
    pub(crate) epoch: u64,
    pub(crate) region: N,
    pub(crate) surface: N,
    /// Snapshot taken at the last collection point; replaced wholesale on every resync.
    pub(crate) items: Vec<I>,
    pub(crate) state: PaginationState,
    pub(crate) subscription: Option<Sub>,
}

impl<N, I, Sub> Session<N, I, Sub> {
    pub(crate) fn target(&self) -> RenderTarget<'_, N> {
        RenderTarget {
            region: &self.region,
            surface: &self.surface,
        }
    }

    /// Replaces the item snapshot and recomputes the state against its length.
    pub(crate) fn replace_items(&mut self, items: Vec<I>) {
        self.items = items;
        self.state = self.state.recompute(self.items.len());
    }
}
