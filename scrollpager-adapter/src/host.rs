use scrollpager::{ItemCollector, ItemSource, RegionLocator, WindowSpec};

use crate::HostError;

/// The external content source: the document region holding the list and its items.
///
/// Discovery defaults to the ordered strategy lists in [`RegionLocator`] and [`ItemCollector`];
/// hosts with a different document shape override `locate_region`/`snapshot_items`.
///
/// Change notifications are push-based: once `subscribe_to_changes` succeeds, the host forwards
/// each batch of change records to [`crate::Controller::on_changes`]. The returned subscription is
/// handed back through `unsubscribe` on teardown.
pub trait ContentProvider: ItemSource {
    type Subscription;

    fn locate_region(&self) -> Option<Self::Node> {
        RegionLocator::default().locate(self)
    }

    /// Returns a fresh, ordered snapshot of the items in `region`.
    fn snapshot_items(&self, region: &Self::Node) -> Vec<Self::Item> {
        ItemCollector::default().collect(self, region)
    }

    /// Asks the source to reveal more items (e.g. scrolls to the bottom).
    fn request_more_items(&mut self, region: &Self::Node);

    /// Restores the view's scroll position to the top after background loading.
    fn restore_scroll_top(&mut self);

    fn set_item_visible(&mut self, item: &Self::Item, visible: bool);

    fn subscribe_to_changes(&mut self, region: &Self::Node)
    -> Result<Self::Subscription, HostError>;

    fn unsubscribe(&mut self, subscription: Self::Subscription);

    /// Stops the source from appending items on its own. Only called when
    /// `EngineOptions::suspend_source_after_load` is set.
    fn suspend_background_loading(&mut self) {}
}

/// Presentation of the page controls.
pub trait RenderSink {
    type Node: Clone + PartialEq;

    /// Creates and inserts the render surface near `region`, returning the surface node.
    fn mount(&mut self, region: &Self::Node) -> Result<Self::Node, HostError>;

    fn unmount(&mut self, surface: &Self::Node);

    /// Replaces the surface's buttons with `spec`.
    fn set_buttons(&mut self, surface: &Self::Node, spec: &WindowSpec) -> Result<(), HostError>;

    /// Shows or hides the surface; hidden while there is nothing to paginate.
    fn set_surface_visible(&mut self, surface: &Self::Node, visible: bool) {
        let _ = (surface, visible);
    }

    fn scroll_into_view(&mut self, region: &Self::Node);
}

/// The current location and its page query parameter.
///
/// Navigation interception is push-based: the host forwards history events to
/// [`crate::Controller::on_navigate`].
pub trait LocationStore {
    /// The full current location, used to detect route changes.
    fn href(&self) -> &str;

    fn path(&self) -> &str;

    fn page_param(&self, name: &str) -> Option<i64>;

    /// Updates the page parameter without reloading or pushing a history entry.
    fn set_page_param(&mut self, name: &str, page: usize) -> Result<(), HostError>;
}
