use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

/// Read-only view of the host's node tree.
///
/// The engine only needs ancestry and tag names: enough to tell whether a changed node sits inside
/// the content region, the render surface, or an embedded media element.
pub trait NodeTree {
    type Node: Clone + PartialEq;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Lower- or upper-case tag name; `None` for non-element nodes (e.g. text).
    fn tag_name(&self, node: &Self::Node) -> Option<&str>;

    /// Returns `true` if `node` is `ancestor` or one of its descendants.
    fn is_inclusive_descendant(&self, node: &Self::Node, ancestor: &Self::Node) -> bool {
        let mut cur = Some(node.clone());
        while let Some(n) = cur {
            if n == *ancestor {
                return true;
            }
            cur = self.parent(&n);
        }
        false
    }
}

/// Selector queries over the host document.
///
/// Selector strings are opaque to this crate; the host decides how to evaluate them.
pub trait ItemSource: NodeTree {
    type Item: Clone;

    /// First node in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// All items under `scope` matching `selector`, in document order.
    fn select_all(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Item>;

    /// Direct children of `scope`, in document order.
    fn children(&self, scope: &Self::Node) -> Vec<Self::Item>;
}

/// One way of finding list items inside a content region.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemStrategy {
    Selector(Cow<'static, str>),
    /// Every direct child of the region; the last-resort strategy.
    DirectChildren,
}

impl ItemStrategy {
    pub const fn selector(selector: &'static str) -> Self {
        Self::Selector(Cow::Borrowed(selector))
    }

    fn apply<S: ItemSource + ?Sized>(&self, source: &S, region: &S::Node) -> Vec<S::Item> {
        match self {
            Self::Selector(selector) => source.select_all(region, selector),
            Self::DirectChildren => source.children(region),
        }
    }
}

/// Snapshots the ordered item list of a content region.
///
/// Strategies are tried in priority order and the first non-empty match wins. The default order
/// targets topic lists: rows, then cards, then the generic item class, then any direct child.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemCollector {
    strategies: Vec<ItemStrategy>,
}

impl ItemCollector {
    pub fn new(strategies: Vec<ItemStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[ItemStrategy] {
        &self.strategies
    }

    /// Returns the items found by the first matching strategy, or an empty list.
    ///
    /// This has no side effects and can be called at any time.
    pub fn collect<S: ItemSource + ?Sized>(&self, source: &S, region: &S::Node) -> Vec<S::Item> {
        for (_rank, strategy) in self.strategies.iter().enumerate() {
            let items = strategy.apply(source, region);
            if !items.is_empty() {
                ptrace!(rank = _rank, count = items.len(), "ItemCollector::collect matched");
                return items;
            }
        }
        Vec::new()
    }
}

impl Default for ItemCollector {
    fn default() -> Self {
        Self::new(vec![
            ItemStrategy::selector("tr.topic-list-item"),
            ItemStrategy::selector(".latest-topic-list-item"),
            ItemStrategy::selector(".topic-list-item"),
            ItemStrategy::DirectChildren,
        ])
    }
}

/// Finds the content region with an ordered list of selectors; the first match wins.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionLocator {
    selectors: Vec<Cow<'static, str>>,
}

impl RegionLocator {
    pub fn new(selectors: Vec<Cow<'static, str>>) -> Self {
        Self { selectors }
    }

    pub fn selectors(&self) -> &[Cow<'static, str>] {
        &self.selectors
    }

    pub fn locate<S: ItemSource + ?Sized>(&self, source: &S) -> Option<S::Node> {
        self.selectors
            .iter()
            .find_map(|selector| source.query_selector(selector))
    }
}

impl Default for RegionLocator {
    fn default() -> Self {
        Self::new(vec![
            Cow::Borrowed(".topic-list tbody"),
            Cow::Borrowed("table.topic-list"),
            Cow::Borrowed(".topic-list"),
            Cow::Borrowed(".latest-topic-list"),
            Cow::Borrowed(".category-list"),
            Cow::Borrowed("#list-area"),
        ])
    }
}
