use alloc::vec;
use alloc::vec::Vec;

use crate::NodeTree;

/// Tags whose subtrees are owned by embedded media players.
///
/// Players mutate their own internals continuously, so changes inside them are never treated as
/// list changes.
pub const MEDIA_TAGS: [&str; 4] = ["video", "audio", "img", "iframe"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One structural change reported by the host's change notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord<N> {
    pub kind: ChangeKind,
    pub target: N,
    pub added_nodes: Vec<N>,
    pub removed_nodes: Vec<N>,
}

impl<N> ChangeRecord<N> {
    pub fn child_list(target: N, added_nodes: Vec<N>, removed_nodes: Vec<N>) -> Self {
        Self {
            kind: ChangeKind::ChildList,
            target,
            added_nodes,
            removed_nodes,
        }
    }

    pub fn attributes(target: N) -> Self {
        Self {
            kind: ChangeKind::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
        }
    }

    /// A child-list change that actually added or removed nodes.
    pub fn is_structural(&self) -> bool {
        self.kind == ChangeKind::ChildList
            && (!self.added_nodes.is_empty() || !self.removed_nodes.is_empty())
    }
}

/// A single predicate in the change filter chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterRule {
    /// Drop attribute/text changes and child-list changes that moved nothing.
    StructuralOnly,
    /// Drop changes inside the engine's own render surface.
    SkipRenderSurface,
    /// Drop changes inside a media element subtree.
    SkipMedia,
    /// Keep only changes targeting the content region or its descendants.
    RequireRegion,
}

/// What the filter chain decided about one change record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Relevant,
    /// Discarded by the given rule.
    Ignored(FilterRule),
}

/// The nodes a change is judged against.
#[derive(Debug)]
pub struct FilterContext<'a, N> {
    pub region: &'a N,
    /// The mounted render surface, if any.
    pub surface: Option<&'a N>,
}

impl<N> Clone for FilterContext<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for FilterContext<'_, N> {}

/// An ordered chain of [`FilterRule`]s applied to every reported change.
///
/// A record is relevant only if it passes every rule; the first failing rule is reported in the
/// verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeFilter {
    rules: Vec<FilterRule>,
}

impl ChangeFilter {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn classify<T: NodeTree + ?Sized>(
        &self,
        tree: &T,
        ctx: FilterContext<'_, T::Node>,
        record: &ChangeRecord<T::Node>,
    ) -> Verdict {
        for &rule in &self.rules {
            let keep = match rule {
                FilterRule::StructuralOnly => record.is_structural(),
                FilterRule::SkipRenderSurface => ctx
                    .surface
                    .is_none_or(|surface| !tree.is_inclusive_descendant(&record.target, surface)),
                FilterRule::SkipMedia => !is_inside_media(tree, &record.target),
                FilterRule::RequireRegion => {
                    tree.is_inclusive_descendant(&record.target, ctx.region)
                }
            };
            if !keep {
                return Verdict::Ignored(rule);
            }
        }
        Verdict::Relevant
    }

    /// Returns `true` if any record in the batch survives the whole chain.
    pub fn needs_resync<T: NodeTree + ?Sized>(
        &self,
        tree: &T,
        ctx: FilterContext<'_, T::Node>,
        batch: &[ChangeRecord<T::Node>],
    ) -> bool {
        batch.iter().any(|record| {
            let verdict = self.classify(tree, ctx, record);
            ptrace!(?verdict, "ChangeFilter::classify");
            verdict == Verdict::Relevant
        })
    }
}

impl Default for ChangeFilter {
    fn default() -> Self {
        Self::new(vec![
            FilterRule::StructuralOnly,
            FilterRule::SkipRenderSurface,
            FilterRule::SkipMedia,
            FilterRule::RequireRegion,
        ])
    }
}

/// Returns `true` if `node` is a media element or sits inside one.
pub fn is_inside_media<T: NodeTree + ?Sized>(tree: &T, node: &T::Node) -> bool {
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if let Some(tag) = tree.tag_name(&n) {
            if MEDIA_TAGS.iter().any(|media| tag.eq_ignore_ascii_case(media)) {
                return true;
            }
        }
        cur = tree.parent(&n);
    }
    false
}
