// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View/node pairs and the arena that owns them for one diff.

use core::ops::Index;
use core::sync::atomic::{AtomicU32, Ordering};

use kurbo::Vec2;

use crate::culling::{CullingConfig, CullingContext};
use crate::node::{ShadowNode, Tag};
use crate::view::ShadowView;

/// Source of scope generations. Zero is never handed out.
static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Handle to a pair in a [`ViewNodePairScope`].
///
/// Only valid for the scope that returned it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PairId {
    idx: usize,
    generation: u32,
}

/// A node as it appears in one mount layer, plus differ bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct ShadowViewNodePair<'a> {
    pub(crate) view: ShadowView,
    pub(crate) node: &'a ShadowNode,
    /// The node's children are spliced into this pair's layer.
    pub(crate) flattened: bool,
    /// The node produces a native view.
    pub(crate) is_concrete_view: bool,
    /// Offset of the node's children relative to the mounted parent, when
    /// they are spliced.
    pub(crate) context_origin: Vec2,
    /// Culling window the node's children are sliced under.
    pub(crate) children_culling: CullingContext,
    /// Position among the mounted parent's children. `None` when not concrete.
    pub(crate) mount_index: Option<usize>,
    other_tree_pair: Option<PairId>,
}

impl<'a> ShadowViewNodePair<'a> {
    pub(crate) fn new(
        view: ShadowView,
        node: &'a ShadowNode,
        context_origin: Vec2,
        children_culling: CullingContext,
    ) -> Self {
        let traits = node.traits();
        Self {
            view,
            node,
            flattened: traits.children_flattened(),
            is_concrete_view: traits.is_concrete(),
            context_origin,
            children_culling,
            mount_index: None,
            other_tree_pair: None,
        }
    }

    /// The pair a diff starts from. The root always hosts its own children.
    pub(crate) fn root(node: &'a ShadowNode, culling: &CullingConfig) -> Self {
        Self {
            flattened: false,
            ..Self::new(
                ShadowView::new(node),
                node,
                Vec2::ZERO,
                CullingContext::root(culling),
            )
        }
    }

    pub(crate) fn tag(&self) -> Tag {
        self.view.tag
    }

    /// Mount index of a concrete pair.
    pub(crate) fn index(&self) -> usize {
        debug_assert!(
            self.mount_index.is_some(),
            "non-concrete pair {:?} has no mount index",
            self.view.tag
        );
        self.mount_index.unwrap_or(usize::MAX)
    }

    /// The pair this one was matched with, if any.
    pub(crate) fn other_tree_pair(&self) -> Option<PairId> {
        self.other_tree_pair
    }

    pub(crate) fn in_other_tree(&self) -> bool {
        self.other_tree_pair.is_some()
    }
}

/// Arena owning every pair created during one top-level diff.
#[derive(Debug)]
pub(crate) struct ViewNodePairScope<'a> {
    pairs: Vec<ShadowViewNodePair<'a>>,
    generation: u32,
}

impl<'a> ViewNodePairScope<'a> {
    pub(crate) fn new() -> Self {
        Self {
            pairs: Vec::new(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique number of this scope.
    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn push(&mut self, pair: ShadowViewNodePair<'a>) -> PairId {
        let idx = self.pairs.len();
        self.pairs.push(pair);
        PairId {
            idx,
            generation: self.generation,
        }
    }

    /// Records that `old` and `new` are the same node in the two trees.
    pub(crate) fn mark_matched(&mut self, old: PairId, new: PairId) {
        self.slot_mut(old).other_tree_pair = Some(new);
        self.slot_mut(new).other_tree_pair = Some(old);
    }

    pub(crate) fn in_other_tree(&self, id: PairId) -> bool {
        self[id].in_other_tree()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    fn check(&self, id: PairId) -> usize {
        assert_eq!(
            id.generation, self.generation,
            "stale PairId: generation {} used with scope {}",
            id.generation, self.generation
        );
        id.idx
    }

    fn slot_mut(&mut self, id: PairId) -> &mut ShadowViewNodePair<'a> {
        let idx = self.check(id);
        &mut self.pairs[idx]
    }
}

impl<'a> Index<PairId> for ViewNodePairScope<'a> {
    type Output = ShadowViewNodePair<'a>;

    fn index(&self, id: PairId) -> &Self::Output {
        &self.pairs[self.check(id)]
    }
}
