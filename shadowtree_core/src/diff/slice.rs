// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building mount layers out of a node's subtree.
//!
//! A layer is the ordered list of descendants that end up as direct native
//! children of one view. It holds the node's own children plus, recursively,
//! the children of every child whose children are flattened.

use kurbo::Vec2;

use super::pair::{PairId, ShadowViewNodePair, ViewNodePairScope};
use crate::culling::{CullingConfig, CullingContext};
use crate::layout::PositionType;
use crate::node::{ShadowNode, ShadowNodeTraits};
use crate::view::ShadowView;

/// Slices the layer of `parent` into `scope`.
///
/// Returns nothing for a flattened concrete parent unless `allow_flattened`
/// is set: its children already belong to an ancestor's layer.
pub(crate) fn slice_child_pairs<'a>(
    scope: &mut ViewNodePairScope<'a>,
    parent: PairId,
    allow_flattened: bool,
) -> Vec<PairId> {
    let pair = &scope[parent];
    if pair.flattened && pair.is_concrete_view && !allow_flattened {
        return Vec::new();
    }
    let (node, origin, culling) = (pair.node, pair.context_origin, pair.children_culling);

    let mut pairs = Vec::new();
    let mut static_cursor = 0;
    slice_recursively(&mut pairs, &mut static_cursor, origin, node, &culling);

    if pairs.iter().any(|p| p.node.order_index() != 0) {
        // Stable: siblings with equal order keep document order.
        pairs.sort_by_key(|p| p.node.order_index());
    }

    let mut mount_index = 0;
    pairs
        .into_iter()
        .map(|mut pair| {
            if pair.is_concrete_view {
                pair.mount_index = Some(mount_index);
                mount_index += 1;
            }
            scope.push(pair)
        })
        .collect()
}

fn slice_recursively<'a>(
    pairs: &mut Vec<ShadowViewNodePair<'a>>,
    static_cursor: &mut usize,
    layout_offset: Vec2,
    node: &'a ShadowNode,
    culling: &CullingContext,
) {
    for child in node.children() {
        let child: &'a ShadowNode = child;
        if child.traits().contains(ShadowNodeTraits::HIDDEN) || culling.is_culled(child) {
            continue;
        }

        let children_culling = culling.adjusted_for(child);
        let mut view = ShadowView::new(child);
        let mut origin = layout_offset;
        if !view.layout_metrics.is_empty() {
            origin += view.layout_metrics.frame.origin().to_vec2();
            view.layout_metrics.frame = view.layout_metrics.frame + layout_offset;
        }

        let mut pair = ShadowViewNodePair::new(view, child, Vec2::ZERO, children_culling);
        let flattened = pair.flattened;
        if flattened {
            pair.context_origin = origin;
        }

        if child.layout_metrics().position_type == PositionType::Static {
            pairs.insert(*static_cursor, pair);
            *static_cursor += 1;
            if flattened {
                slice_recursively(pairs, static_cursor, origin, child, &children_culling);
            }
        } else {
            pairs.push(pair);
            if flattened {
                let mut cursor = pairs.len();
                slice_recursively(pairs, &mut cursor, origin, child, &children_culling);
            }
        }
    }
}

/// One concrete view in a mount layer, as returned by [`mount_layer`].
#[derive(Clone, Debug)]
pub struct LayerEntry<'a> {
    /// The view to mount, with its frame relative to the layer's owner.
    pub view: ShadowView,
    /// The node the view was taken from.
    pub node: &'a ShadowNode,
    /// Position among the layer owner's native children.
    pub mount_index: usize,
    flattened: bool,
    context_origin: Vec2,
    children_culling: CullingContext,
}

impl<'a> LayerEntry<'a> {
    /// Returns `true` if this view's children are mounted in an ancestor.
    #[must_use]
    pub fn is_flattened(&self) -> bool {
        self.flattened
    }

    /// The layer mounted inside this view.
    ///
    /// Empty when the view's children are flattened into an ancestor.
    #[must_use]
    pub fn children(&self) -> Vec<LayerEntry<'a>> {
        let mut pair =
            ShadowViewNodePair::new(self.view.clone(), self.node, self.context_origin, self.children_culling);
        pair.flattened = self.flattened;
        let mut scope = ViewNodePairScope::new();
        let id = scope.push(pair);
        collect_entries(&mut scope, id)
    }
}

/// The layer mounted directly inside `root`, under the given culling
/// configuration.
///
/// Together with [`LayerEntry::children`] this describes the complete native
/// hierarchy a tree mounts as, without diffing.
#[must_use]
pub fn mount_layer<'a>(root: &'a ShadowNode, culling: &CullingConfig) -> Vec<LayerEntry<'a>> {
    let mut scope = ViewNodePairScope::new();
    let id = scope.push(ShadowViewNodePair::root(root, culling));
    collect_entries(&mut scope, id)
}

fn collect_entries<'a>(scope: &mut ViewNodePairScope<'a>, parent: PairId) -> Vec<LayerEntry<'a>> {
    slice_child_pairs(scope, parent, false)
        .into_iter()
        .filter_map(|id| {
            let pair = &scope[id];
            let mount_index = pair.mount_index?;
            Some(LayerEntry {
                view: pair.view.clone(),
                node: pair.node,
                mount_index,
                flattened: pair.flattened,
                context_origin: pair.context_origin,
                children_culling: pair.children_culling,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMetrics;
    use crate::node::{
        ComponentHandle, ShadowNodeFamily, ShadowNodeFamilyFragment, ShadowNodeFragment,
        SharedShadowNode, SimpleComponentDescriptor, SurfaceId, Tag,
    };
    use kurbo::Rect;

    fn node(
        tag: i32,
        traits: ShadowNodeTraits,
        frame: Rect,
        children: Vec<SharedShadowNode>,
    ) -> SharedShadowNode {
        let family = ShadowNodeFamily::new(
            ShadowNodeFamilyFragment {
                tag: Tag(tag),
                surface_id: SurfaceId(1),
                event_emitter: None,
            },
            SimpleComponentDescriptor::shared("View", ComponentHandle(1), traits),
        );
        ShadowNode::new(
            ShadowNodeFragment::new()
                .layout_metrics(LayoutMetrics::from_frame(frame))
                .children(children),
            family,
        )
    }

    fn view(tag: i32, children: Vec<SharedShadowNode>) -> SharedShadowNode {
        node(tag, ShadowNodeTraits::VIEW, Rect::new(0.0, 0.0, 10.0, 10.0), children)
    }

    fn tags(entries: &[LayerEntry<'_>]) -> Vec<i32> {
        entries.iter().map(|e| e.view.tag.0).collect()
    }

    #[test]
    fn flattened_children_are_spliced_and_offset() {
        let leaf = node(4, ShadowNodeTraits::VIEW, Rect::new(1.0, 2.0, 3.0, 4.0), vec![]);
        let wrapper = node(
            3,
            ShadowNodeTraits::empty(),
            Rect::new(10.0, 20.0, 50.0, 50.0),
            vec![leaf],
        );
        let root = view(1, vec![view(2, vec![]), wrapper]);

        let layer = mount_layer(&root, &CullingConfig::DISABLED);
        assert_eq!(tags(&layer), vec![2, 4]);
        assert_eq!(layer[1].mount_index, 1);
        assert_eq!(layer[1].view.layout_metrics.frame, Rect::new(11.0, 22.0, 13.0, 24.0));
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let hidden = node(
            2,
            ShadowNodeTraits::VIEW | ShadowNodeTraits::HIDDEN,
            Rect::ZERO,
            vec![view(3, vec![])],
        );
        let root = view(1, vec![hidden, view(4, vec![])]);
        assert_eq!(tags(&mount_layer(&root, &CullingConfig::DISABLED)), vec![4]);
    }

    #[test]
    fn order_index_sorts_stably() {
        let root = view(
            1,
            vec![
                view(2, vec![]).with_order_index(1),
                view(3, vec![]),
                view(4, vec![]).with_order_index(-1),
                view(5, vec![]),
            ],
        );
        assert_eq!(tags(&mount_layer(&root, &CullingConfig::DISABLED)), vec![4, 3, 5, 2]);
    }

    #[test]
    fn static_children_go_before_appended_ones() {
        let mut static_metrics = LayoutMetrics::from_frame(Rect::new(0.0, 0.0, 5.0, 5.0));
        static_metrics.position_type = PositionType::Static;
        let root = view(
            1,
            vec![
                view(2, vec![]),
                view(3, vec![]).with_layout_metrics(static_metrics),
                view(4, vec![]),
                view(5, vec![]).with_layout_metrics(static_metrics),
            ],
        );
        assert_eq!(tags(&mount_layer(&root, &CullingConfig::DISABLED)), vec![3, 5, 2, 4]);
    }

    #[test]
    fn concrete_flattened_view_owns_no_layer() {
        let flat_view = node(
            2,
            ShadowNodeTraits::FORMS_VIEW,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            vec![view(3, vec![])],
        );
        let root = view(1, vec![flat_view]);
        let layer = mount_layer(&root, &CullingConfig::DISABLED);
        assert_eq!(tags(&layer), vec![2, 3]);
        assert!(layer[0].is_flattened());
        assert!(layer[0].children().is_empty());
    }

    #[test]
    fn culling_drops_offscreen_children() {
        let far = node(3, ShadowNodeTraits::VIEW, Rect::new(0.0, 500.0, 10.0, 510.0), vec![]);
        let root = view(1, vec![view(2, vec![]), far]);
        let culled = CullingConfig::viewport(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(tags(&mount_layer(&root, &culled)), vec![2]);
        assert_eq!(tags(&mount_layer(&root, &CullingConfig::DISABLED)), vec![2, 3]);
    }

    #[test]
    fn nested_layers_via_entries() {
        let root = view(1, vec![view(2, vec![view(3, vec![]), view(4, vec![])])]);
        let layer = mount_layer(&root, &CullingConfig::DISABLED);
        assert_eq!(tags(&layer[0].children()), vec![3, 4]);
    }
}
