// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree builders shared by the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use kurbo::Rect;
use shadowtree_core::layout::LayoutMetrics;
use shadowtree_core::mutation::ShadowViewMutation;
use shadowtree_core::node::{
    ComponentHandle, ShadowNode, ShadowNodeFamily, ShadowNodeFamilyFragment, ShadowNodeFragment,
    ShadowNodeTraits, SharedShadowNode, SimpleComponentDescriptor, SurfaceId, Tag,
};

pub(crate) const SURFACE: SurfaceId = SurfaceId(1);

pub(crate) fn family(tag: i32) -> Arc<ShadowNodeFamily> {
    ShadowNodeFamily::new(
        ShadowNodeFamilyFragment {
            tag: Tag(tag),
            surface_id: SURFACE,
            event_emitter: None,
        },
        SimpleComponentDescriptor::shared("View", ComponentHandle(1), ShadowNodeTraits::VIEW),
    )
}

pub(crate) fn square(x: f64, y: f64, side: f64) -> Rect {
    Rect::new(x, y, x + side, y + side)
}

/// A node of a fresh family.
pub(crate) fn node(
    tag: i32,
    traits: ShadowNodeTraits,
    frame: Rect,
    children: Vec<SharedShadowNode>,
) -> SharedShadowNode {
    ShadowNode::new(
        ShadowNodeFragment::new()
            .traits(traits)
            .layout_metrics(LayoutMetrics::from_frame(frame))
            .children(children),
        family(tag),
    )
}

pub(crate) fn view(tag: i32, children: Vec<SharedShadowNode>) -> SharedShadowNode {
    node(tag, ShadowNodeTraits::VIEW, square(0.0, 0.0, 10.0), children)
}

/// Tags of the mutations of one kind, sorted.
pub(crate) fn tags_of(list: &[ShadowViewMutation], kind: &str) -> Vec<i32> {
    let mut tags: Vec<i32> = list
        .iter()
        .filter(|m| m.kind().name() == kind)
        .map(|m| m.tag().0)
        .collect();
    tags.sort_unstable();
    tags
}

/// `(tag, parent)` of every insert or remove, sorted.
pub(crate) fn moves_of(list: &[ShadowViewMutation], kind: &str) -> Vec<(i32, i32)> {
    let mut moves: Vec<(i32, i32)> = list
        .iter()
        .filter(|m| m.kind().name() == kind)
        .filter_map(|m| Some((m.tag().0, m.parent_tag()?.0)))
        .collect();
    moves.sort_unstable();
    moves
}
