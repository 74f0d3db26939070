// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable shadow nodes.

use core::fmt;
use std::sync::Arc;

use kurbo::Vec2;

use super::component::SharedProps;
use super::family::ShadowNodeFamily;
use super::id::Tag;
use super::state::SharedState;
use super::traits::ShadowNodeTraits;
use crate::layout::LayoutMetrics;
use crate::transform::Transform3d;

/// Shared node handle. Trees are DAGs of these.
pub type SharedShadowNode = Arc<ShadowNode>;

/// Shared, copy-on-write child list.
pub type ShadowNodeList = Arc<[SharedShadowNode]>;

/// The fields to set when creating or cloning a node.
///
/// `None` means "keep the source node's value" when cloning, and "use the
/// component's default" when creating.
#[derive(Clone, Debug, Default)]
pub struct ShadowNodeFragment {
    /// Props.
    pub props: Option<SharedProps>,
    /// Children.
    pub children: Option<ShadowNodeList>,
    /// State.
    pub state: Option<SharedState>,
    /// Z-order among siblings.
    pub order_index: Option<i32>,
    /// Structural traits.
    pub traits: Option<ShadowNodeTraits>,
    /// Computed layout.
    pub layout_metrics: Option<LayoutMetrics>,
    /// Local transform, applied about the frame centre.
    pub transform: Option<Transform3d>,
    /// Scroll position of a scroll view's content.
    pub content_offset: Option<Vec2>,
}

impl ShadowNodeFragment {
    /// An empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets props.
    #[must_use]
    pub fn props(mut self, props: SharedProps) -> Self {
        self.props = Some(props);
        self
    }

    /// Sets children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = SharedShadowNode>) -> Self {
        self.children = Some(children.into_iter().collect());
        self
    }

    /// Sets state.
    #[must_use]
    pub fn state(mut self, state: SharedState) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the order index.
    #[must_use]
    pub fn order_index(mut self, order_index: i32) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// Sets traits.
    #[must_use]
    pub fn traits(mut self, traits: ShadowNodeTraits) -> Self {
        self.traits = Some(traits);
        self
    }

    /// Sets layout metrics.
    #[must_use]
    pub fn layout_metrics(mut self, layout_metrics: LayoutMetrics) -> Self {
        self.layout_metrics = Some(layout_metrics);
        self
    }

    /// Sets the transform.
    #[must_use]
    pub fn transform(mut self, transform: Transform3d) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Sets the content offset.
    #[must_use]
    pub fn content_offset(mut self, content_offset: Vec2) -> Self {
        self.content_offset = Some(content_offset);
        self
    }
}

/// One immutable revision of a node.
///
/// Nodes are never mutated. Any change produces a new node via
/// [`clone_with`](Self::clone_with) that shares the family and every field
/// not being replaced, including the child list.
pub struct ShadowNode {
    family: Arc<ShadowNodeFamily>,
    props: SharedProps,
    children: ShadowNodeList,
    state: Option<SharedState>,
    order_index: i32,
    traits: ShadowNodeTraits,
    layout_metrics: LayoutMetrics,
    transform: Transform3d,
    content_offset: Vec2,
}

impl ShadowNode {
    /// Creates the first revision of a node in `family`.
    ///
    /// Every child records `family` as its parent.
    ///
    /// # Panics
    ///
    /// Panics if the traits form a stacking context without forming a view.
    #[must_use]
    pub fn new(fragment: ShadowNodeFragment, family: Arc<ShadowNodeFamily>) -> SharedShadowNode {
        let descriptor = family.descriptor();
        let node = Self {
            props: fragment.props.unwrap_or_else(|| descriptor.default_props()),
            children: fragment.children.unwrap_or_else(|| Arc::from([])),
            state: fragment.state,
            order_index: fragment.order_index.unwrap_or(0),
            traits: fragment.traits.unwrap_or_else(|| descriptor.traits()),
            layout_metrics: fragment.layout_metrics.unwrap_or_default(),
            transform: fragment.transform.unwrap_or_default(),
            content_offset: fragment.content_offset.unwrap_or(Vec2::ZERO),
            family,
        };
        node.check_traits();
        node.adopt_children();
        Arc::new(node)
    }

    /// Creates a new revision with `fragment` applied.
    ///
    /// # Panics
    ///
    /// Panics if the resulting traits are not well formed.
    #[must_use]
    pub fn clone_with(&self, fragment: ShadowNodeFragment) -> SharedShadowNode {
        let adopt = fragment.children.is_some();
        let node = Self {
            family: Arc::clone(&self.family),
            props: fragment.props.unwrap_or_else(|| Arc::clone(&self.props)),
            children: fragment
                .children
                .unwrap_or_else(|| Arc::clone(&self.children)),
            state: fragment.state.or_else(|| self.state.clone()),
            order_index: fragment.order_index.unwrap_or(self.order_index),
            traits: fragment.traits.unwrap_or(self.traits),
            layout_metrics: fragment.layout_metrics.unwrap_or(self.layout_metrics),
            transform: fragment.transform.unwrap_or(self.transform),
            content_offset: fragment.content_offset.unwrap_or(self.content_offset),
        };
        node.check_traits();
        if adopt {
            node.adopt_children();
        }
        Arc::new(node)
    }

    fn check_traits(&self) {
        assert!(
            self.traits.is_well_formed(),
            "node {:?} forms a stacking context but no view",
            self.tag()
        );
    }

    fn adopt_children(&self) {
        for child in self.children.iter() {
            child.family.set_parent(&self.family);
        }
    }

    /// Returns `true` if both nodes are revisions of the same logical node.
    #[inline]
    #[must_use]
    pub fn same_family(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.family, &b.family)
    }

    /// The node's family.
    #[inline]
    #[must_use]
    pub fn family(&self) -> &ShadowNodeFamily {
        &self.family
    }

    /// Shared handle to the node's family.
    #[inline]
    #[must_use]
    pub fn family_arc(&self) -> &Arc<ShadowNodeFamily> {
        &self.family
    }

    /// View tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.family.tag()
    }

    /// Props.
    #[inline]
    #[must_use]
    pub fn props(&self) -> &SharedProps {
        &self.props
    }

    /// Children, in document order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[SharedShadowNode] {
        &self.children
    }

    /// The shared child list itself.
    #[inline]
    #[must_use]
    pub fn children_list(&self) -> &ShadowNodeList {
        &self.children
    }

    /// State, if any.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<&SharedState> {
        self.state.as_ref()
    }

    /// Z-order among siblings.
    #[inline]
    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Structural traits.
    #[inline]
    #[must_use]
    pub fn traits(&self) -> ShadowNodeTraits {
        self.traits
    }

    /// Computed layout.
    #[inline]
    #[must_use]
    pub fn layout_metrics(&self) -> &LayoutMetrics {
        &self.layout_metrics
    }

    /// Local transform.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform3d {
        &self.transform
    }

    /// Scroll position of a scroll view's content.
    #[inline]
    #[must_use]
    pub fn content_offset(&self) -> Vec2 {
        self.content_offset
    }

    // -- Convenience clones --

    /// Clone with new children.
    #[must_use]
    pub fn with_children(
        &self,
        children: impl IntoIterator<Item = SharedShadowNode>,
    ) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().children(children))
    }

    /// Clone with `child` appended.
    #[must_use]
    pub fn with_child_appended(&self, child: SharedShadowNode) -> SharedShadowNode {
        let children = self.children.iter().cloned().chain(core::iter::once(child));
        self.with_children(children)
    }

    /// Clone with the child at `index` replaced.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn with_child_replaced(&self, index: usize, child: SharedShadowNode) -> SharedShadowNode {
        assert!(
            index < self.children.len(),
            "child index {index} out of bounds for {} children",
            self.children.len()
        );
        let mut children = self.children.to_vec();
        children[index] = child;
        self.with_children(children)
    }

    /// Clone with new props.
    #[must_use]
    pub fn with_props(&self, props: SharedProps) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().props(props))
    }

    /// Clone with new state.
    #[must_use]
    pub fn with_state(&self, state: SharedState) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().state(state))
    }

    /// Clone with new traits.
    #[must_use]
    pub fn with_traits(&self, traits: ShadowNodeTraits) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().traits(traits))
    }

    /// Clone with new layout metrics.
    #[must_use]
    pub fn with_layout_metrics(&self, layout_metrics: LayoutMetrics) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().layout_metrics(layout_metrics))
    }

    /// Clone with a new order index.
    #[must_use]
    pub fn with_order_index(&self, order_index: i32) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().order_index(order_index))
    }

    /// Clone with a new transform.
    #[must_use]
    pub fn with_transform(&self, transform: Transform3d) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().transform(transform))
    }

    /// Clone with a new content offset.
    #[must_use]
    pub fn with_content_offset(&self, content_offset: Vec2) -> SharedShadowNode {
        self.clone_with(ShadowNodeFragment::new().content_offset(content_offset))
    }

    /// Clones the path from `self` to the node of `family`, replacing that
    /// node with `callback(old)`.
    ///
    /// Siblings along the path are shared, not copied. Returns `None` if
    /// `family` is neither `self`'s family nor below it.
    #[must_use]
    pub fn clone_tree(
        &self,
        family: &ShadowNodeFamily,
        callback: impl FnOnce(&Self) -> SharedShadowNode,
    ) -> Option<SharedShadowNode> {
        if core::ptr::eq(self.family(), family) {
            return Some(callback(self));
        }
        let path = family.ancestors(self);
        let &(parent, index) = path.last()?;
        let mut replacement = callback(&parent.children()[index]);
        for &(ancestor, index) in path.iter().rev() {
            replacement = ancestor.with_child_replaced(index, replacement);
        }
        Some(replacement)
    }

    /// Publishes every state in this subtree as its family's most recent.
    ///
    /// Called when a tree is committed. Families that already hold a newer
    /// revision keep it.
    pub fn publish_states(&self) {
        if let Some(state) = &self.state {
            self.family.set_most_recent_state(state);
        }
        for child in self.children.iter() {
            child.publish_states();
        }
    }
}

impl fmt::Debug for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNode")
            .field("tag", &self.tag())
            .field("component", &self.family.component_name())
            .field("traits", &self.traits)
            .field("order_index", &self.order_index)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}
