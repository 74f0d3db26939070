// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value snapshots of a node's mountable properties.

use core::fmt;
use std::sync::Arc;

use crate::layout::LayoutMetrics;
use crate::node::{
    ComponentHandle, SharedEventEmitter, SharedProps, SharedState, ShadowNode,
    ShadowNodeTraits, SurfaceId, Tag,
};

/// What the mounting layer sees of one node.
///
/// Views are taken from nodes during slicing and carried by mutations.
/// Equality compares scalar fields by value and shared fields (props, event
/// emitter, state) by pointer, so two views of the same unchanged node are
/// equal and an `Update` is emitted only when something mountable changed.
#[derive(Clone)]
pub struct ShadowView {
    /// Component name.
    pub component_name: &'static str,
    /// Component handle.
    pub component_handle: ComponentHandle,
    /// Surface id.
    pub surface_id: SurfaceId,
    /// View tag.
    pub tag: Tag,
    /// Traits of the node.
    pub traits: ShadowNodeTraits,
    /// Props.
    pub props: SharedProps,
    /// Event emitter.
    pub event_emitter: Option<SharedEventEmitter>,
    /// Layout metrics, with the frame relative to the mounted parent.
    pub layout_metrics: LayoutMetrics,
    /// State.
    pub state: Option<SharedState>,
}

impl ShadowView {
    /// Takes a snapshot of `node`.
    #[must_use]
    pub fn new(node: &ShadowNode) -> Self {
        let family = node.family();
        Self {
            component_name: family.component_name(),
            component_handle: family.component_handle(),
            surface_id: family.surface_id(),
            tag: family.tag(),
            traits: node.traits(),
            props: Arc::clone(node.props()),
            event_emitter: family.event_emitter().cloned(),
            layout_metrics: *node.layout_metrics(),
            state: node.state().cloned(),
        }
    }
}

impl From<&ShadowNode> for ShadowView {
    fn from(node: &ShadowNode) -> Self {
        Self::new(node)
    }
}

fn opt_ptr_eq<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for ShadowView {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.surface_id == other.surface_id
            && self.component_handle == other.component_handle
            && self.component_name == other.component_name
            && self.traits == other.traits
            && self.layout_metrics == other.layout_metrics
            && Arc::ptr_eq(&self.props, &other.props)
            && opt_ptr_eq(self.event_emitter.as_ref(), other.event_emitter.as_ref())
            && opt_ptr_eq(self.state.as_ref(), other.state.as_ref())
    }
}

impl fmt::Debug for ShadowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowView")
            .field("tag", &self.tag)
            .field("component", &self.component_name)
            .field("frame", &self.layout_metrics.frame)
            .field("traits", &self.traits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{
        ShadowNodeFamily, ShadowNodeFamilyFragment, ShadowNodeFragment,
        SimpleComponentDescriptor, State,
    };
    use kurbo::Rect;

    fn leaf(tag: i32) -> Arc<ShadowNode> {
        let family = ShadowNodeFamily::new(
            ShadowNodeFamilyFragment {
                tag: Tag(tag),
                surface_id: SurfaceId(7),
                event_emitter: None,
            },
            SimpleComponentDescriptor::shared("Text", ComponentHandle(3), ShadowNodeTraits::VIEW),
        );
        ShadowNode::new(ShadowNodeFragment::new(), family)
    }

    #[test]
    fn snapshot_copies_identity() {
        let node = leaf(4);
        let view = ShadowView::from(&*node);
        assert_eq!(view.tag, Tag(4));
        assert_eq!(view.surface_id, SurfaceId(7));
        assert_eq!(view.component_name, "Text");
        assert_eq!(view.component_handle, ComponentHandle(3));
    }

    #[test]
    fn unchanged_clone_is_equal() {
        let a = leaf(4);
        let b = a.with_order_index(2);
        assert_eq!(ShadowView::new(&a), ShadowView::new(&b));
    }

    #[test]
    fn props_compare_by_pointer() {
        let a = leaf(4);
        let b = a.with_props(Arc::new(()));
        assert_ne!(ShadowView::new(&a), ShadowView::new(&b));
    }

    #[test]
    fn layout_and_state_changes_are_visible() {
        let a = leaf(4);
        let b = a.with_layout_metrics(LayoutMetrics::from_frame(Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert_ne!(ShadowView::new(&a), ShadowView::new(&b));
        let c = a.with_state(State::new(1, ()));
        assert_ne!(ShadowView::new(&a), ShadowView::new(&c));
    }
}
