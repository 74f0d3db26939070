// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-revision node identity.

use core::{fmt, ptr};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use super::component::{SharedComponentDescriptor, SharedEventEmitter};
use super::id::{ComponentHandle, SurfaceId, Tag};
use super::shadow_node::ShadowNode;
use super::state::SharedState;

/// Identity fields supplied when a family is created.
#[derive(Clone, Debug, Default)]
pub struct ShadowNodeFamilyFragment {
    /// View tag. Must not be [`Tag::NONE`].
    pub tag: Tag,
    /// Surface the node belongs to.
    pub surface_id: SurfaceId,
    /// Event emitter shared by every revision.
    pub event_emitter: Option<SharedEventEmitter>,
}

/// The identity shared by every revision of one logical node.
///
/// Two nodes are "the same node" iff they point at the same family instance.
/// A family is created once, when its first node is constructed, and lives as
/// long as any node references it.
///
/// The only mutable parts are the parent link, which is set at most once, and
/// the most recently committed state, which only moves forward.
pub struct ShadowNodeFamily {
    tag: Tag,
    surface_id: SurfaceId,
    descriptor: SharedComponentDescriptor,
    event_emitter: Option<SharedEventEmitter>,
    parent: OnceLock<Weak<ShadowNodeFamily>>,
    most_recent_state: Mutex<Option<SharedState>>,
}

impl ShadowNodeFamily {
    /// Creates a new family.
    ///
    /// # Panics
    ///
    /// Panics if `fragment.tag` is [`Tag::NONE`].
    #[must_use]
    pub fn new(fragment: ShadowNodeFamilyFragment, descriptor: SharedComponentDescriptor) -> Arc<Self> {
        assert!(
            !fragment.tag.is_none(),
            "tag 0 is reserved and cannot identify a node"
        );
        Arc::new(Self {
            tag: fragment.tag,
            surface_id: fragment.surface_id,
            descriptor,
            event_emitter: fragment.event_emitter,
            parent: OnceLock::new(),
            most_recent_state: Mutex::new(None),
        })
    }

    /// View tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Surface id.
    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Component descriptor.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &SharedComponentDescriptor {
        &self.descriptor
    }

    /// Component name, from the descriptor.
    #[must_use]
    pub fn component_name(&self) -> &'static str {
        self.descriptor.component_name()
    }

    /// Component handle, from the descriptor.
    #[must_use]
    pub fn component_handle(&self) -> ComponentHandle {
        self.descriptor.component_handle()
    }

    /// Event emitter, if any.
    #[inline]
    #[must_use]
    pub fn event_emitter(&self) -> Option<&SharedEventEmitter> {
        self.event_emitter.as_ref()
    }

    /// Records `parent` as this family's parent.
    ///
    /// The first call wins. Later calls must name the same parent; naming a
    /// different one is a logic error caught in debug builds.
    pub fn set_parent(&self, parent: &Arc<Self>) {
        if let Err(candidate) = self.parent.set(Arc::downgrade(parent)) {
            debug_assert!(
                self.parent
                    .get()
                    .is_some_and(|existing| existing.ptr_eq(&candidate)),
                "family {:?} already has a different parent",
                self.tag
            );
        }
    }

    /// Returns `true` once a parent has been recorded, even if it was dropped.
    #[inline]
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent.get().is_some()
    }

    /// The parent family, if one was recorded and is still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// The most recently committed state.
    #[must_use]
    pub fn most_recent_state(&self) -> Option<SharedState> {
        self.lock_state().clone()
    }

    /// Publishes `state` as the most recent one.
    ///
    /// Ignored (returning `false`) if a state with a higher revision was
    /// already published.
    pub fn set_most_recent_state(&self, state: &SharedState) -> bool {
        let mut current = self.lock_state();
        if current
            .as_ref()
            .is_some_and(|existing| existing.revision() > state.revision())
        {
            return false;
        }
        *current = Some(Arc::clone(state));
        true
    }

    /// Ancestor path from `root` down to this family's node.
    ///
    /// Each entry is an ancestor and the index of the next node on the path
    /// among its children; the last entry is the direct parent. Returns an
    /// empty list if `root` does not contain this family below it.
    #[must_use]
    pub fn ancestors<'a>(&self, root: &'a ShadowNode) -> Vec<(&'a ShadowNode, usize)> {
        // Families strictly between `root` and `self`, bottom-up.
        let mut chain: Vec<Arc<Self>> = Vec::new();
        let mut cursor = self.parent();
        loop {
            let Some(family) = cursor else {
                return Vec::new();
            };
            if ptr::eq(Arc::as_ptr(&family), root.family()) {
                break;
            }
            cursor = family.parent();
            chain.push(family);
        }

        let targets = chain
            .iter()
            .rev()
            .map(Arc::as_ptr)
            .chain(core::iter::once(ptr::from_ref(self)));

        let mut path = Vec::with_capacity(chain.len() + 1);
        let mut node = root;
        for target in targets {
            let Some(index) = node
                .children()
                .iter()
                .position(|child| ptr::eq(child.family(), target))
            else {
                return Vec::new();
            };
            path.push((node, index));
            node = &*node.children()[index];
        }
        path
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<SharedState>> {
        // A poisoned lock still holds a consistent `Option`.
        self.most_recent_state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl fmt::Debug for ShadowNodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNodeFamily")
            .field("tag", &self.tag)
            .field("surface_id", &self.surface_id)
            .field("component", &self.descriptor.component_name())
            .field("has_parent", &self.has_parent())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::component::SimpleComponentDescriptor;
    use crate::node::shadow_node::ShadowNodeFragment;
    use crate::node::state::State;
    use crate::node::traits::ShadowNodeTraits;

    fn family(tag: i32) -> Arc<ShadowNodeFamily> {
        let descriptor =
            SimpleComponentDescriptor::shared("View", ComponentHandle(1), ShadowNodeTraits::VIEW);
        ShadowNodeFamily::new(
            ShadowNodeFamilyFragment {
                tag: Tag(tag),
                surface_id: SurfaceId(1),
                event_emitter: None,
            },
            descriptor,
        )
    }

    #[test]
    #[should_panic(expected = "tag 0 is reserved")]
    fn zero_tag_rejected() {
        let _ = family(0);
    }

    #[test]
    fn parent_is_set_once() {
        let child = family(2);
        let parent = family(1);
        assert!(!child.has_parent());
        child.set_parent(&parent);
        child.set_parent(&parent);
        assert!(child.has_parent());
        assert!(Arc::ptr_eq(&child.parent().unwrap(), &parent));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already has a different parent")]
    fn conflicting_parent_is_a_logic_error() {
        let child = family(3);
        let a = family(1);
        let b = family(2);
        child.set_parent(&a);
        child.set_parent(&b);
    }

    #[test]
    fn dropped_parent_is_distinguishable_from_unset() {
        let child = family(2);
        {
            let parent = family(1);
            child.set_parent(&parent);
        }
        assert!(child.has_parent());
        assert!(child.parent().is_none());
    }

    #[test]
    fn most_recent_state_is_monotonic() {
        let f = family(5);
        let s1 = State::new(1, ());
        let s2 = s1.next(());
        assert!(f.set_most_recent_state(&s2));
        assert!(!f.set_most_recent_state(&s1));
        assert_eq!(f.most_recent_state().unwrap().revision(), 2);
    }

    #[test]
    fn ancestors_walks_down_from_root() {
        let leaf_family = family(4);
        let leaf = ShadowNode::new(ShadowNodeFragment::new(), Arc::clone(&leaf_family));
        let sibling = ShadowNode::new(ShadowNodeFragment::new(), family(3));
        let mid = ShadowNode::new(
            ShadowNodeFragment::new().children([sibling, leaf]),
            family(2),
        );
        let root = ShadowNode::new(ShadowNodeFragment::new().children([mid]), family(1));

        let path = leaf_family.ancestors(&root);
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].0.tag(), Tag(1));
        assert_eq!(path[0].1, 0);
        assert_eq!(path[1].0.tag(), Tag(2));
        assert_eq!(path[1].1, 1);

        let stranger = family(9);
        assert!(stranger.ancestors(&root).is_empty());
    }
}
