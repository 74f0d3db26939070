// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract with the mounting layer, and a per-surface coordinator.
//!
//! A [`MountingLayer`] owns the native views of one surface and applies
//! [`MountingTransaction`]s to them in order. The [`MountingCoordinator`] sits
//! between the tree producer and that layer: it keeps the revision that is
//! currently mounted (the *base*), accepts newer committed revisions, and on
//! request diffs the base against the newest one.
//!
//! ```text
//!   producer ──push(root)──► MountingCoordinator ──pull_transaction()──►
//!                               base ◄── newest          MountingLayer::apply
//! ```
//!
//! Revisions pushed between two pulls are coalesced: only the newest one is
//! diffed.

use crate::culling::CullingConfig;
use crate::diff::{DiffOptions, UpdateParentTag, diff_with};
use crate::mutation::{MutationCounts, MutationList};
use crate::node::{ShadowNode, SharedShadowNode, SurfaceId};
use crate::trace::{TraceSink, TransactionEvent, Tracer};

/// Applies mutation lists to native views.
pub trait MountingLayer {
    /// Applies every mutation of `transaction`, in order.
    fn apply(&mut self, transaction: &MountingTransaction);
}

/// One batch of mutations for a surface.
#[derive(Clone, Debug)]
pub struct MountingTransaction {
    /// Surface the mutations apply to.
    pub surface_id: SurfaceId,
    /// Sequence number, starting at 1 per coordinator.
    pub number: u64,
    /// The mutations, in application order.
    pub mutations: MutationList,
}

impl MountingTransaction {
    /// Per-kind mutation counts.
    #[must_use]
    pub fn counts(&self) -> MutationCounts {
        MutationCounts::of(&self.mutations)
    }
}

/// Tracks what is mounted for one surface and what should be mounted next.
#[derive(Debug)]
pub struct MountingCoordinator {
    surface_id: SurfaceId,
    base: SharedShadowNode,
    base_culling: CullingConfig,
    newest: Option<SharedShadowNode>,
    culling: CullingConfig,
    update_parent_tag: UpdateParentTag,
    number: u64,
}

impl MountingCoordinator {
    /// Creates a coordinator whose mounted revision is `root`.
    ///
    /// `root` is usually an empty root: the first transaction then creates
    /// everything pushed since.
    #[must_use]
    pub fn new(root: SharedShadowNode) -> Self {
        Self {
            surface_id: root.family().surface_id(),
            base: root,
            base_culling: CullingConfig::DISABLED,
            newest: None,
            culling: CullingConfig::DISABLED,
            update_parent_tag: UpdateParentTag::default(),
            number: 0,
        }
    }

    /// Surface this coordinator serves.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// The revision currently mounted.
    #[must_use]
    pub fn base(&self) -> &SharedShadowNode {
        &self.base
    }

    /// Number of the last transaction handed out, or 0.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Sets the culling to mount the next transaction with.
    ///
    /// A change alone is enough to make the next pull produce mutations.
    pub fn set_culling(&mut self, culling: CullingConfig) {
        self.culling = culling;
    }

    /// Sets the parent tag carried by updates of reparented views.
    pub fn set_update_parent_tag(&mut self, update_parent_tag: UpdateParentTag) {
        self.update_parent_tag = update_parent_tag;
    }

    /// Commits a new revision, replacing any revision not yet pulled.
    ///
    /// States carried by the revision become their families' most recent.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a revision of this surface's root.
    pub fn push(&mut self, root: SharedShadowNode) {
        self.check_root(&root);
        root.publish_states();
        self.newest = Some(root);
    }

    /// Returns `true` if a pull would produce a transaction.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.newest.is_some() || self.culling != self.base_culling
    }

    /// Diffs the mounted revision against the newest one and makes the
    /// newest one the mounted revision.
    pub fn pull_transaction(&mut self, tracer: &mut Tracer<'_>) -> Option<MountingTransaction> {
        if !self.has_pending() {
            return None;
        }
        let next = self.newest.take().unwrap_or_else(|| self.base.clone());
        let options = DiffOptions {
            old_culling: self.base_culling,
            new_culling: self.culling,
            update_parent_tag: self.update_parent_tag,
        };
        let mutations = diff_with(&self.base, &next, &options, tracer);
        self.base = next;
        self.base_culling = self.culling;
        self.number += 1;

        let transaction = MountingTransaction {
            surface_id: self.surface_id,
            number: self.number,
            mutations,
        };
        tracer.transaction(&TransactionEvent {
            surface_id: self.surface_id,
            number: transaction.number,
            counts: transaction.counts(),
        });
        Some(transaction)
    }

    /// Pulls a transaction, if any, and applies it to `layer`.
    pub fn mount(&mut self, layer: &mut dyn MountingLayer, sink: Option<&mut dyn TraceSink>) -> bool {
        let mut tracer = sink.map_or_else(Tracer::none, Tracer::new);
        let Some(transaction) = self.pull_transaction(&mut tracer) else {
            return false;
        };
        layer.apply(&transaction);
        true
    }

    /// Makes `root` the mounted revision, dropping anything not yet pulled.
    ///
    /// Used after the mounting layer was rebuilt from scratch.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a revision of this surface's root.
    pub fn revert_to(&mut self, root: SharedShadowNode) {
        self.check_root(&root);
        self.base = root;
        self.base_culling = self.culling;
        self.newest = None;
    }

    fn check_root(&self, root: &ShadowNode) {
        assert!(
            ShadowNode::same_family(&self.base, root),
            "root {:?} does not belong to surface {:?}",
            root.tag(),
            self.surface_id
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mutation::ShadowViewMutation;
    use crate::node::{
        ComponentHandle, ShadowNodeFamily, ShadowNodeFamilyFragment, ShadowNodeFragment,
        ShadowNodeTraits, SimpleComponentDescriptor, State, Tag,
    };

    fn view(tag: i32, children: Vec<SharedShadowNode>) -> SharedShadowNode {
        let family = ShadowNodeFamily::new(
            ShadowNodeFamilyFragment {
                tag: Tag(tag),
                surface_id: SurfaceId(7),
                event_emitter: None,
            },
            SimpleComponentDescriptor::shared("View", ComponentHandle(1), ShadowNodeTraits::VIEW),
        );
        ShadowNode::new(ShadowNodeFragment::new().children(children), family)
    }

    #[derive(Default)]
    struct Log {
        numbers: Vec<u64>,
        mutations: usize,
    }

    impl MountingLayer for Log {
        fn apply(&mut self, transaction: &MountingTransaction) {
            self.numbers.push(transaction.number);
            self.mutations += transaction.mutations.len();
        }
    }

    #[test]
    fn nothing_pending_initially() {
        let mut coordinator = MountingCoordinator::new(view(1, vec![]));
        assert!(!coordinator.has_pending());
        assert!(coordinator.pull_transaction(&mut Tracer::none()).is_none());
        assert_eq!(coordinator.surface_id(), SurfaceId(7));
    }

    #[test]
    fn transactions_are_numbered_and_coalesced() {
        let empty = view(1, vec![]);
        let mut coordinator = MountingCoordinator::new(Arc::clone(&empty));

        coordinator.push(empty.with_children([view(2, vec![])]));
        let both = empty.with_children([view(2, vec![]), view(3, vec![])]);
        coordinator.push(Arc::clone(&both));

        let first = coordinator.pull_transaction(&mut Tracer::none()).unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(first.surface_id, SurfaceId(7));
        assert_eq!(first.counts().create, 2);
        assert!(Arc::ptr_eq(coordinator.base(), &both));
        assert!(!coordinator.has_pending());

        coordinator.push(both.with_children([]));
        let second = coordinator.pull_transaction(&mut Tracer::none()).unwrap();
        assert_eq!(second.number, 2);
        assert_eq!(second.counts().delete, 2);
    }

    #[test]
    fn mount_applies_to_layer() {
        let empty = view(1, vec![]);
        let mut coordinator = MountingCoordinator::new(Arc::clone(&empty));
        let mut log = Log::default();
        assert!(!coordinator.mount(&mut log, None));

        coordinator.push(empty.with_children([view(2, vec![])]));
        assert!(coordinator.mount(&mut log, None));
        assert_eq!(log.numbers, [1]);
        assert_eq!(log.mutations, 2);
    }

    #[test]
    fn culling_change_alone_is_pending() {
        let root = view(1, vec![view(2, vec![])]);
        let mut coordinator = MountingCoordinator::new(root);
        coordinator.set_culling(CullingConfig::viewport(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(coordinator.has_pending());
        let transaction = coordinator.pull_transaction(&mut Tracer::none()).unwrap();
        // The child has an empty frame and is culled.
        assert!(matches!(
            transaction.mutations.as_slice(),
            [ShadowViewMutation::Remove { .. }, ShadowViewMutation::Delete { .. }]
        ));
        assert!(!coordinator.has_pending());
    }

    #[test]
    fn revert_drops_pending_revision() {
        let empty = view(1, vec![]);
        let mut coordinator = MountingCoordinator::new(Arc::clone(&empty));
        coordinator.push(empty.with_children([view(2, vec![])]));
        let remounted = empty.with_children([view(3, vec![])]);
        coordinator.revert_to(Arc::clone(&remounted));
        assert!(!coordinator.has_pending());
        assert!(Arc::ptr_eq(coordinator.base(), &remounted));
    }

    #[test]
    fn push_publishes_states() {
        let empty = view(1, vec![]);
        let child = view(2, vec![]).with_state(State::new(4, ()));
        let mut coordinator = MountingCoordinator::new(Arc::clone(&empty));
        coordinator.push(empty.with_children([Arc::clone(&child)]));
        assert_eq!(child.family().most_recent_state().unwrap().revision(), 4);
    }

    #[test]
    #[should_panic(expected = "does not belong to surface")]
    fn foreign_root_is_rejected() {
        let mut coordinator = MountingCoordinator::new(view(1, vec![]));
        coordinator.push(view(9, vec![]));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn pull_reports_transaction() {
        struct Sink(Vec<(u64, u32)>);
        impl TraceSink for Sink {
            fn on_transaction(&mut self, e: &TransactionEvent) {
                self.0.push((e.number, e.counts.total()));
            }
        }

        let empty = view(1, vec![]);
        let mut coordinator = MountingCoordinator::new(Arc::clone(&empty));
        coordinator.push(empty.with_children([view(2, vec![])]));
        let mut sink = Sink(Vec::new());
        let _ = coordinator.pull_transaction(&mut Tracer::new(&mut sink));
        assert_eq!(sink.0, [(1, 2)]);
    }
}
