// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The differ: turns two revisions of a tree into a mutation list.
//!
//! Both roots are sliced into mount layers and the layers are diffed parent
//! by parent. Each parent's mutations are collected into separate buckets
//! and flushed in a fixed order that any mounting layer can apply blindly:
//!
//! ```text
//!   destructive-downward ─► update ─► remove (last found first) ─► delete
//!        ─► create ─► downward ─► insert
//! ```
//!
//! Removes come before deletes and in descending index order, so earlier
//! removals never shift the indices of later ones. Creates precede the
//! inserts that parent them. The downward buckets hold the (already ordered)
//! output of recursive diffs of child layers.
//!
//! When a matched node changes whether its children are flattened, its
//! descendants move between its own layer and its parent's. The
//! [flattener](flatten) handles that by matching the moved descendants by
//! tag instead of tearing them down.

mod flatten;
mod pair;
mod slice;

use core::ptr;

use crate::culling::CullingConfig;
use crate::mutation::{MutationCounts, MutationList, ShadowViewMutation};
use crate::node::{ShadowNode, Tag};
use crate::tiny_map::TinyMap;
use crate::trace::{DiffBeginEvent, DiffBranch, DiffEndEvent, Tracer};
use crate::view::ShadowView;

pub use flatten::ReparentMode;
pub use slice::{LayerEntry, mount_layer};

use pair::{PairId, ShadowViewNodePair, ViewNodePairScope};

/// Which parent tag `Update` mutations carry for views that move between
/// layers during a flatten or unflatten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateParentTag {
    /// The parent the view is mounted in when the update is applied.
    #[default]
    MountedParent,
    /// The node being flattened or unflattened, whether or not the view is
    /// mounted there.
    LegacyNodeParent,
}

/// Runtime options for one diff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffOptions {
    /// Culling the old tree was mounted with.
    pub old_culling: CullingConfig,
    /// Culling to mount the new tree with.
    pub new_culling: CullingConfig,
    /// Parent tag for updates of reparented views.
    pub update_parent_tag: UpdateParentTag,
}

impl DiffOptions {
    /// No culling, updates tagged with the mounted parent.
    pub const DEFAULT: Self = Self {
        old_culling: CullingConfig::DISABLED,
        new_culling: CullingConfig::DISABLED,
        update_parent_tag: UpdateParentTag::MountedParent,
    };

    /// Culling with the same viewport on both sides.
    #[must_use]
    pub const fn culled(viewport: kurbo::Rect) -> Self {
        Self {
            old_culling: CullingConfig::viewport(viewport),
            new_culling: CullingConfig::viewport(viewport),
            update_parent_tag: UpdateParentTag::MountedParent,
        }
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Diffs two revisions of a root with default options.
///
/// # Panics
///
/// Panics if the roots are not of the same family.
#[must_use]
pub fn diff(old_root: &ShadowNode, new_root: &ShadowNode) -> MutationList {
    diff_with(old_root, new_root, &DiffOptions::DEFAULT, &mut Tracer::none())
}

/// Diffs two revisions of a root.
///
/// # Panics
///
/// Panics if the roots are not of the same family.
#[must_use]
pub fn diff_with(
    old_root: &ShadowNode,
    new_root: &ShadowNode,
    options: &DiffOptions,
    tracer: &mut Tracer<'_>,
) -> MutationList {
    let mut mutations = Vec::new();
    diff_into(old_root, new_root, options, tracer, &mut mutations);
    mutations
}

/// Diffs two revisions of a root, appending to `out`.
///
/// # Panics
///
/// Panics if the roots are not of the same family.
pub fn diff_into(
    old_root: &ShadowNode,
    new_root: &ShadowNode,
    options: &DiffOptions,
    tracer: &mut Tracer<'_>,
    out: &mut MutationList,
) {
    assert!(
        ShadowNode::same_family(old_root, new_root),
        "root nodes {:?} and {:?} are not of the same family",
        old_root.tag(),
        new_root.tag()
    );
    let start = out.len();

    let mut differ = Differ {
        scope: ViewNodePairScope::new(),
        update_parent_tag: options.update_parent_tag,
        tracer,
    };
    let diff_index = differ.scope.generation();
    differ.tracer.diff_begin(&DiffBeginEvent {
        diff_index,
        surface_id: old_root.family().surface_id(),
        root: old_root.tag(),
    });

    let old_view = ShadowView::new(old_root);
    let new_view = ShadowView::new(new_root);
    if old_view != new_view {
        out.push(ShadowViewMutation::Update {
            parent: Tag::NONE,
            old: old_view,
            new: new_view,
        });
    }

    let old_pair = differ
        .scope
        .push(ShadowViewNodePair::root(old_root, &options.old_culling));
    let new_pair = differ
        .scope
        .push(ShadowViewNodePair::root(new_root, &options.new_culling));
    let old_layer = differ.slice(old_pair, false);
    let new_layer = differ.slice(new_pair, false);
    differ.calculate_mutations(out, old_root.tag(), old_layer, new_layer);

    differ.tracer.diff_end(&DiffEndEvent {
        diff_index,
        counts: MutationCounts::of(&out[start..]),
    });
}

/// Per-parent mutation buckets, flushed in mounting order.
#[derive(Debug, Default)]
struct OrderedMutations {
    destructive_downward: MutationList,
    update: MutationList,
    remove: MutationList,
    delete: MutationList,
    create: MutationList,
    downward: MutationList,
    insert: MutationList,
}

impl OrderedMutations {
    fn flush_into(self, out: &mut MutationList) {
        out.extend(self.destructive_downward);
        out.extend(self.update);
        out.extend(self.remove.into_iter().rev());
        out.extend(self.delete);
        out.extend(self.create);
        out.extend(self.downward);
        out.extend(self.insert);
    }

    fn remove(&mut self, parent: Tag, old: &ShadowView, index: usize) {
        self.remove.push(ShadowViewMutation::Remove {
            parent,
            old: old.clone(),
            index,
        });
    }

    fn insert(&mut self, parent: Tag, new: &ShadowView, index: usize) {
        self.insert.push(ShadowViewMutation::Insert {
            parent,
            new: new.clone(),
            index,
        });
    }

    fn create(&mut self, new: &ShadowView) {
        self.create.push(ShadowViewMutation::Create { new: new.clone() });
    }

    fn delete(&mut self, old: &ShadowView) {
        self.delete.push(ShadowViewMutation::Delete { old: old.clone() });
    }

    fn update(&mut self, parent: Tag, old: &ShadowView, new: &ShadowView) {
        self.update.push(ShadowViewMutation::Update {
            parent,
            old: old.clone(),
            new: new.clone(),
        });
    }
}

/// State of one top-level diff.
struct Differ<'a, 'r, 't> {
    scope: ViewNodePairScope<'a>,
    update_parent_tag: UpdateParentTag,
    tracer: &'r mut Tracer<'t>,
}

#[inline]
fn branch(tracer: &mut Tracer<'_>, branch: DiffBranch, parent: Tag, old_tag: Tag, new_tag: Tag) {
    #[cfg(feature = "trace-rich")]
    tracer.diff_branch(&crate::trace::DiffBranchEvent {
        branch,
        parent,
        old_tag,
        new_tag,
    });
    #[cfg(not(feature = "trace-rich"))]
    {
        _ = (tracer, branch, parent, old_tag, new_tag);
    }
}

impl Differ<'_, '_, '_> {
    fn slice(&mut self, parent: PairId, allow_flattened: bool) -> Vec<PairId> {
        slice::slice_child_pairs(&mut self.scope, parent, allow_flattened)
    }

    fn tag(&self, id: PairId) -> Tag {
        self.scope[id].tag()
    }

    /// Returns `true` if the children of a matched pair need diffing.
    fn subtrees_differ(&self, old: PairId, new: PairId) -> bool {
        let (o, n) = (&self.scope[old], &self.scope[new]);
        !ptr::eq(o.node, n.node) || o.children_culling != n.children_culling
    }

    /// Diffs the layers of two matched, unflattened pairs.
    fn diff_subtrees(&mut self, m: &mut OrderedMutations, old: PairId, new: PairId) {
        let old_children = self.slice(old, false);
        let new_children = self.slice(new, false);
        let target = if new_children.is_empty() {
            &mut m.destructive_downward
        } else {
            &mut m.downward
        };
        let parent = self.tag(old);
        self.calculate_mutations(target, parent, old_children, new_children);
    }

    /// Deletes everything mounted inside a deleted pair.
    fn delete_subtree(&mut self, out: &mut MutationList, old: PairId) {
        let children = self.slice(old, false);
        let parent = self.tag(old);
        self.calculate_mutations(out, parent, children, Vec::new());
    }

    /// Creates everything mounted inside a created pair.
    fn create_subtree(&mut self, out: &mut MutationList, new: PairId) {
        let children = self.slice(new, false);
        let parent = self.tag(new);
        self.calculate_mutations(out, parent, Vec::new(), children);
    }

    /// Diffs the layers `old` and `new` of `parent`, appending to `out`.
    fn calculate_mutations(
        &mut self,
        out: &mut MutationList,
        parent: Tag,
        old: Vec<PairId>,
        new: Vec<PairId>,
    ) {
        if old.is_empty() && new.is_empty() {
            return;
        }
        let mut m = OrderedMutations::default();

        // Lock-step while both layers agree.
        let mut index = 0;
        while index < old.len() && index < new.len() {
            let (o, n) = (old[index], new[index]);
            let (op, np) = (&self.scope[o], &self.scope[n]);
            if op.tag() != np.tag() {
                branch(self.tracer, DiffBranch::TagsDiffer, parent, op.tag(), np.tag());
                break;
            }
            if op.flattened != np.flattened || op.is_concrete_view != np.is_concrete_view {
                break;
            }
            branch(self.tracer, DiffBranch::Matched, parent, op.tag(), np.tag());
            if np.is_concrete_view && op.view != np.view {
                m.update(parent, &op.view, &np.view);
            }
            if !op.flattened && self.subtrees_differ(o, n) {
                self.diff_subtrees(&mut m, o, n);
            }
            index += 1;
        }

        if index == new.len() {
            for &o in &old[index..] {
                let op = &self.scope[o];
                branch(self.tracer, DiffBranch::DeleteTail, parent, op.tag(), Tag::NONE);
                if !op.is_concrete_view {
                    continue;
                }
                m.delete(&op.view);
                m.remove(parent, &op.view, op.index());
                self.delete_subtree(&mut m.destructive_downward, o);
            }
        } else if index == old.len() {
            for &n in &new[index..] {
                let np = &self.scope[n];
                branch(self.tracer, DiffBranch::CreateTail, parent, Tag::NONE, np.tag());
                if !np.is_concrete_view {
                    continue;
                }
                m.insert(parent, &np.view, np.index());
                m.create(&np.view);
                self.create_subtree(&mut m.downward, n);
            }
        } else {
            self.calculate_general(&mut m, parent, &old, &new, index);
        }

        m.flush_into(out);
    }

    /// The general case: both layers have children left from `start` on.
    fn calculate_general(
        &mut self,
        m: &mut OrderedMutations,
        parent: Tag,
        old: &[PairId],
        new: &[PairId],
        start: usize,
    ) {
        let mut new_remaining = TinyMap::new();
        let mut new_inserted = TinyMap::new();
        let mut deletion_candidates = TinyMap::new();
        for &n in &new[start..] {
            new_remaining.insert(self.tag(n), n);
        }

        let (mut old_index, mut new_index) = (start, start);
        while new_index < new.len() || old_index < old.len() {
            let have_new = new_index < new.len();
            let have_old = old_index < old.len();

            if have_new && have_old {
                let (o, n) = (old[old_index], new[new_index]);
                let tag = self.tag(o);
                if tag == self.tag(n) {
                    branch(self.tracer, DiffBranch::MatchedInOrder, parent, tag, tag);
                    self.update_matched_pair(m, true, true, parent, o, n);
                    self.update_matched_pair_subtrees(m, &mut new_remaining, old, parent, o, n);
                    old_index += 1;
                    new_index += 1;
                    continue;
                }
            }

            if have_old {
                let o = old[old_index];
                let old_tag = self.tag(o);

                // Already inserted further ahead: this is a move.
                if let Some(slot) = new_inserted.find(old_tag) {
                    let n = slot.value;
                    branch(self.tracer, DiffBranch::Reordered, parent, old_tag, old_tag);
                    self.update_matched_pair(m, true, false, parent, o, n);
                    self.update_matched_pair_subtrees(m, &mut new_remaining, old, parent, o, n);
                    new_inserted.erase(slot);
                    old_index += 1;
                    continue;
                }

                if !have_new || !new_remaining.contains(old_tag) {
                    old_index += 1;
                    let op = &self.scope[o];
                    if !op.is_concrete_view {
                        continue;
                    }
                    branch(self.tracer, DiffBranch::Removed, parent, old_tag, Tag::NONE);

                    // Claimed by a flattener and still mounted: an update to
                    // the new view is already queued, so remove by that view.
                    if let Some(other) = op.other_tree_pair() {
                        let other = &self.scope[other];
                        if other.is_concrete_view {
                            m.remove(parent, &other.view, op.index());
                            continue;
                        }
                    }
                    m.remove(parent, &op.view, op.index());
                    deletion_candidates.insert(old_tag, o);
                    continue;
                }
            }

            let n = new[new_index];
            let np = &self.scope[n];
            branch(self.tracer, DiffBranch::Inserted, parent, Tag::NONE, np.tag());
            if np.is_concrete_view {
                m.insert(parent, &np.view, np.index());
            }
            if !np.in_other_tree() {
                new_inserted.insert(np.tag(), n);
            }
            new_index += 1;
        }

        // Deletions are deferred until the whole layer is walked, since a
        // later unflatten may still claim the node.
        for (tag, o) in deletion_candidates.iter() {
            let op = &self.scope[o];
            if op.in_other_tree() || !op.is_concrete_view {
                continue;
            }
            branch(self.tracer, DiffBranch::Deleted, parent, tag, Tag::NONE);
            m.delete(&op.view);
            self.delete_subtree(&mut m.destructive_downward, o);
        }

        for (tag, n) in new_inserted.iter() {
            let np = &self.scope[n];
            if !np.is_concrete_view || np.in_other_tree() {
                continue;
            }
            branch(self.tracer, DiffBranch::Created, parent, Tag::NONE, tag);
            m.create(&np.view);
            self.create_subtree(&mut m.downward, n);
        }
    }

    /// Handles a matched pair itself, not its subtree.
    ///
    /// Inserts and removes are only emitted for a side found by in-order
    /// traversal, which is what keeps their indices valid.
    fn update_matched_pair(
        &mut self,
        m: &mut OrderedMutations,
        old_in_order: bool,
        new_in_order: bool,
        parent: Tag,
        old: PairId,
        new: PairId,
    ) {
        self.scope.mark_matched(old, new);
        let (op, np) = (&self.scope[old], &self.scope[new]);

        if op.is_concrete_view != np.is_concrete_view {
            if np.is_concrete_view {
                if new_in_order {
                    m.insert(parent, &np.view, np.index());
                }
                m.create(&np.view);
            } else {
                if old_in_order {
                    m.remove(parent, &op.view, op.index());
                }
                m.delete(&op.view);
            }
        } else if op.is_concrete_view {
            if old_in_order && !new_in_order {
                // The update to the new view runs first.
                m.remove(parent, &np.view, op.index());
            }
            if op.view != np.view {
                m.update(parent, &op.view, &np.view);
            }
        }
    }

    /// Handles the subtree of a matched pair, including flattening changes.
    fn update_matched_pair_subtrees(
        &mut self,
        m: &mut OrderedMutations,
        new_remaining: &mut TinyMap<PairId>,
        old_layer: &[PairId],
        parent: Tag,
        old: PairId,
        new: PairId,
    ) {
        let old_flattened = self.scope[old].flattened;
        let new_flattened = self.scope[new].flattened;
        if old_flattened && new_flattened {
            return;
        }

        if old_flattened != new_flattened {
            if !old_flattened {
                // The old node's layer is spliced into this one.
                let frame = flatten::ReparentFrame {
                    mode: ReparentMode::Flatten,
                    parent,
                    node: old,
                    parent_for_update: self.tag(old),
                };
                self.flatten(m, frame, new_remaining, None);
            } else {
                // Descendants of the old node, found in this layer in order.
                let old_flattened_pairs = self.slice(old, true);
                let mut unvisited_old = TinyMap::new();
                let mut next = old_flattened_pairs.iter().peekable();
                for &candidate in old_layer {
                    let Some(&&wanted) = next.peek() else {
                        break;
                    };
                    let tag = self.tag(candidate);
                    if tag == self.tag(wanted) {
                        unvisited_old.insert(tag, candidate);
                        next.next();
                    }
                }

                let frame = flatten::ReparentFrame {
                    mode: ReparentMode::Unflatten,
                    parent,
                    node: new,
                    parent_for_update: parent,
                };
                self.flatten(m, frame, &mut unvisited_old, None);

                // Visited descendants are handled; keep the caller from
                // inserting them again.
                for &f in &old_flattened_pairs {
                    let tag = self.tag(f);
                    if !unvisited_old.contains(tag) {
                        new_remaining.remove(tag);
                    }
                }
            }
            return;
        }

        if self.subtrees_differ(old, new) {
            self.diff_subtrees(m, old, new);
        }
    }
}
