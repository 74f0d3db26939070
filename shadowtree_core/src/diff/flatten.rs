// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving descendants between layers when a node starts or stops flattening.
//!
//! When a node's children become flattened, the views it hosted move up into
//! its parent's layer; when they stop being flattened, the views move back
//! down. In both cases the views keep their identity: the flattener walks the
//! node's own layer (the "tree" side) and matches each child by tag against
//! the layer the caller is diffing (the "list" side). Matched views are
//! removed from or inserted into the node and updated; the caller handles
//! the matching insert or remove on the list side. Tree children that find
//! no match are deleted (flatten) or created (unflatten) at the end.

use super::pair::PairId;
use super::{Differ, OrderedMutations, UpdateParentTag, branch};
use crate::node::Tag;
use crate::tiny_map::TinyMap;
use crate::trace::DiffBranch;

/// Direction of a flattening change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReparentMode {
    /// The node's children move up into its parent's layer.
    Flatten,
    /// The node's children move from its parent's layer into the node.
    Unflatten,
}

/// Where one flattener pass operates.
#[derive(Clone, Copy, Debug)]
pub(super) struct ReparentFrame {
    pub(super) mode: ReparentMode,
    /// Parent whose layer the caller is diffing.
    pub(super) parent: Tag,
    /// The node whose layer is walked: old side for `Flatten`, new side for
    /// `Unflatten`.
    pub(super) node: PairId,
    /// Where matched views are mounted when their updates are applied.
    pub(super) parent_for_update: Tag,
}

/// Pairs already matched by a nested pass, keyed by tag.
#[derive(Debug)]
pub(super) struct SubVisited<'m> {
    new: &'m mut TinyMap<PairId>,
    old: &'m mut TinyMap<PairId>,
}

impl Differ<'_, '_, '_> {
    /// Runs one flattener pass.
    ///
    /// `unvisited` holds the list-side pairs not yet claimed. Claimed pairs
    /// stay in the map; the caller tells them apart by their match.
    pub(super) fn flatten(
        &mut self,
        m: &mut OrderedMutations,
        frame: ReparentFrame,
        unvisited: &mut TinyMap<PairId>,
        sub_visited: Option<SubVisited<'_>>,
    ) {
        let node_tag = self.tag(frame.node);
        #[cfg(feature = "trace-rich")]
        self.tracer.reparent(&crate::trace::ReparentEvent {
            mode: frame.mode,
            node: node_tag,
            parent: frame.parent,
        });

        let mut own_new = TinyMap::new();
        let mut own_old = TinyMap::new();
        let SubVisited {
            new: visited_new,
            old: visited_old,
        } = sub_visited.unwrap_or(SubVisited {
            new: &mut own_new,
            old: &mut own_old,
        });

        // Tree children with no counterpart, deleted or created at the end.
        let mut candidates = TinyMap::new();

        for child in self.slice(frame.node, false) {
            let tag = self.tag(child);
            let from_unvisited = unvisited.get(tag);
            let (sub_new, sub_old) = if from_unvisited.is_none() {
                (visited_new.get(tag), visited_old.get(tag))
            } else {
                (None, None)
            };

            let matched = from_unvisited.or(sub_new).or(sub_old).map(|other| match frame.mode {
                ReparentMode::Flatten => (child, other),
                ReparentMode::Unflatten => (other, child),
            });
            let mut already_updated = false;
            if let Some((old, new)) = matched {
                already_updated = self.scope.in_other_tree(old) || self.scope.in_other_tree(new);
                self.scope.mark_matched(old, new);
            }

            let cp = &self.scope[child];
            if cp.is_concrete_view {
                match frame.mode {
                    ReparentMode::Flatten => {
                        // An update to the new view runs before this remove.
                        let view = match cp.other_tree_pair().map(|o| &self.scope[o]) {
                            Some(other) if other.is_concrete_view => &other.view,
                            _ => &cp.view,
                        };
                        m.remove(node_tag, view, cp.index());
                    }
                    ReparentMode::Unflatten => m.insert(node_tag, &cp.view, cp.index()),
                }
            }

            let Some((old, new)) = matched else {
                if cp.is_concrete_view && !cp.in_other_tree() && !candidates.contains(tag) {
                    candidates.insert(tag, child);
                }
                continue;
            };

            if already_updated {
                continue;
            }
            if from_unvisited.is_none() {
                let seen = match frame.mode {
                    ReparentMode::Flatten => sub_old.is_some(),
                    ReparentMode::Unflatten => sub_new.is_some(),
                };
                if seen {
                    continue;
                }
            }

            let (op, np) = (&self.scope[old], &self.scope[new]);
            if op.is_concrete_view && np.is_concrete_view && op.view != np.view {
                let parent = match self.update_parent_tag {
                    UpdateParentTag::MountedParent => frame.parent_for_update,
                    UpdateParentTag::LegacyNodeParent => node_tag,
                };
                m.update(parent, &op.view, &np.view);
            }
            let (old_flattened, new_flattened) = (op.flattened, np.flattened);
            let (old_concrete, new_concrete) = (op.is_concrete_view, np.is_concrete_view);

            if !old_flattened && !new_flattened {
                if self.subtrees_differ(old, new) {
                    let old_children = self.slice(old, false);
                    let new_children = self.slice(new, false);
                    self.calculate_mutations(&mut m.downward, tag, old_children, new_children);
                }
            } else if old_flattened != new_flattened {
                let child_mode = if old_flattened {
                    ReparentMode::Unflatten
                } else {
                    ReparentMode::Flatten
                };
                let (parent, parent_for_update) = match frame.mode {
                    ReparentMode::Flatten => (frame.parent, tag),
                    ReparentMode::Unflatten => (tag, frame.parent),
                };

                if child_mode == frame.mode {
                    let child_frame = ReparentFrame {
                        mode: child_mode,
                        parent,
                        node: child,
                        parent_for_update,
                    };
                    self.flatten(
                        m,
                        child_frame,
                        unvisited,
                        Some(SubVisited {
                            new: &mut *visited_new,
                            old: &mut *visited_old,
                        }),
                    );
                } else {
                    let (flattened_side, walked_side) = match child_mode {
                        ReparentMode::Flatten => (new, old),
                        ReparentMode::Unflatten => (old, new),
                    };
                    let mut unvisited_recursive = TinyMap::new();
                    for f in self.slice(flattened_side, true) {
                        let t = self.tag(f);
                        unvisited_recursive.insert(t, unvisited.get(t).unwrap_or(f));
                    }

                    let child_frame = ReparentFrame {
                        mode: child_mode,
                        parent,
                        node: walked_side,
                        parent_for_update,
                    };
                    self.flatten(
                        m,
                        child_frame,
                        &mut unvisited_recursive,
                        Some(SubVisited {
                            new: &mut *visited_new,
                            old: &mut *visited_old,
                        }),
                    );

                    if child_mode == ReparentMode::Unflatten {
                        for (t, p) in unvisited_recursive.iter() {
                            let pair = &self.scope[p];
                            if pair.is_concrete_view && !pair.in_other_tree() {
                                if !candidates.contains(t) {
                                    candidates.insert(t, p);
                                }
                            } else {
                                unvisited.remove(t);
                            }
                        }
                    }
                }
            }

            // The caller stops tracking claimed pairs, so a change in
            // concreteness is settled here.
            if old_concrete != new_concrete {
                if new_concrete {
                    m.create(&self.scope[new].view);
                } else {
                    m.delete(&self.scope[old].view);
                }
            }

            visited_new.insert(tag, new);
            visited_old.insert(tag, old);
        }

        // A nested pass slices the same descendants into pairs of its own, so
        // a candidate may have been claimed under a different pair. Settle by
        // tag.
        for (tag, id) in candidates.iter() {
            let pair = &self.scope[id];
            if pair.in_other_tree() || visited_old.contains(tag) || visited_new.contains(tag) {
                continue;
            }
            let flattened = pair.flattened;
            match frame.mode {
                ReparentMode::Flatten => {
                    branch(self.tracer, DiffBranch::Deleted, node_tag, tag, Tag::NONE);
                    m.delete(&pair.view);
                    if !flattened {
                        self.delete_subtree(&mut m.destructive_downward, id);
                    }
                }
                ReparentMode::Unflatten => {
                    branch(self.tracer, DiffBranch::Created, node_tag, Tag::NONE, tag);
                    m.create(&pair.view);
                    if !flattened {
                        self.create_subtree(&mut m.downward, id);
                    }
                }
            }
        }
    }
}
