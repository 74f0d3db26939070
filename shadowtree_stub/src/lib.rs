// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory mounting layer that checks every mutation it applies.
//!
//! [`StubViewTree`] keeps one [`StubView`] per mounted tag, with its parent
//! and ordered children, and panics with a descriptive message on any
//! mutation a real platform could not apply: creating a tag twice,
//! touching a tag that does not exist, removing a child from the wrong
//! parent or index, or deleting a view that is still parented.
//!
//! Two builders produce the stub tree a shadow tree should mount as:
//!
//! - [`build_stub_view_tree_without_differentiator`] walks the mount layers
//!   directly, never calling the differ.
//! - [`build_stub_view_tree_with_differentiator`] diffs a childless revision
//!   of the root against the full tree and applies the result.
//!
//! Comparing those two, or comparing a stub that had a diff applied against
//! one built directly from the new tree, is how round-trip correctness of the
//! differ is checked:
//!
//! ```
//! use shadowtree_core::culling::CullingConfig;
//! use shadowtree_core::diff::diff;
//! use shadowtree_core::node::{
//!     ComponentHandle, ShadowNode, ShadowNodeFamily, ShadowNodeFamilyFragment,
//!     ShadowNodeFragment, ShadowNodeTraits, SimpleComponentDescriptor, SurfaceId, Tag,
//! };
//! use shadowtree_stub::build_stub_view_tree_without_differentiator;
//!
//! let family = |tag| {
//!     ShadowNodeFamily::new(
//!         ShadowNodeFamilyFragment { tag: Tag(tag), surface_id: SurfaceId(1), event_emitter: None },
//!         SimpleComponentDescriptor::shared("View", ComponentHandle(1), ShadowNodeTraits::VIEW),
//!     )
//! };
//! let old = ShadowNode::new(ShadowNodeFragment::new(), family(1));
//! let new = old.with_children([ShadowNode::new(ShadowNodeFragment::new(), family(2))]);
//!
//! let culling = CullingConfig::DISABLED;
//! let mut stub = build_stub_view_tree_without_differentiator(&old, &culling);
//! stub.apply_mutations(&diff(&old, &new));
//! assert_eq!(stub, build_stub_view_tree_without_differentiator(&new, &culling));
//! ```

use std::collections::BTreeMap;

use shadowtree_core::culling::CullingConfig;
use shadowtree_core::diff::{DiffOptions, LayerEntry, UpdateParentTag, diff_with, mount_layer};
use shadowtree_core::mount::{MountingLayer, MountingTransaction};
use shadowtree_core::mutation::ShadowViewMutation;
use shadowtree_core::node::{ShadowNode, Tag};
use shadowtree_core::trace::Tracer;
use shadowtree_core::view::ShadowView;

/// One mounted view.
#[derive(Clone, Debug, PartialEq)]
pub struct StubView {
    /// The view as last created, inserted or updated.
    pub view: ShadowView,
    /// The tag of the parent it is inserted in, or [`Tag::NONE`].
    pub parent: Tag,
    /// Tags of its children, in mount order.
    pub children: Vec<Tag>,
}

impl StubView {
    fn new(view: ShadowView) -> Self {
        Self {
            view,
            parent: Tag::NONE,
            children: Vec::new(),
        }
    }
}

/// A checked in-memory view hierarchy for one surface.
///
/// Two trees are equal when they have the same root, the same set of tags,
/// equal views and the same parent/child relationships in the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct StubViewTree {
    root_tag: Tag,
    views: BTreeMap<Tag, StubView>,
}

impl StubViewTree {
    /// Creates a tree holding only the root view.
    #[must_use]
    pub fn new(root: ShadowView) -> Self {
        let root_tag = root.tag;
        let mut views = BTreeMap::new();
        views.insert(root_tag, StubView::new(root));
        Self { root_tag, views }
    }

    /// Tag of the root view.
    #[must_use]
    pub fn root_tag(&self) -> Tag {
        self.root_tag
    }

    /// The view for `tag`, if one exists.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&StubView> {
        self.views.get(&tag)
    }

    /// Returns `true` if a view exists for `tag`.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.views.contains_key(&tag)
    }

    /// Number of views, including the root and any unparented ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Always `false`: the root view is never deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Tags of the children of `tag`, in mount order.
    ///
    /// # Panics
    ///
    /// Panics if no view exists for `tag`.
    #[must_use]
    pub fn children_of(&self, tag: Tag) -> &[Tag] {
        &self.view(tag, "children_of").children
    }

    /// Applies `mutations` in order.
    ///
    /// # Panics
    ///
    /// Panics on the first mutation that cannot be applied to the current
    /// hierarchy.
    pub fn apply_mutations(&mut self, mutations: &[ShadowViewMutation]) {
        for mutation in mutations {
            self.apply_mutation(mutation);
        }
    }

    fn view(&self, tag: Tag, op: &str) -> &StubView {
        self.views
            .get(&tag)
            .unwrap_or_else(|| panic!("{op}: view {tag} does not exist"))
    }

    fn view_mut(&mut self, tag: Tag, op: &str) -> &mut StubView {
        self.views
            .get_mut(&tag)
            .unwrap_or_else(|| panic!("{op}: view {tag} does not exist"))
    }

    fn apply_mutation(&mut self, mutation: &ShadowViewMutation) {
        match mutation {
            ShadowViewMutation::Create { new } => {
                assert!(
                    !self.views.contains_key(&new.tag),
                    "create: view {} already exists",
                    new.tag
                );
                self.views.insert(new.tag, StubView::new(new.clone()));
            }
            ShadowViewMutation::Delete { old } => {
                let view = self.view(old.tag, "delete");
                assert!(
                    view.parent.is_none(),
                    "delete: view {} is still inserted in {}",
                    old.tag,
                    view.parent
                );
                assert!(old.tag != self.root_tag, "delete: view {} is the root", old.tag);
                self.views.remove(&old.tag);
            }
            ShadowViewMutation::Insert { parent, new, index } => {
                let child = self.view(new.tag, "insert");
                assert!(
                    child.parent.is_none(),
                    "insert: view {} is already inserted in {}",
                    new.tag,
                    child.parent
                );
                let siblings = &mut self.view_mut(*parent, "insert into").children;
                assert!(
                    *index <= siblings.len(),
                    "insert: index {index} is out of bounds for {} children of {parent}",
                    siblings.len()
                );
                siblings.insert(*index, new.tag);
                let child = self.view_mut(new.tag, "insert");
                child.parent = *parent;
                child.view = new.clone();
            }
            ShadowViewMutation::Remove { parent, old, index } => {
                let child = self.view(old.tag, "remove");
                assert!(
                    child.parent == *parent,
                    "remove: view {} is inserted in {}, not {parent}",
                    old.tag,
                    child.parent
                );
                let siblings = &mut self.view_mut(*parent, "remove from").children;
                assert!(
                    siblings.get(*index) == Some(&old.tag),
                    "remove: view {} is not at index {index} of {parent} (children {siblings:?})",
                    old.tag
                );
                siblings.remove(*index);
                self.view_mut(old.tag, "remove").parent = Tag::NONE;
            }
            // The parent of an update is informational; views move between
            // parents around it.
            ShadowViewMutation::Update { new, .. } => {
                self.view_mut(new.tag, "update").view = new.clone();
            }
        }
    }
}

impl MountingLayer for StubViewTree {
    fn apply(&mut self, transaction: &MountingTransaction) {
        self.apply_mutations(&transaction.mutations);
    }
}

/// Builds the stub tree `root` mounts as under `culling`, by walking its
/// mount layers.
#[must_use]
pub fn build_stub_view_tree_without_differentiator(
    root: &ShadowNode,
    culling: &CullingConfig,
) -> StubViewTree {
    let mut tree = StubViewTree::new(ShadowView::new(root));
    let root_tag = tree.root_tag;
    mount_entries(&mut tree, root_tag, mount_layer(root, culling));
    tree
}

fn mount_entries(tree: &mut StubViewTree, parent: Tag, entries: Vec<LayerEntry<'_>>) {
    for entry in entries {
        let tag = entry.view.tag;
        let mut view = StubView::new(entry.view.clone());
        view.parent = parent;
        assert!(
            tree.views.insert(tag, view).is_none(),
            "view {tag} is mounted twice"
        );
        let siblings = &mut tree.view_mut(parent, "mount").children;
        debug_assert_eq!(siblings.len(), entry.mount_index, "mount indices are dense");
        siblings.push(tag);
        mount_entries(tree, tag, entry.children());
    }
}

/// Builds the stub tree `root` mounts as under `culling`, by diffing a
/// childless revision of the root against it.
#[must_use]
pub fn build_stub_view_tree_with_differentiator(
    root: &ShadowNode,
    culling: &CullingConfig,
) -> StubViewTree {
    let empty = root.with_children(core::iter::empty());
    let mut tree = StubViewTree::new(ShadowView::new(&empty));
    let options = DiffOptions {
        old_culling: *culling,
        new_culling: *culling,
        update_parent_tag: UpdateParentTag::default(),
    };
    tree.apply_mutations(&diff_with(&empty, root, &options, &mut Tracer::none()));
    tree
}
