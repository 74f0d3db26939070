// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation instructions produced by the differ.

use crate::node::Tag;
use crate::view::ShadowView;

/// One atomic instruction for the mounting layer.
///
/// A list of these, applied in order, turns the previously mounted native
/// hierarchy into the one described by the new tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ShadowViewMutation {
    /// Create a native view for `new`. It starts out unparented.
    Create {
        /// The view to create.
        new: ShadowView,
    },
    /// Destroy the native view for `old`. It must already be unparented.
    Delete {
        /// The view to destroy.
        old: ShadowView,
    },
    /// Make `new` the child of `parent` at `index`.
    Insert {
        /// Parent view tag.
        parent: Tag,
        /// The child view.
        new: ShadowView,
        /// Position among the parent's children after insertion.
        index: usize,
    },
    /// Detach `old` from `parent`, where it currently sits at `index`.
    Remove {
        /// Parent view tag.
        parent: Tag,
        /// The child view.
        old: ShadowView,
        /// Position among the parent's children before removal.
        index: usize,
    },
    /// Replace the mountable properties of a view.
    Update {
        /// Tag of the parent the view is mounted in, or [`Tag::NONE`] for a
        /// root.
        parent: Tag,
        /// The view as it was.
        old: ShadowView,
        /// The view as it is now.
        new: ShadowView,
    },
}

/// An ordered mutation list.
pub type MutationList = Vec<ShadowViewMutation>;

/// The kind of a [`ShadowViewMutation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// [`ShadowViewMutation::Create`].
    Create,
    /// [`ShadowViewMutation::Delete`].
    Delete,
    /// [`ShadowViewMutation::Insert`].
    Insert,
    /// [`ShadowViewMutation::Remove`].
    Remove,
    /// [`ShadowViewMutation::Update`].
    Update,
}

impl MutationKind {
    /// Lowercase name, as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }
}

impl ShadowViewMutation {
    /// The mutation's kind.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Delete { .. } => MutationKind::Delete,
            Self::Insert { .. } => MutationKind::Insert,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Update { .. } => MutationKind::Update,
        }
    }

    /// Tag of the view the mutation is about.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Create { new } | Self::Insert { new, .. } | Self::Update { new, .. } => new.tag,
            Self::Delete { old } | Self::Remove { old, .. } => old.tag,
        }
    }

    /// Parent tag, for mutations that have one.
    #[must_use]
    pub fn parent_tag(&self) -> Option<Tag> {
        match self {
            Self::Insert { parent, .. } | Self::Remove { parent, .. } | Self::Update { parent, .. } => {
                Some(*parent)
            }
            Self::Create { .. } | Self::Delete { .. } => None,
        }
    }

    /// Child index, for `Insert` and `Remove`.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Insert { index, .. } | Self::Remove { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The view as it was before this mutation, if the mutation carries one.
    #[must_use]
    pub fn old_view(&self) -> Option<&ShadowView> {
        match self {
            Self::Delete { old } | Self::Remove { old, .. } | Self::Update { old, .. } => Some(old),
            Self::Create { .. } | Self::Insert { .. } => None,
        }
    }

    /// The view as it is after this mutation, if the mutation carries one.
    #[must_use]
    pub fn new_view(&self) -> Option<&ShadowView> {
        match self {
            Self::Create { new } | Self::Insert { new, .. } | Self::Update { new, .. } => Some(new),
            Self::Delete { .. } | Self::Remove { .. } => None,
        }
    }
}

/// Number of mutations of each kind in a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MutationCounts {
    /// Creates.
    pub create: u32,
    /// Deletes.
    pub delete: u32,
    /// Inserts.
    pub insert: u32,
    /// Removes.
    pub remove: u32,
    /// Updates.
    pub update: u32,
}

impl MutationCounts {
    /// Counts the mutations in `list`.
    #[must_use]
    pub fn of(list: &[ShadowViewMutation]) -> Self {
        let mut counts = Self::default();
        for mutation in list {
            counts.add(mutation.kind());
        }
        counts
    }

    /// Adds one mutation of `kind`.
    pub fn add(&mut self, kind: MutationKind) {
        let slot = match kind {
            MutationKind::Create => &mut self.create,
            MutationKind::Delete => &mut self.delete,
            MutationKind::Insert => &mut self.insert,
            MutationKind::Remove => &mut self.remove,
            MutationKind::Update => &mut self.update,
        };
        *slot = slot.saturating_add(1);
    }

    /// Total number of mutations.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.create + self.delete + self.insert + self.remove + self.update
    }
}
