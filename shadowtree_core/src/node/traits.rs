// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node trait bits that drive layer construction.

use bitflags::bitflags;

bitflags! {
    /// Structural traits of a shadow node.
    ///
    /// Only these bits (not props) decide how a node participates in the
    /// mounted hierarchy:
    ///
    /// - A node that [`FORMS_VIEW`](Self::FORMS_VIEW) is *concrete* and gets a
    ///   native view.
    /// - A node's children are *flattened* (spliced into the nearest
    ///   ancestor's layer) unless it [`FORMS_STACKING_CONTEXT`](Self::FORMS_STACKING_CONTEXT),
    ///   and always when it is [`FORCE_FLATTEN_VIEW`](Self::FORCE_FLATTEN_VIEW).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShadowNodeTraits: u16 {
        /// The node produces a native view.
        const FORMS_VIEW = 1 << 0;
        /// The node's children are mounted inside its own view.
        const FORMS_STACKING_CONTEXT = 1 << 1;
        /// The node's children are always spliced into an ancestor's layer.
        const FORCE_FLATTEN_VIEW = 1 << 2;
        /// The node and its subtree are not mounted at all.
        const HIDDEN = 1 << 3;
        /// The node is a root (top-level or nested). Culling restarts below it.
        const ROOT_NODE_KIND = 1 << 4;
        /// The node scrolls its content; culling follows its content offset.
        const SCROLL_VIEW = 1 << 5;
        /// The node is never culled, whatever its frame.
        const UNCULLABLE = 1 << 6;
    }
}

impl ShadowNodeTraits {
    /// Traits of a plain concrete view that hosts its own children.
    pub const VIEW: Self = Self::FORMS_VIEW.union(Self::FORMS_STACKING_CONTEXT);

    /// Returns `true` if the node's children belong to an ancestor's layer.
    #[inline]
    #[must_use]
    pub const fn children_flattened(self) -> bool {
        !self.contains(Self::FORMS_STACKING_CONTEXT) || self.contains(Self::FORCE_FLATTEN_VIEW)
    }

    /// Returns `true` if the node produces a native view.
    #[inline]
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        self.contains(Self::FORMS_VIEW)
    }

    /// Returns `true` if the trait combination is one the differ can mount.
    ///
    /// A node whose children form their own layer must itself be a view,
    /// otherwise those children would have no native parent.
    #[inline]
    #[must_use]
    pub const fn is_well_formed(self) -> bool {
        self.children_flattened() || self.is_concrete()
    }
}
