// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View, surface, and component identity types.

use core::fmt;

/// The identity of a mountable view.
///
/// A tag is shared by every revision of one logical node and is the key the
/// mounting layer uses to find its native view. [`Tag::NONE`] is reserved and
/// never names a real view.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub i32);

impl Tag {
    /// The reserved "no view" tag.
    ///
    /// Used as the parent tag of root-level updates and as the erased-slot
    /// marker in diagnostics. Never valid as a map key.
    pub const NONE: Self = Self(0);

    /// Returns `true` if this is the reserved [`Tag::NONE`].
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of a surface (one independently mounted root).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub i32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// An opaque handle identifying a component implementation.
///
/// Produced by a [`ComponentDescriptor`](super::ComponentDescriptor); the
/// differ only copies it into views.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentHandle(pub i64);

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentHandle({:#x})", self.0)
    }
}
