// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout metrics attached to each node.
//!
//! Layout is computed upstream; the differ only reads these values to offset
//! spliced children, to cull, and to compare views.

use kurbo::{Insets, Rect};

/// How a node participates in its parent's layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PositionType {
    /// In normal flow, not offsettable.
    Static,
    /// In normal flow, offsettable.
    #[default]
    Relative,
    /// Out of flow.
    Absolute,
}

/// How a node is displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayType {
    /// Not laid out at all.
    None,
    /// Flexbox container.
    #[default]
    Flex,
    /// Replaced by its children in layout.
    Contents,
}

/// Resolved writing direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutDirection {
    /// Inherited, not resolved.
    #[default]
    Undefined,
    /// Left to right.
    LeftToRight,
    /// Right to left.
    RightToLeft,
}

/// Computed layout for one node, relative to its parent node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Border box, relative to the parent node's origin.
    pub frame: Rect,
    /// Padding plus border.
    pub content_insets: Insets,
    /// Border widths.
    pub border_width: Insets,
    /// How far painted descendants overflow the frame, as outward extents.
    pub overflow_inset: Insets,
    /// Display mode.
    pub display_type: DisplayType,
    /// Positioning mode.
    pub position_type: PositionType,
    /// Resolved writing direction.
    pub layout_direction: LayoutDirection,
    /// Device pixels per layout point.
    pub point_scale_factor: f64,
}

impl LayoutMetrics {
    /// Sentinel for a node that has not been laid out.
    ///
    /// Its frame has negative size, which no real layout produces.
    pub const EMPTY: Self = Self {
        frame: Rect::new(0.0, 0.0, -1.0, -1.0),
        content_insets: Insets::ZERO,
        border_width: Insets::ZERO,
        overflow_inset: Insets::ZERO,
        display_type: DisplayType::Flex,
        position_type: PositionType::Relative,
        layout_direction: LayoutDirection::Undefined,
        point_scale_factor: 1.0,
    };

    /// Creates metrics with the given frame and default everything else.
    #[must_use]
    pub fn from_frame(frame: Rect) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// Returns `true` if these are the [`EMPTY`](Self::EMPTY) sentinel.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// The frame grown by the (non-negative part of the) overflow inset.
    ///
    /// This is the area the node and its descendants may paint into, which is
    /// what culling tests against.
    #[must_use]
    pub fn overflow_inset_frame(&self) -> Rect {
        let o = self.overflow_inset;
        let outward = Insets::new(o.x0.max(0.0), o.y0.max(0.0), o.x1.max(0.0), o.y1.max(0.0));
        self.frame + outward
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            ..Self::EMPTY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_is_distinct_from_default() {
        assert!(LayoutMetrics::EMPTY.is_empty());
        assert!(!LayoutMetrics::default().is_empty());
        assert_eq!(LayoutMetrics::default().frame, Rect::ZERO);
    }

    #[test]
    fn overflow_frame_grows_outward() {
        let mut m = LayoutMetrics::from_frame(Rect::new(10.0, 10.0, 20.0, 20.0));
        m.overflow_inset = Insets::new(5.0, 0.0, 0.0, 30.0);
        assert_eq!(m.overflow_inset_frame(), Rect::new(5.0, 10.0, 20.0, 50.0));
    }

    #[test]
    fn negative_overflow_never_shrinks() {
        let mut m = LayoutMetrics::from_frame(Rect::new(0.0, 0.0, 10.0, 10.0));
        m.overflow_inset = Insets::uniform(-3.0);
        assert_eq!(m.overflow_inset_frame(), m.frame);
    }
}
