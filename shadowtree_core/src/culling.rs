// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport culling.
//!
//! With culling enabled, slicing skips children whose painted area lies
//! entirely outside the visible window. A skipped child is left out of the
//! layer being built this commit, not out of the tree, so it reappears (and
//! is created) as soon as a later commit scrolls it into view.
//!
//! The visible window is threaded down the traversal as a [`CullingContext`]
//! expressed in the coordinate space of the node whose children are being
//! sliced.

use kurbo::Rect;

use crate::node::{ShadowNode, ShadowNodeTraits};
use crate::transform::Transform3d;

/// Culling configuration for one side of a diff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CullingConfig {
    /// Whether culling is applied at all.
    pub enabled: bool,
    /// Visible window in root coordinates. `None` means "unknown", which
    /// disables culling below the root until a nested scroll view sets one.
    pub viewport: Option<Rect>,
}

impl CullingConfig {
    /// Culling disabled.
    pub const DISABLED: Self = Self {
        enabled: false,
        viewport: None,
    };

    /// Culling enabled with the given viewport.
    #[must_use]
    pub const fn viewport(viewport: Rect) -> Self {
        Self {
            enabled: true,
            viewport: Some(viewport),
        }
    }
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Accumulated visible window for the children of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CullingContext {
    /// Visible window, in the coordinate space of the node's children.
    pub frame: Rect,
    /// Transforms accumulated from ancestors since the window was last reset.
    pub transform: Transform3d,
    /// Whether culling is enabled for this traversal.
    pub enabled: bool,
}

impl CullingContext {
    /// A context that never culls.
    pub const DISABLED: Self = Self {
        frame: Rect::ZERO,
        transform: Transform3d::IDENTITY,
        enabled: false,
    };

    /// The context for the root's children.
    #[must_use]
    pub fn root(config: &CullingConfig) -> Self {
        if !config.enabled {
            return Self::DISABLED;
        }
        Self {
            frame: config.viewport.unwrap_or(Rect::ZERO),
            transform: Transform3d::IDENTITY,
            enabled: true,
        }
    }

    /// Returns `true` if children should be tested against this window.
    #[must_use]
    pub fn should_consider_culling(&self) -> bool {
        self.enabled && self.frame.width() > 0.0 && self.frame.height() > 0.0
    }

    /// The context for the children of `node`, given that this is the
    /// context `node` itself was sliced under.
    #[must_use]
    pub fn adjusted_for(&self, node: &ShadowNode) -> Self {
        if !self.enabled {
            return *self;
        }
        let traits = node.traits();
        let layout = node.layout_metrics();
        if traits.contains(ShadowNodeTraits::SCROLL_VIEW) && !layout.is_empty() {
            Self {
                frame: Rect::from_origin_size(node.content_offset().to_point(), layout.frame.size()),
                transform: Transform3d::IDENTITY,
                enabled: true,
            }
        } else if traits.contains(ShadowNodeTraits::ROOT_NODE_KIND) {
            Self {
                enabled: true,
                ..Self::DISABLED
            }
        } else {
            Self {
                frame: self.frame - layout.frame.origin().to_vec2(),
                transform: self.transform * *node.transform(),
                enabled: true,
            }
        }
    }

    /// Returns `true` if `child` (sliced under this context) is entirely
    /// outside the window.
    #[must_use]
    pub fn is_culled(&self, child: &ShadowNode) -> bool {
        if !self.should_consider_culling() || child.traits().contains(ShadowNodeTraits::UNCULLABLE)
        {
            return false;
        }
        let painted = child.layout_metrics().overflow_inset_frame();
        let painted = self.transform.map_rect_about_center(painted);
        let painted = child.transform().map_rect_about_center(painted);
        self.frame.intersect(painted).area() <= 0.0
    }
}

impl Default for CullingContext {
    fn default() -> Self {
        Self::DISABLED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMetrics;
    use crate::node::{
        ComponentHandle, ShadowNodeFamily, ShadowNodeFamilyFragment, ShadowNodeFragment,
        SharedShadowNode, SimpleComponentDescriptor, SurfaceId, Tag,
    };
    use kurbo::{Insets, Vec2};

    fn node(traits: ShadowNodeTraits, frame: Rect) -> SharedShadowNode {
        let family = ShadowNodeFamily::new(
            ShadowNodeFamilyFragment {
                tag: Tag(2),
                surface_id: SurfaceId(1),
                event_emitter: None,
            },
            SimpleComponentDescriptor::shared("View", ComponentHandle(1), traits),
        );
        ShadowNode::new(
            ShadowNodeFragment::new().layout_metrics(LayoutMetrics::from_frame(frame)),
            family,
        )
    }

    fn window() -> CullingContext {
        CullingContext::root(&CullingConfig::viewport(Rect::new(0.0, 0.0, 100.0, 100.0)))
    }

    #[test]
    fn root_context_follows_config() {
        assert_eq!(CullingContext::root(&CullingConfig::DISABLED), CullingContext::DISABLED);
        assert!(window().should_consider_culling());
        let unknown = CullingContext::root(&CullingConfig {
            enabled: true,
            viewport: None,
        });
        assert!(unknown.enabled);
        assert!(!unknown.should_consider_culling());
    }

    #[test]
    fn child_outside_window_is_culled() {
        let ctx = window();
        assert!(ctx.is_culled(&node(ShadowNodeTraits::VIEW, Rect::new(0.0, 150.0, 10.0, 160.0))));
        assert!(!ctx.is_culled(&node(ShadowNodeTraits::VIEW, Rect::new(0.0, 90.0, 10.0, 160.0))));
        // Touching edges have no area in common.
        assert!(ctx.is_culled(&node(ShadowNodeTraits::VIEW, Rect::new(100.0, 0.0, 110.0, 10.0))));
    }

    #[test]
    fn overflow_and_uncullable_keep_child() {
        let ctx = window();
        let far = node(ShadowNodeTraits::VIEW, Rect::new(0.0, 150.0, 10.0, 160.0));
        let mut metrics = *far.layout_metrics();
        metrics.overflow_inset = Insets::new(0.0, 60.0, 0.0, 0.0);
        assert!(!ctx.is_culled(&far.with_layout_metrics(metrics)));
        let pinned = far.with_traits(ShadowNodeTraits::VIEW | ShadowNodeTraits::UNCULLABLE);
        assert!(!ctx.is_culled(&pinned));
    }

    #[test]
    fn disabled_context_never_culls() {
        let far = node(ShadowNodeTraits::VIEW, Rect::new(500.0, 500.0, 510.0, 510.0));
        assert!(!CullingContext::DISABLED.is_culled(&far));
    }

    #[test]
    fn window_moves_into_child_space() {
        let parent = node(ShadowNodeTraits::VIEW, Rect::new(30.0, 40.0, 60.0, 60.0));
        let ctx = window().adjusted_for(&parent);
        assert_eq!(ctx.frame, Rect::new(-30.0, -40.0, 70.0, 60.0));
    }

    #[test]
    fn scroll_view_window_follows_content_offset() {
        let scroll = node(
            ShadowNodeTraits::VIEW | ShadowNodeTraits::SCROLL_VIEW,
            Rect::new(0.0, 0.0, 100.0, 50.0),
        )
        .with_content_offset(Vec2::new(0.0, 200.0));
        let ctx = window().adjusted_for(&scroll);
        assert_eq!(ctx.frame, Rect::new(0.0, 200.0, 100.0, 250.0));
        assert!(ctx.transform.is_identity());
    }

    #[test]
    fn nested_root_resets_window() {
        let root = node(
            ShadowNodeTraits::VIEW | ShadowNodeTraits::ROOT_NODE_KIND,
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        let ctx = window().adjusted_for(&root);
        assert!(ctx.enabled);
        assert!(!ctx.should_consider_culling());
    }
}
