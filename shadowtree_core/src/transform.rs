// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node transforms and the rectangle mapping culling needs.
//!
//! A node's transform is applied about the centre of the rectangle it
//! transforms (the default transform origin), so [`Transform3d::map_rect_about_center`]
//! is what culling uses; [`Transform3d::map_rect`] maps in absolute
//! coordinates.

use core::ops::Mul;

use kurbo::{Point, Rect, Vec2};

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* `[x, y, z, w]`. Points are treated as
/// column vectors, so `a * b` applies `b` first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.cols[3] = [x, y, z, 1.0];
        t
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.cols[0][0] = sx;
        t.cols[1][1] = sy;
        t.cols[2][2] = sz;
        t
    }

    /// Creates a rotation around the Z axis (radians).
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        let mut t = Self::IDENTITY;
        t.cols[0] = [c, s, 0.0, 0.0];
        t.cols[1] = [-s, c, 0.0, 0.0];
        t
    }

    /// Creates a perspective transform with the given viewer distance.
    ///
    /// Points with larger `z` move away from the viewer and shrink.
    #[must_use]
    pub const fn from_perspective(distance: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.cols[2][3] = -1.0 / distance;
        t
    }

    /// Returns `true` if this is exactly the identity.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Is every component [finite](f64::is_finite)?
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Maps a point in the `z = 0` plane, dividing by `w`.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w == 0.0 || w == 1.0 {
            Point::new(x, y)
        } else {
            Point::new(x / w, y / w)
        }
    }

    /// Maps a rectangle and returns the bounding box of its mapped corners.
    #[must_use]
    pub fn map_rect(&self, rect: Rect) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
        ];
        let first = self.map_point(corners[0]);
        corners[1..]
            .iter()
            .map(|&p| self.map_point(p))
            .fold(Rect::from_points(first, first), |acc, p| {
                acc.union_pt(p)
            })
    }

    /// Maps a rectangle about its own centre.
    ///
    /// The rectangle is moved so its centre is at the origin, mapped, and
    /// moved back. This is how a node's transform applies to its own frame.
    #[must_use]
    pub fn map_rect_about_center(&self, rect: Rect) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let center: Vec2 = rect.center().to_vec2();
        self.map_rect(rect - center) + center
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}
