//! Cell subdivision: one cell becomes four, sharing a centroid and edge midpoints.

use glam::Vec3;

use super::vertex::{Corners, Vertex, CELL_UVS, VERTICES_PER_CELL, VERTICES_PER_SPLIT};
use crate::core::{Error, Result};

/// Interpolation mode for the interior point of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interpolation {
    /// Equal weights: the arithmetic mean of the four corners.
    #[default]
    Centroid,
    /// Per-corner weights in `[bottom-right, bottom-left, top-right, top-left]` order.
    Weighted([f32; 4]),
}

/// Bilinear interpolation of the four corner positions.
///
/// Only the centroid case is implemented; weighted interpolation returns
/// `Error::UnsupportedInterpolation`.
pub fn bilinear_interpolation(corners: &Corners, mode: Interpolation) -> Result<Vec3> {
    match mode {
        Interpolation::Centroid => {
            let sum = corners
                .as_array()
                .iter()
                .fold(Vec3::ZERO, |acc, v| acc + v.position);
            Ok(sum / 4.0)
        }
        Interpolation::Weighted(_) => Err(Error::UnsupportedInterpolation),
    }
}

/// Slots in the 24-vertex split that carry an original corner verbatim.
pub const CORNER_SLOTS: [usize; 6] = [5, 8, 9, 13, 16, 18];

/// Slots in the 24-vertex split that hold the shared centroid.
pub const CENTROID_SLOTS: [usize; 6] = [0, 7, 10, 14, 15, 23];

/// Whether `slot` of a 24-vertex split is an inherited corner.
pub fn is_corner_slot(slot: usize) -> bool {
    CORNER_SLOTS.contains(&slot)
}

/// Split a 6-vertex cell into the 24 vertices of its four children.
///
/// Children are ordered top-left, top-right, bottom-left, bottom-right. Each
/// shared point is computed once, so siblings agree on it bit-for-bit.
pub fn subdivide(cell: &[Vertex; VERTICES_PER_CELL], depth: u32) -> Result<[Vertex; VERTICES_PER_SPLIT]> {
    let corners = Corners::from_cell(cell);
    let Corners { top_left: tl, top_right: tr, bottom_left: bl, bottom_right: br } = corners;

    let c = bilinear_interpolation(&corners, Interpolation::Centroid)?;

    let left = Vec3::new(tl.x(), (tl.height() + bl.height()) / 2.0, c.z);
    let top = Vec3::new(c.x, (tl.height() + tr.height()) / 2.0, tl.z());
    let right = Vec3::new(tr.x(), (tr.height() + br.height()) / 2.0, c.z);
    let bottom = Vec3::new(c.x, (bl.height() + br.height()) / 2.0, bl.z());

    let fresh = |position: Vec3| Vertex::new(position, glam::Vec2::ZERO, depth);
    let (cv, lv, tv, rv, bv) = (fresh(c), fresh(left), fresh(top), fresh(right), fresh(bottom));

    #[rustfmt::skip]
    let mut out = [
        // top-left child
        cv, lv, tv,   tv, lv, tl,
        // top-right child
        rv, cv, tr,   tr, cv, tv,
        // bottom-left child
        bv, bl, cv,   cv, bl, lv,
        // bottom-right child
        br, bv, rv,   rv, bv, cv,
    ];

    for (i, vertex) in out.iter_mut().enumerate() {
        vertex.normal = Vec3::Y;
        vertex.uv = CELL_UVS[i % VERTICES_PER_CELL];
        vertex.depth = depth;
    }

    Ok(out)
}
