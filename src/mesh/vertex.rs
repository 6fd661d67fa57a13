//! Vertex record and cell slot conventions

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Vertices per terrain cell (two triangles, corners duplicated per triangle)
pub const VERTICES_PER_CELL: usize = 6;

/// Vertices produced by subdividing one cell (four children)
pub const VERTICES_PER_SPLIT: usize = VERTICES_PER_CELL * 4;

/// UV pattern repeated for every cell, matching the slot order below.
pub const CELL_UVS: [Vec2; VERTICES_PER_CELL] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
];

/// Cell slot layout.
///
/// `[0]` bottom-right, `[1]` bottom-left, `[2]` top-right, `[3]` top-right (dup),
/// `[4]` bottom-left (dup), `[5]` top-left. Bottom is `+z`, right is `+x`.
pub mod slot {
    pub const BOTTOM_RIGHT: usize = 0;
    pub const BOTTOM_LEFT: usize = 1;
    pub const TOP_RIGHT: usize = 2;
    pub const TOP_RIGHT_DUP: usize = 3;
    pub const BOTTOM_LEFT_DUP: usize = 4;
    pub const TOP_LEFT: usize = 5;
}

/// A single mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec3>,
    /// Number of subdivision passes that produced this vertex's cell
    pub depth: u32,
}

impl Vertex {
    /// Upward-facing vertex at `position` with no color.
    pub fn new(position: Vec3, uv: Vec2, depth: u32) -> Self {
        Self {
            position,
            normal: Vec3::Y,
            uv,
            color: None,
            depth,
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn height(&self) -> f32 {
        self.position.y
    }

    pub fn z(&self) -> f32 {
        self.position.z
    }
}

/// The four logical corners of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
    pub top_left: Vertex,
    pub top_right: Vertex,
    pub bottom_left: Vertex,
    pub bottom_right: Vertex,
}

impl Corners {
    /// Extract corners from a 6-vertex cell, skipping the duplicated slots.
    pub fn from_cell(cell: &[Vertex; VERTICES_PER_CELL]) -> Self {
        Self {
            top_left: cell[slot::TOP_LEFT],
            top_right: cell[slot::TOP_RIGHT],
            bottom_left: cell[slot::BOTTOM_LEFT],
            bottom_right: cell[slot::BOTTOM_RIGHT],
        }
    }

    /// Horizontal edge length of the cell.
    pub fn width(&self) -> f32 {
        self.top_right.x() - self.top_left.x()
    }

    pub fn as_array(&self) -> [&Vertex; 4] {
        [&self.bottom_right, &self.bottom_left, &self.top_right, &self.top_left]
    }
}
