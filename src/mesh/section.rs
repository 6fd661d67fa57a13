//! Quadrant-path addressing over the flat vertex buffer.
//!
//! A cell at level `L` stores its four children as consecutive runs in the
//! order `[top-left, top-right, bottom-left, bottom-right]`. Runs can differ in
//! length when recursion was applied unevenly, so each run is measured from
//! the depth of its own first vertex: `4^(depth - (L + 1)) * 6`.

use serde::{Deserialize, Serialize};

use super::vertex::{Vertex, VERTICES_PER_CELL};
use crate::core::{Error, Result};

/// Quadrant selector using mathematical quadrant numbering.
///
/// Codes 1 and 2 are swapped relative to storage order: code 1 (top-right)
/// is the second stored run, code 2 (top-left) the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Quadrant {
    TopRight = 1,
    TopLeft = 2,
    BottomLeft = 3,
    BottomRight = 4,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopRight,
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Parse a raw quadrant code (1-4).
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Quadrant::TopRight),
            2 => Ok(Quadrant::TopLeft),
            3 => Ok(Quadrant::BottomLeft),
            4 => Ok(Quadrant::BottomRight),
            other => Err(Error::InvalidQuadrant(other)),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Position of this quadrant's run among a cell's four stored children.
    pub fn run_index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }

    fn from_grid_bits(right: bool, down: bool) -> Self {
        match (right, down) {
            (false, false) => Quadrant::TopLeft,
            (true, false) => Quadrant::TopRight,
            (false, true) => Quadrant::BottomLeft,
            (true, true) => Quadrant::BottomRight,
        }
    }
}

impl TryFrom<u8> for Quadrant {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Quadrant::from_code(code)
    }
}

impl From<Quadrant> for u8 {
    fn from(quadrant: Quadrant) -> u8 {
        quadrant.code()
    }
}

/// Parse a path of raw quadrant codes.
pub fn parse_path(codes: &[u8]) -> Result<Vec<Quadrant>> {
    codes.iter().map(|&c| Quadrant::from_code(c)).collect()
}

/// A contiguous view into the vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    /// Absolute offset of the first vertex
    pub start: usize,
    /// Number of vertices in the section
    pub len: usize,
    /// Quadtree level of the section's root cell (0 = whole map)
    pub level: u32,
}

impl Section {
    pub fn new(start: usize, len: usize, level: u32) -> Self {
        Self { start, len, level }
    }

    /// Section covering an entire buffer of `len` vertices.
    pub fn full(len: usize) -> Self {
        Self { start: 0, len, level: 0 }
    }

    /// One past the last vertex, saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    pub fn cell_count(&self) -> usize {
        self.len / VERTICES_PER_CELL
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Walk `path` down from `base`, narrowing the section one level per step.
///
/// Fails with `SectionOutOfRange` if a step reaches an unsubdivided cell or
/// runs past the end of `base`.
pub fn locate(vertices: &[Vertex], path: &[Quadrant], base: Section) -> Result<Section> {
    let mut section = base;

    for (step, quadrant) in path.iter().enumerate() {
        if section.end() > vertices.len() {
            return Err(Error::SectionOutOfRange {
                step,
                reason: format!(
                    "section {}..{} exceeds buffer length {}",
                    section.start,
                    section.end(),
                    vertices.len()
                ),
            });
        }

        let local = &vertices[section.range()];
        let child_level = section.level + 1;

        // Relative run boundaries, measured sequentially.
        let mut bounds = [0usize; 5];
        for run in 0..4 {
            let first = bounds[run];
            let vertex = local.get(first).ok_or_else(|| Error::SectionOutOfRange {
                step,
                reason: format!("child run {} starts at {} beyond section length {}", run, first, local.len()),
            })?;

            if vertex.depth < child_level {
                return Err(Error::SectionOutOfRange {
                    step,
                    reason: format!(
                        "cell at {} has depth {} and was never subdivided to level {}",
                        section.start + first,
                        vertex.depth,
                        child_level
                    ),
                });
            }

            let run_len = 4usize
                .checked_pow(vertex.depth - child_level)
                .and_then(|cells| cells.checked_mul(VERTICES_PER_CELL))
                .ok_or_else(|| Error::SectionOutOfRange {
                    step,
                    reason: format!("subtree depth {} overflows", vertex.depth),
                })?;
            bounds[run + 1] = first + run_len;
        }

        if bounds[4] > local.len() {
            return Err(Error::SectionOutOfRange {
                step,
                reason: format!("children span {} vertices but section holds {}", bounds[4], local.len()),
            });
        }

        let run = quadrant.run_index();
        section = Section {
            start: section.start + bounds[run],
            len: bounds[run + 1] - bounds[run],
            level: child_level,
        };
    }

    Ok(section)
}

/// Quadrant path of a chunk in a row-major grid of `2^chunk_levels` chunks per side.
///
/// Rows run top to bottom (`-z` to `+z`), columns left to right.
pub fn chunk_path(chunk_index: usize, chunk_levels: u32) -> Result<Vec<Quadrant>> {
    let per_side = 1usize << chunk_levels;
    if chunk_index >= per_side * per_side {
        return Err(Error::SectionOutOfRange {
            step: 0,
            reason: format!("chunk {} outside a {}x{} grid", chunk_index, per_side, per_side),
        });
    }

    let column = chunk_index % per_side;
    let row = chunk_index / per_side;

    Ok((0..chunk_levels)
        .rev()
        .map(|bit| Quadrant::from_grid_bits((column >> bit) & 1 == 1, (row >> bit) & 1 == 1))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    /// Buffer of `cells` placeholder cells all at `depth`.
    fn uniform(depth: u32) -> Vec<Vertex> {
        let cells = 4usize.pow(depth);
        (0..cells * VERTICES_PER_CELL)
            .map(|i| Vertex::new(Vec3::new(i as f32, 0.0, 0.0), Vec2::ZERO, depth))
            .collect()
    }

    #[test]
    fn test_quadrant_codes() {
        assert_eq!(Quadrant::from_code(1).unwrap(), Quadrant::TopRight);
        assert_eq!(Quadrant::from_code(2).unwrap(), Quadrant::TopLeft);
        assert!(matches!(Quadrant::from_code(0), Err(Error::InvalidQuadrant(0))));
        assert!(matches!(Quadrant::from_code(5), Err(Error::InvalidQuadrant(5))));
    }

    #[test]
    fn test_codes_one_and_two_swap_runs() {
        assert_eq!(Quadrant::TopRight.run_index(), 1);
        assert_eq!(Quadrant::TopLeft.run_index(), 0);
        assert_eq!(Quadrant::BottomLeft.run_index(), 2);
        assert_eq!(Quadrant::BottomRight.run_index(), 3);
    }

    #[test]
    fn test_quadrant_serde_as_code() {
        let path = vec![Quadrant::TopLeft, Quadrant::BottomRight];
        assert_eq!(serde_json::to_string(&path).unwrap(), "[2,4]");
        let back: Vec<Quadrant> = serde_json::from_str("[1,3]").unwrap();
        assert_eq!(back, vec![Quadrant::TopRight, Quadrant::BottomLeft]);
        assert!(serde_json::from_str::<Vec<Quadrant>>("[7]").is_err());
    }

    #[test]
    fn test_empty_path_returns_base() {
        let vertices = uniform(2);
        let full = Section::full(vertices.len());
        assert_eq!(locate(&vertices, &[], full).unwrap(), full);
    }

    #[test]
    fn test_single_step_offsets() {
        let vertices = uniform(2);
        let full = Section::full(vertices.len());

        let tl = locate(&vertices, &[Quadrant::TopLeft], full).unwrap();
        let tr = locate(&vertices, &[Quadrant::TopRight], full).unwrap();
        let bl = locate(&vertices, &[Quadrant::BottomLeft], full).unwrap();
        let br = locate(&vertices, &[Quadrant::BottomRight], full).unwrap();

        assert_eq!(tl, Section::new(0, 24, 1));
        assert_eq!(tr, Section::new(24, 24, 1));
        assert_eq!(bl, Section::new(48, 24, 1));
        assert_eq!(br, Section::new(72, 24, 1));
    }

    #[test]
    fn test_composed_path_equals_direct_path() {
        let vertices = uniform(3);
        let full = Section::full(vertices.len());

        let first = locate(&vertices, &[Quadrant::TopLeft], full).unwrap();
        let composed = locate(&vertices, &[Quadrant::TopRight], first).unwrap();
        let direct = locate(&vertices, &[Quadrant::TopLeft, Quadrant::TopRight], full).unwrap();

        assert_eq!(composed, direct);
    }

    #[test]
    fn test_sections_shrink_with_path_length() {
        let vertices = uniform(3);
        let mut section = Section::full(vertices.len());
        for quadrant in [Quadrant::BottomRight, Quadrant::TopRight, Quadrant::BottomLeft] {
            let next = locate(&vertices, &[quadrant], section).unwrap();
            assert!(next.len < section.len);
            assert!(!next.is_empty());
            assert!(next.start >= section.start && next.end() <= section.end());
            section = next;
        }
        assert_eq!(section.len, VERTICES_PER_CELL);
    }

    #[test]
    fn test_uneven_recursion_measures_runs() {
        // Top-left child subdivided once more than its siblings.
        let mut vertices: Vec<Vertex> = uniform(2).into_iter().take(24).collect();
        for depth in [1, 1, 1] {
            vertices.extend((0..VERTICES_PER_CELL).map(|_| Vertex::new(Vec3::ZERO, Vec2::ZERO, depth)));
        }
        let full = Section::full(vertices.len());

        let tr = locate(&vertices, &[Quadrant::TopRight], full).unwrap();
        assert_eq!(tr, Section::new(24, 6, 1));
        let br = locate(&vertices, &[Quadrant::BottomRight], full).unwrap();
        assert_eq!(br, Section::new(36, 6, 1));
    }

    #[test]
    fn test_descending_into_leaf_fails() {
        let vertices = uniform(1);
        let full = Section::full(vertices.len());
        let result = locate(&vertices, &[Quadrant::TopLeft, Quadrant::TopLeft], full);
        assert!(matches!(result, Err(Error::SectionOutOfRange { step: 1, .. })));
    }

    #[test]
    fn test_chunk_path_corners() {
        assert_eq!(chunk_path(0, 1).unwrap(), vec![Quadrant::TopLeft]);
        assert_eq!(chunk_path(1, 1).unwrap(), vec![Quadrant::TopRight]);
        assert_eq!(chunk_path(2, 1).unwrap(), vec![Quadrant::BottomLeft]);
        assert_eq!(chunk_path(3, 1).unwrap(), vec![Quadrant::BottomRight]);

        // 4x4 grid: column 3, row 0 is top-right of top-right.
        assert_eq!(chunk_path(3, 2).unwrap(), vec![Quadrant::TopRight, Quadrant::TopRight]);
        // column 1, row 2 is bottom-left quadrant, then top-right within it.
        assert_eq!(chunk_path(9, 2).unwrap(), vec![Quadrant::BottomLeft, Quadrant::TopRight]);
        assert!(chunk_path(16, 2).is_err());
    }
}
