//! Flat vertex buffer encoding a quadtree of terrain cells.
//!
//! Cells are stored depth-first: subdividing a cell replaces its 6 vertices
//! with the 24 vertices of its four children, in place. The buffer never
//! shrinks and is only reordered through such replacements.

use std::ops::Range;

use glam::Vec3;

use super::vertex::{Vertex, CELL_UVS, VERTICES_PER_CELL};
use crate::core::{Error, Result};

/// Canonical vertex storage for one terrain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexBuffer {
    vertices: Vec<Vertex>,
}

impl VertexBuffer {
    /// Create the initial single-cell buffer spanning `[-size/2, size/2]` on x/z.
    pub fn new(size: f32) -> Self {
        let offset = size / 2.0;
        let corners = [
            Vec3::new(1.0, 0.0, 1.0),   // bottom right
            Vec3::new(-1.0, 0.0, 1.0),  // bottom left
            Vec3::new(1.0, 0.0, -1.0),  // top right
            Vec3::new(1.0, 0.0, -1.0),  // top right
            Vec3::new(-1.0, 0.0, 1.0),  // bottom left
            Vec3::new(-1.0, 0.0, -1.0), // top left
        ];

        let vertices = corners
            .iter()
            .zip(CELL_UVS.iter())
            .map(|(corner, uv)| Vertex::new(*corner * offset, *uv, 0))
            .collect();

        Self { vertices }
    }

    /// Wrap existing vertices. Fails if the length is not a whole number of cells.
    pub fn from_vertices(vertices: Vec<Vertex>) -> Result<Self> {
        if vertices.len() % VERTICES_PER_CELL != 0 {
            return Err(Error::PartialCell { len: vertices.len() });
        }
        Ok(Self { vertices })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of cells currently stored
    pub fn cell_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_CELL
    }

    pub fn get(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Borrow a range of vertices, clamped to the buffer end.
    pub fn slice(&self, range: Range<usize>) -> &[Vertex] {
        let end = range.end.min(self.vertices.len());
        let start = range.start.min(end);
        &self.vertices[start..end]
    }

    /// Copy out the cell starting at `index`, if it exists.
    pub fn cell(&self, index: usize) -> Option<[Vertex; VERTICES_PER_CELL]> {
        let end = index.checked_add(VERTICES_PER_CELL)?;
        let cell = self.vertices.get(index..end)?;
        cell.try_into().ok()
    }

    /// Replace `removed` vertices starting at `start` with `replacement`.
    ///
    /// Both lengths must keep the buffer cell-aligned.
    pub fn splice(&mut self, start: usize, removed: usize, replacement: impl IntoIterator<Item = Vertex>) {
        let end = start.saturating_add(removed).min(self.vertices.len());
        self.vertices.splice(start..end, replacement);
        debug_assert_eq!(self.vertices.len() % VERTICES_PER_CELL, 0);
    }

    /// Recursion depth of the shallowest leaf (the first vertex's depth for uniform maps).
    pub fn depth(&self) -> u32 {
        self.vertices.first().map(|v| v.depth).unwrap_or(0)
    }

    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}
