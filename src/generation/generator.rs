//! Pluggable per-cell generators and the selectors that choose between them.

use super::registry::{GeneratorKind, SelectorKind};
use super::session::GenerationSession;
use crate::mesh::vertex::{Corners, Vertex, VERTICES_PER_SPLIT};

/// Shapes the 24 vertices of a freshly split cell.
///
/// Generators may change heights and colors. They must not move inherited
/// corners, and any offset they apply must be a function of the vertex's
/// `(x, z, depth)` so neighbouring cells agree on shared midpoints.
pub trait Generator: Send + Sync {
    /// `noise` holds one oracle sample per vertex, in vertex order.
    fn apply(
        &self,
        vertices: &mut [Vertex; VERTICES_PER_SPLIT],
        noise: &[f32; VERTICES_PER_SPLIT],
        session: &mut GenerationSession,
    );

    /// Registry tag used to rebuild this generator in another context.
    fn kind(&self) -> Option<GeneratorKind> {
        None
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Picks which generator shapes a given cell.
pub trait GeneratorSelector: Send + Sync {
    /// Returns an index into the generator list (`< generator_count`).
    fn select(
        &self,
        corners: &Corners,
        cell_index: usize,
        generator_count: usize,
        session: &mut GenerationSession,
    ) -> usize;

    fn kind(&self) -> Option<SelectorKind> {
        None
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
