//! Classic random midpoint displacement of the cell centroid.

use rand::Rng;

use super::generator::Generator;
use super::registry::GeneratorKind;
use super::session::GenerationSession;
use crate::mesh::subdivide::CENTROID_SLOTS;
use crate::mesh::vertex::{Vertex, VERTICES_PER_SPLIT};

/// Moves the shared centroid up or down by at most `width / 2.4`.
///
/// Edge midpoints keep their interpolated heights, so neighbouring cells
/// still agree along shared edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct MidpointGenerator;

impl Generator for MidpointGenerator {
    fn apply(
        &self,
        vertices: &mut [Vertex; VERTICES_PER_SPLIT],
        _noise: &[f32; VERTICES_PER_SPLIT],
        session: &mut GenerationSession,
    ) {
        // Parent corners: top-left in slot 5, top-right in slot 8.
        let width = vertices[8].x() - vertices[5].x();
        let max_displacement = width.abs() / 1.2;
        if max_displacement <= 0.0 {
            return;
        }

        let offset = session.rng.gen_range(0.0..max_displacement) - max_displacement / 2.0;
        for slot in CENTROID_SLOTS {
            vertices[slot].position.y += offset;
        }
    }

    fn kind(&self) -> Option<GeneratorKind> {
        Some(GeneratorKind::Midpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::buffer::VertexBuffer;
    use crate::mesh::subdivide::{subdivide, is_corner_slot};

    #[test]
    fn test_only_centroid_moves_within_bounds() {
        let mut session = GenerationSession::new("2468", 12.0);
        let cell = VertexBuffer::new(12.0).cell(0).unwrap();
        let before = subdivide(&cell, 1).unwrap();

        for _ in 0..20 {
            let mut split = before;
            MidpointGenerator.apply(&mut split, &[0.0; VERTICES_PER_SPLIT], &mut session);

            let y = split[CENTROID_SLOTS[0]].position.y;
            assert!(y.abs() <= 12.0 / 2.4);
            for slot in CENTROID_SLOTS {
                assert_eq!(split[slot].position.y, y);
            }
            for slot in (0..VERTICES_PER_SPLIT).filter(|s| !CENTROID_SLOTS.contains(s)) {
                assert_eq!(split[slot].position, before[slot].position, "slot {}", slot);
                if is_corner_slot(slot) {
                    assert_eq!(split[slot].color, before[slot].color);
                }
            }
        }
    }
}
