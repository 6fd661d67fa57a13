//! Height displacement: continent-scale landmass plus fractal detail.

use super::collapse::CollapseColorer;
use super::generator::Generator;
use super::registry::GeneratorKind;
use super::session::GenerationSession;
use crate::mesh::subdivide::is_corner_slot;
use crate::mesh::vertex::{Vertex, VERTICES_PER_SPLIT};

/// Falloff exponent for displacement per recursion depth.
const DEPTH_FALLOFF: f32 = 0.7;

/// Arctangent soft clamp: `clamp(atan(v) / slope, -1, 1)`.
pub fn spline(value: f32, slope: f32) -> f32 {
    (value.atan() / slope).clamp(-1.0, 1.0)
}

/// Displacement amplitude at a recursion depth.
pub fn amplitude(noise_amplitude: f32, depth: u32) -> f32 {
    noise_amplitude / ((depth + 1) as f32).powf(DEPTH_FALLOFF)
}

/// Vertical offset for a new vertex at `(x, z)` created at `depth`.
///
/// Depends only on position, depth and the session's seed-derived inputs.
pub fn height_offset(session: &GenerationSession, x: f32, z: f32, depth: u32, sample: f32) -> f32 {
    let p = &session.params;
    let noise = &session.noise;

    let landmass = spline(noise.sample(x, z, p.island_size, 100.0), p.landmass_slope) * p.plateau_factor;
    let detail = 0.2 * noise.sample(x, z, p.smoothness, 100.0) * noise.sample(x, z, p.smoothness * 5.0, 300.0) + sample;

    (landmass + detail) * amplitude(session.noise_amplitude, depth)
}

/// Displaces every non-corner vertex by `height_offset`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplacementGenerator;

impl Generator for DisplacementGenerator {
    fn apply(
        &self,
        vertices: &mut [Vertex; VERTICES_PER_SPLIT],
        noise: &[f32; VERTICES_PER_SPLIT],
        session: &mut GenerationSession,
    ) {
        for (slot, vertex) in vertices.iter_mut().enumerate() {
            if is_corner_slot(slot) {
                continue;
            }
            vertex.position.y += height_offset(session, vertex.x(), vertex.z(), vertex.depth, noise[slot]);
        }
    }

    fn kind(&self) -> Option<GeneratorKind> {
        Some(GeneratorKind::Displacement)
    }
}

/// Displacement followed by biome coloring; the default generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct LandscapeGenerator;

impl Generator for LandscapeGenerator {
    fn apply(
        &self,
        vertices: &mut [Vertex; VERTICES_PER_SPLIT],
        noise: &[f32; VERTICES_PER_SPLIT],
        session: &mut GenerationSession,
    ) {
        DisplacementGenerator.apply(vertices, noise, session);
        CollapseColorer.apply(vertices, noise, session);
    }

    fn kind(&self) -> Option<GeneratorKind> {
        Some(GeneratorKind::Landscape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::buffer::VertexBuffer;
    use crate::mesh::subdivide::{subdivide, CENTROID_SLOTS, CORNER_SLOTS};

    #[test]
    fn test_spline_clamps() {
        assert_eq!(spline(0.0, 25.0), 0.0);
        assert_eq!(spline(1e6, 0.5), 1.0);
        assert_eq!(spline(-1e6, 0.5), -1.0);
        assert!(spline(1.0, 50.0) > 0.0);
    }

    #[test]
    fn test_amplitude_falls_off_with_depth() {
        assert_eq!(amplitude(2.0, 0), 2.0);
        let mut previous = amplitude(2.0, 0);
        for depth in 1..8 {
            let a = amplitude(2.0, depth);
            assert!(a < previous);
            previous = a;
        }
    }

    #[test]
    fn test_corners_untouched_and_centroids_agree() {
        let mut session = GenerationSession::new("86420", 20.0);
        let cell = VertexBuffer::new(20.0).cell(0).unwrap();
        let mut split = subdivide(&cell, 1).unwrap();
        let before = split;
        let noise = [0.3; VERTICES_PER_SPLIT];

        DisplacementGenerator.apply(&mut split, &noise, &mut session);

        for slot in CORNER_SLOTS {
            assert_eq!(split[slot].position, before[slot].position);
        }
        let centroid = split[CENTROID_SLOTS[0]].position;
        for slot in CENTROID_SLOTS {
            assert_eq!(split[slot].position.to_array(), centroid.to_array());
        }
        assert_ne!(centroid.y, before[0].position.y);
    }

    #[test]
    fn test_offset_is_a_function_of_position() {
        let session = GenerationSession::new("86420", 20.0);
        let a = height_offset(&session, 1.25, -3.5, 2, 0.1);
        let b = height_offset(&session, 1.25, -3.5, 2, 0.1);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_landscape_colors_and_displaces() {
        let mut session = GenerationSession::new("86420", 20.0);
        let cell = VertexBuffer::new(20.0).cell(0).unwrap();
        let mut split = subdivide(&cell, 1).unwrap();

        LandscapeGenerator.apply(&mut split, &[0.5; VERTICES_PER_SPLIT], &mut session);
        assert!(split.iter().all(|v| v.color.is_some()));
    }
}
