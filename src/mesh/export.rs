//! Flat geometry arrays for a renderer.

use glam::Vec3;

use super::overlay::{TransformHook, TransformOverlay};
use super::vertex::Vertex;

/// Color exported for vertices that were never colored.
pub const DEFAULT_COLOR: Vec3 = Vec3::ONE;

/// Interleaved-by-attribute vertex data, ready for GPU upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffers {
    /// xyz per vertex
    pub positions: Vec<f32>,
    /// xyz per vertex
    pub normals: Vec<f32>,
    /// uv per vertex
    pub uvs: Vec<f32>,
    /// rgb per vertex
    pub colors: Vec<f32>,
}

impl GeometryBuffers {
    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            uvs: Vec::with_capacity(vertex_count * 2),
            colors: Vec::with_capacity(vertex_count * 3),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push(&mut self, vertex: &Vertex, position: Vec3) {
        self.positions.extend_from_slice(&position.to_array());
        self.normals.extend_from_slice(&vertex.normal.to_array());
        self.uvs.extend_from_slice(&vertex.uv.to_array());
        self.colors
            .extend_from_slice(&vertex.color.unwrap_or(DEFAULT_COLOR).to_array());
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// Export `vertices` (starting at absolute index `start`) with overlay positions applied.
pub fn export(vertices: &[Vertex], start: usize, overlay: &TransformOverlay) -> GeometryBuffers {
    let mut buffers = GeometryBuffers::with_capacity(vertices.len());
    for (i, vertex) in vertices.iter().enumerate() {
        buffers.push(vertex, overlay.resolve(start + i, vertex.position));
    }
    buffers
}

/// Export through a transform hook, recording every transformed position in the overlay.
pub fn export_transformed(
    vertices: &[Vertex],
    start: usize,
    overlay: &mut TransformOverlay,
    hook: &dyn TransformHook,
) -> GeometryBuffers {
    let mut buffers = GeometryBuffers::with_capacity(vertices.len());
    let mut transformed = 0usize;

    for (i, vertex) in vertices.iter().enumerate() {
        let index = start + i;
        let mut position = overlay.resolve(index, vertex.position);

        if let Some(transformation) = hook.filter(position) {
            position = hook.apply(position, transformation);
            overlay.set(index, position);
            transformed += 1;
        }

        buffers.push(vertex, position);
    }

    if transformed > 0 {
        log::debug!("Transformed {} of {} exported vertices", transformed, vertices.len());
    }
    buffers
}
