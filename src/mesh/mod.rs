//! Terrain mesh storage: vertex buffer, quadrant addressing, subdivision and export.

pub mod buffer;
pub mod export;
pub mod overlay;
pub mod section;
pub mod subdivide;
pub mod vertex;

pub use buffer::VertexBuffer;
pub use export::GeometryBuffers;
pub use overlay::{PlateauTransform, Terraform, TerraformEdit, TransformHook, TransformOverlay};
pub use section::{chunk_path, Quadrant, Section};
pub use subdivide::{bilinear_interpolation, subdivide, Interpolation};
pub use vertex::{Corners, Vertex, VERTICES_PER_CELL, VERTICES_PER_SPLIT};
