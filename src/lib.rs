//! Quadterra - quadtree subdivision terrain with pluggable height and biome generators

pub mod core;
pub mod mesh;
pub mod generation;
pub mod terrain;
pub mod background;

pub use crate::core::{Error, Result};
pub use generation::TerrainConfig;
pub use terrain::{Terrain, TerrainBuilder, TerrainId, TerrainRegistry};
