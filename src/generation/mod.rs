//! Terrain generation: seed-derived parameters, noise, and per-cell generators.

pub mod biome;
pub mod collapse;
pub mod config;
pub mod displacement;
pub mod generator;
pub mod midpoint;
pub mod noise;
pub mod params;
pub mod registry;
pub mod selector;
pub mod session;

pub use biome::{Biome, BiomeSet, Palette};
pub use collapse::{CollapseColorer, CollapseState, ResolvedColumn};
pub use config::TerrainConfig;
pub use displacement::{DisplacementGenerator, LandscapeGenerator};
pub use generator::{Generator, GeneratorSelector};
pub use midpoint::MidpointGenerator;
pub use noise::NoiseOracle;
pub use params::GenerationParams;
pub use registry::{GeneratorKind, SelectorKind};
pub use selector::{DiggingSelector, FixedSelector, UniformSelector};
pub use session::GenerationSession;
