//! Terrain facade: one generated map with its buffer, session and overlay.

pub mod engine;
pub mod registry;

pub use engine::SubdivisionEngine;
pub use registry::{TerrainId, TerrainRegistry};

use std::sync::Arc;

use glam::{Vec2, Vec3Swizzles};
use rayon::prelude::*;

use crate::background::{RecurseSectionRequest, SectionPayload, WorkerEndpoint, WorkerRequest, WorkerResponse};
use crate::core::{Error, Result};
use crate::generation::registry::{build_generators, generator_kinds, selector_kind};
use crate::generation::{CollapseState, Generator, GeneratorSelector, GenerationSession, ResolvedColumn, TerrainConfig};
use crate::mesh::buffer::VertexBuffer;
use crate::mesh::export::{export, export_transformed, GeometryBuffers};
use crate::mesh::overlay::{TransformHook, TransformOverlay};
use crate::mesh::section::{chunk_path, locate, Quadrant, Section};
use crate::mesh::vertex::{Vertex, VERTICES_PER_CELL};

/// Builder for terrains with custom generators, selectors or a worker endpoint.
pub struct TerrainBuilder {
    config: TerrainConfig,
    generators: Option<Vec<Box<dyn Generator>>>,
    selector: Option<Box<dyn GeneratorSelector>>,
    worker: Option<Arc<dyn WorkerEndpoint>>,
}

impl TerrainBuilder {
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            generators: None,
            selector: None,
            worker: None,
        }
    }

    /// Replace the configured generator list.
    pub fn generators(mut self, generators: Vec<Box<dyn Generator>>) -> Self {
        self.generators = Some(generators);
        self
    }

    pub fn selector(mut self, selector: Box<dyn GeneratorSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn worker(mut self, worker: Arc<dyn WorkerEndpoint>) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn build(self) -> Terrain {
        let seed = self.config.resolve_seed();
        let session = self.config.session(&seed);
        let generators = self
            .generators
            .unwrap_or_else(|| build_generators(&self.config.generators));
        let selector = self.selector.unwrap_or_else(|| self.config.selector.build());

        log::info!(
            "Created terrain: size {}, seed {}, {} generator(s)",
            self.config.size,
            seed,
            generators.len()
        );

        Terrain {
            engine: SubdivisionEngine::new(VertexBuffer::new(self.config.size), session, generators, selector),
            config: self.config,
            seed,
            overlay: TransformOverlay::new(),
            worker: self.worker,
        }
    }
}

/// A procedurally subdivided terrain mesh.
pub struct Terrain {
    config: TerrainConfig,
    seed: String,
    engine: SubdivisionEngine,
    overlay: TransformOverlay,
    worker: Option<Arc<dyn WorkerEndpoint>>,
}

impl Terrain {
    /// Terrain with the configured generators and no background worker.
    pub fn new(config: TerrainConfig) -> Self {
        TerrainBuilder::new(config).build()
    }

    pub fn builder(config: TerrainConfig) -> TerrainBuilder {
        TerrainBuilder::new(config)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn buffer(&self) -> &VertexBuffer {
        self.engine.buffer()
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.engine.buffer().vertices()
    }

    pub fn len(&self) -> usize {
        self.engine.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.buffer().is_empty()
    }

    pub fn session(&self) -> &GenerationSession {
        self.engine.session()
    }

    pub fn session_mut(&mut self) -> &mut GenerationSession {
        self.engine.session_mut()
    }

    pub fn overlay(&self) -> &TransformOverlay {
        &self.overlay
    }

    pub fn set_digging(&mut self, digging: bool) {
        self.engine.session_mut().digging = digging;
    }

    /// Section covering the whole buffer.
    pub fn full_section(&self) -> Section {
        Section::full(self.len())
    }

    /// Subdivide a single cell. See `SubdivisionEngine::recursively_generate`.
    pub fn recursively_generate(&mut self, cell_index: usize) -> Result<()> {
        self.engine.recursively_generate(cell_index)?;
        self.invalidate_overlay();
        Ok(())
    }

    /// Run `levels` subdivision passes over the whole map.
    pub fn recurse_full_map(&mut self, levels: u32) -> Result<()> {
        let section = self.full_section();
        self.recurse_section(&section, levels)?;
        Ok(())
    }

    /// Run `levels` subdivision passes over `section`, returning the grown section.
    pub fn recurse_section(&mut self, section: &Section, levels: u32) -> Result<Section> {
        let Some(section) = self.clamp_section(section) else {
            return Ok(*section);
        };

        let len = self.engine.recurse_range(section.start, section.len, levels)?;
        self.invalidate_overlay();
        Ok(Section { len, ..section })
    }

    /// Run the passes for `section` on the configured worker and splice the result back.
    ///
    /// Holding `&mut self` across the await keeps background passes serialized.
    pub async fn recurse_section_in_background(&mut self, section: &Section, levels: u32) -> Result<Section> {
        let worker = self
            .worker
            .clone()
            .ok_or_else(|| Error::WorkerUnavailable("no worker endpoint configured".to_string()))?;

        let Some(section) = self.clamp_section(section) else {
            return Ok(*section);
        };
        if section.start % VERTICES_PER_CELL != 0 {
            return Err(Error::MalformedIndex { index: section.start });
        }

        let request = self.background_request(&section, levels)?;
        log::debug!(
            "Dispatching {} vertices at {} to {}",
            section.len,
            section.start,
            worker.describe()
        );

        match worker.dispatch(request).await? {
            WorkerResponse::Ok { vertices, columns } => {
                if vertices.len() % VERTICES_PER_CELL != 0 {
                    return Err(Error::Worker(format!(
                        "worker returned {} vertices, not a whole number of cells",
                        vertices.len()
                    )));
                }
                let len = vertices.len();
                self.engine.buffer_mut().splice(section.start, section.len, vertices);
                if !columns.is_empty() {
                    self.engine.session_mut().state_mut::<CollapseState>().merge(columns);
                }
                self.invalidate_overlay();
                Ok(Section { len, ..section })
            }
            WorkerResponse::Error { message } => Err(Error::Worker(message)),
        }
    }

    fn background_request(&self, section: &Section, levels: u32) -> Result<WorkerRequest> {
        let session = self.engine.session();
        let vertices = self.engine.buffer().slice(section.range());
        let columns = session
            .state::<CollapseState>()
            .map(|state| columns_around(state, vertices))
            .unwrap_or_default();

        Ok(WorkerRequest::RecurseSection(RecurseSectionRequest {
            seed: self.seed.clone(),
            colors: self.config.colors.clone(),
            water_level: session.water_level,
            section: SectionPayload {
                vertices: vertices.to_vec(),
                absolute_index: section.start,
            },
            generator_selector: selector_kind(self.engine.selector())?,
            generators: generator_kinds(self.engine.generators())?,
            generation_params: session.params,
            levels,
            size: self.config.size,
            noise_amplitude: self.config.noise_amplitude,
            digging: session.digging,
            columns,
        }))
    }

    /// Section still within the buffer, or `None` (with a warning) if it is stale.
    fn clamp_section(&self, section: &Section) -> Option<Section> {
        let len = self.len();
        if section.start >= len {
            log::warn!("Ignoring section at {}: buffer holds {} vertices", section.start, len);
            return None;
        }
        if section.end() > len {
            log::warn!("Clamping section {}..{} to buffer length {}", section.start, section.end(), len);
            return Some(Section { len: len - section.start, ..*section });
        }
        Some(*section)
    }

    // Overlay keys are absolute indices, which subdivision shifts.
    fn invalidate_overlay(&mut self) {
        if !self.overlay.is_empty() {
            log::debug!("Dropping {} overlay positions after subdivision", self.overlay.len());
            self.overlay.clear();
        }
    }

    /// Narrow `base` (or the whole map) by a quadrant path.
    pub fn get_section(&self, path: &[Quadrant], base: Option<&Section>) -> Result<Section> {
        let base = base.copied().unwrap_or_else(|| self.full_section());
        locate(self.vertices(), path, base)
    }

    /// Export a section, optionally through a transform hook.
    pub fn export_geometry(&mut self, section: &Section, hook: Option<&dyn TransformHook>) -> GeometryBuffers {
        let vertices = self.engine.buffer().slice(section.range());
        match hook {
            Some(hook) => export_transformed(vertices, section.start, &mut self.overlay, hook),
            None => export(vertices, section.start, &self.overlay),
        }
    }

    /// Export the map as a row-major grid of `2^chunk_levels` chunks per side.
    pub fn export_chunks(&self, chunk_levels: u32) -> Result<Vec<GeometryBuffers>> {
        let depth = self.buffer().depth();
        if chunk_levels > depth {
            return Err(Error::SectionOutOfRange {
                step: depth as usize,
                reason: format!("{} chunk levels requested but map is {} levels deep", chunk_levels, depth),
            });
        }
        let chunk_count = 1usize << (2 * chunk_levels);
        let sections = (0..chunk_count)
            .map(|i| self.get_section(&chunk_path(i, chunk_levels)?, None))
            .collect::<Result<Vec<_>>>()?;

        let buffer = self.engine.buffer();
        let overlay = &self.overlay;
        Ok(sections
            .par_iter()
            .map(|section| export(buffer.slice(section.range()), section.start, overlay))
            .collect())
    }

    /// Snap a world position to the nearest vertex column of the finest grid.
    pub fn nearest_grid_point(&self, x: f32, z: f32) -> Vec2 {
        let depth = self.vertices().iter().map(|v| v.depth).max().unwrap_or(0);
        let half = self.config.size / 2.0;
        let spacing = self.config.size / (1u64 << depth.min(62)) as f32;

        let snap = |v: f32| (((v + half) / spacing).round() * spacing - half).clamp(-half, half);
        Vec2::new(snap(x), snap(z))
    }
}

impl std::fmt::Debug for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terrain")
            .field("seed", &self.seed)
            .field("size", &self.config.size)
            .field("engine", &self.engine)
            .field("overlay", &self.overlay.len())
            .field("worker", &self.worker.as_ref().map(|w| w.describe()))
            .finish()
    }
}

/// Resolved columns a pass over `vertices` can read: the section footprint
/// widened by its largest cell.
fn columns_around(state: &CollapseState, vertices: &[Vertex]) -> Vec<ResolvedColumn> {
    let Some(first) = vertices.first() else {
        return Vec::new();
    };
    let (mut min, mut max) = (first.position.xz(), first.position.xz());
    let mut margin = 0.0f32;
    for cell in vertices.chunks_exact(VERTICES_PER_CELL) {
        margin = margin.max((cell[2].x() - cell[5].x()).abs());
        for v in cell {
            min = min.min(v.position.xz());
            max = max.max(v.position.xz());
        }
    }
    state.resolved_within(min - Vec2::splat(margin), max + Vec2::splat(margin))
}
