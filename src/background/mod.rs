//! Background offload of recursion passes.
//!
//! A pass is shipped to a worker as a self-contained `WorkerRequest`: copied
//! vertices plus registry tags for the generators and selector, and the
//! colorer columns already resolved around the section. The worker rebuilds
//! its own session (noise oracle included) from the seed, runs the pass and
//! sends back the grown vertex run with the columns it resolved.

pub mod local;
pub mod protocol;

use std::future::Future;
use std::pin::Pin;

pub use local::LocalWorker;
pub use protocol::{RecurseSectionRequest, SectionPayload, WorkerRequest, WorkerResponse};

use crate::core::Result;
use crate::generation::biome::Palette;
use crate::generation::registry::build_generators;
use crate::generation::{CollapseState, GenerationSession, ResolvedColumn};
use crate::mesh::buffer::VertexBuffer;
use crate::mesh::vertex::Vertex;
use crate::terrain::engine::SubdivisionEngine;

/// Future returned by `WorkerEndpoint::dispatch`.
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<WorkerResponse>> + Send + 'a>>;

/// An execution context that can run offloaded passes.
pub trait WorkerEndpoint: Send + Sync {
    fn dispatch(&self, request: WorkerRequest) -> DispatchFuture<'_>;

    /// Human-readable endpoint description for logs
    fn describe(&self) -> String;
}

/// Execute a request in the current context.
pub fn handle_request(request: WorkerRequest) -> WorkerResponse {
    match request {
        WorkerRequest::RecurseSection(request) => {
            let index = request.section.absolute_index;
            match run_recurse_section(request) {
                Ok((vertices, columns)) => WorkerResponse::Ok { vertices, columns },
                Err(e) => {
                    log::error!("Background recursion at {} failed: {}", index, e);
                    WorkerResponse::error(e.to_string())
                }
            }
        }
    }
}

/// Run the passes of a `recurseSection` request.
///
/// Returns the grown vertices and every colorer column resolved by the pass.
pub fn run_recurse_section(request: RecurseSectionRequest) -> Result<(Vec<Vertex>, Vec<ResolvedColumn>)> {
    let RecurseSectionRequest {
        seed,
        colors,
        water_level,
        section,
        generator_selector,
        generators,
        generation_params,
        levels,
        size,
        noise_amplitude,
        digging,
        columns,
    } = request;

    let mut session = GenerationSession::new(&seed, size)
        .with_params(generation_params)
        .with_palette(Palette::from_overrides(colors.as_ref()))
        .with_water_level(water_level)
        .with_noise_amplitude(noise_amplitude)
        .with_rng_stream(section.absolute_index as u64);
    session.digging = digging;
    if !columns.is_empty() {
        session.state_mut::<CollapseState>().merge(columns);
    }

    let buffer = VertexBuffer::from_vertices(section.vertices)?;
    let len = buffer.len();
    let mut engine = SubdivisionEngine::new(buffer, session, build_generators(&generators), generator_selector.build());
    engine.recurse_range(0, len, levels)?;

    let columns = engine
        .session()
        .state::<CollapseState>()
        .map(CollapseState::resolved_columns)
        .unwrap_or_default();
    Ok((engine.into_buffer().into_vertices(), columns))
}
