//! Subdivision engine and recursion driver.
//!
//! Owns one vertex buffer together with the session and generator set that
//! shape it. Recursion always walks cells from the back of a range to the
//! front, so splicing a cell never shifts the cells still to be visited.

use crate::core::{Error, Result};
use crate::generation::{Generator, GeneratorSelector, GenerationSession};
use crate::mesh::buffer::VertexBuffer;
use crate::mesh::subdivide::subdivide;
use crate::mesh::vertex::{Corners, VERTICES_PER_CELL};

pub struct SubdivisionEngine {
    buffer: VertexBuffer,
    session: GenerationSession,
    generators: Vec<Box<dyn Generator>>,
    selector: Box<dyn GeneratorSelector>,
}

impl SubdivisionEngine {
    pub fn new(
        buffer: VertexBuffer,
        session: GenerationSession,
        generators: Vec<Box<dyn Generator>>,
        selector: Box<dyn GeneratorSelector>,
    ) -> Self {
        Self {
            buffer,
            session,
            generators,
            selector,
        }
    }

    pub fn buffer(&self) -> &VertexBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut VertexBuffer {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> VertexBuffer {
        self.buffer
    }

    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GenerationSession {
        &mut self.session
    }

    pub fn generators(&self) -> &[Box<dyn Generator>] {
        &self.generators
    }

    pub fn selector(&self) -> &dyn GeneratorSelector {
        self.selector.as_ref()
    }

    /// Split the cell starting at `cell_index` into four children.
    ///
    /// Indices past the end are stale (the buffer moved on) and are skipped
    /// with a warning.
    pub fn recursively_generate(&mut self, cell_index: usize) -> Result<()> {
        if cell_index % VERTICES_PER_CELL != 0 {
            return Err(Error::MalformedIndex { index: cell_index });
        }

        let Some(cell) = self.buffer.cell(cell_index) else {
            log::warn!(
                "Skipping subdivision of cell {}: buffer holds {} vertices",
                cell_index,
                self.buffer.len()
            );
            return Ok(());
        };

        let mut split = subdivide(&cell, cell[0].depth + 1)?;

        let scale = self.session.params.noise_sample_scale;
        let noise = split.map(|v| self.session.noise.sample(v.x(), v.z(), scale, 0.0));

        if !self.generators.is_empty() {
            let corners = Corners::from_cell(&cell);
            let choice = self
                .selector
                .select(&corners, cell_index, self.generators.len(), &mut self.session);

            match self.generators.get(choice) {
                Some(generator) => generator.apply(&mut split, &noise, &mut self.session),
                None => log::warn!(
                    "Selector {} chose generator {} of {}; leaving cell {} undisplaced",
                    self.selector.name(),
                    choice,
                    self.generators.len(),
                    cell_index
                ),
            }
        }

        self.buffer.splice(cell_index, VERTICES_PER_CELL, split);
        Ok(())
    }

    /// Run `levels` passes over the cells in `start..start + len`, clamped to the buffer.
    ///
    /// Returns the grown length of the range (each pass quadruples it).
    pub fn recurse_range(&mut self, start: usize, len: usize, levels: u32) -> Result<usize> {
        let mut len = len.min(self.buffer.len().saturating_sub(start));
        for level in 0..levels {
            let before = self.buffer.len();
            for cell_index in (start..start + len).step_by(VERTICES_PER_CELL).rev() {
                self.recursively_generate(cell_index)?;
            }
            len += self.buffer.len() - before;
            log::debug!("Recursion pass {} grew range at {} to {} vertices", level + 1, start, len);
        }
        Ok(len)
    }
}

impl std::fmt::Debug for SubdivisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubdivisionEngine")
            .field("vertices", &self.buffer.len())
            .field("generators", &self.generators.len())
            .field("selector", &self.selector.name())
            .field("session", &self.session)
            .finish()
    }
}
