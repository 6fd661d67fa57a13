//! Built-in generator selectors.

use rand::Rng;

use super::generator::GeneratorSelector;
use super::registry::SelectorKind;
use super::session::GenerationSession;
use crate::mesh::vertex::Corners;

/// Picks a generator uniformly at random from the session RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSelector;

impl GeneratorSelector for UniformSelector {
    fn select(&self, _corners: &Corners, _cell_index: usize, generator_count: usize, session: &mut GenerationSession) -> usize {
        if generator_count <= 1 {
            return 0;
        }
        session.rng.gen_range(0..generator_count)
    }

    fn kind(&self) -> Option<SelectorKind> {
        Some(SelectorKind::Uniform)
    }
}

/// Uses generator 1 while the session is in digging mode, generator 0 otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiggingSelector;

impl GeneratorSelector for DiggingSelector {
    fn select(&self, _corners: &Corners, _cell_index: usize, generator_count: usize, session: &mut GenerationSession) -> usize {
        if session.digging && generator_count > 1 { 1 } else { 0 }
    }

    fn kind(&self) -> Option<SelectorKind> {
        Some(SelectorKind::Digging)
    }
}

/// Always picks the same generator, clamped to the list length.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedSelector(pub usize);

impl GeneratorSelector for FixedSelector {
    fn select(&self, _corners: &Corners, _cell_index: usize, generator_count: usize, _session: &mut GenerationSession) -> usize {
        self.0.min(generator_count.saturating_sub(1))
    }

    fn kind(&self) -> Option<SelectorKind> {
        Some(SelectorKind::Fixed(self.0))
    }
}
