//! Per-terrain generation context shared by every generator call.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::biome::Palette;
use super::noise::{seed_hash, NoiseOracle};
use super::params::GenerationParams;

/// Everything a generator may read or mutate besides the vertices themselves.
pub struct GenerationSession {
    pub params: GenerationParams,
    pub noise: NoiseOracle,
    pub rng: ChaCha8Rng,
    pub palette: Palette,
    /// Columns below this height are treated as underwater
    pub water_level: Option<f32>,
    /// Edge length of the whole map
    pub size: f32,
    /// Base vertical displacement at depth 0
    pub noise_amplitude: f32,
    /// Set while the user is digging; read by `DiggingSelector`
    pub digging: bool,
    amplitude_override: Option<f32>,
    state: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl GenerationSession {
    pub fn new(seed: &str, size: f32) -> Self {
        let params = GenerationParams::from_seed(seed);
        Self {
            noise_amplitude: default_amplitude(&params, size),
            params,
            noise: NoiseOracle::new(seed),
            rng: ChaCha8Rng::seed_from_u64(seed_hash(seed) as u64),
            palette: Palette::default(),
            water_level: None,
            size,
            digging: false,
            amplitude_override: None,
            state: HashMap::new(),
        }
    }

    pub fn seed(&self) -> &str {
        self.noise.seed()
    }

    /// Replace the derived params, keeping an explicit amplitude if one was set.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self.noise_amplitude = self
            .amplitude_override
            .unwrap_or_else(|| default_amplitude(&params, self.size));
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_water_level(mut self, water_level: Option<f32>) -> Self {
        self.water_level = water_level;
        self
    }

    pub fn with_noise_amplitude(mut self, amplitude: Option<f32>) -> Self {
        self.amplitude_override = amplitude;
        self.noise_amplitude = amplitude.unwrap_or_else(|| default_amplitude(&self.params, self.size));
        self
    }

    /// Switch the RNG to an independent stream, e.g. per offloaded section.
    pub fn with_rng_stream(mut self, stream: u64) -> Self {
        self.rng.set_stream(stream);
        self
    }

    /// Typed generator state, created with `Default` on first access.
    pub fn state_mut<T: Default + Send + 'static>(&mut self) -> &mut T {
        self.state
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
            .expect("state entries are keyed by their own TypeId")
    }

    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Drop all generator state (e.g. before regenerating from scratch).
    pub fn reset_state(&mut self) {
        self.state.clear();
    }
}

fn default_amplitude(params: &GenerationParams, size: f32) -> f32 {
    params.max_height * (size / 2.0)
}

impl std::fmt::Debug for GenerationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSession")
            .field("seed", &self.seed())
            .field("params", &self.params)
            .field("size", &self.size)
            .field("noise_amplitude", &self.noise_amplitude)
            .field("water_level", &self.water_level)
            .field("digging", &self.digging)
            .field("state_entries", &self.state.len())
            .finish()
    }
}
