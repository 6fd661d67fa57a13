//! Terrain configuration, loadable from JSON.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::biome::Palette;
use super::params::random_seed;
use super::registry::{default_generators, GeneratorKind, SelectorKind};
use super::session::GenerationSession;
use crate::core::Result;

/// Construction parameters for a terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainConfig {
    /// World extent; the mesh spans `[-size/2, size/2]` on x and z.
    pub size: f32,
    /// Drives the noise oracle and derived params. Random digits if absent.
    pub seed: Option<String>,
    /// Biome palette overrides keyed by `GRASS`, `DIRT`, `STONE`, `SAND`.
    pub colors: Option<HashMap<String, [f32; 3]>>,
    /// Columns below this height are colored as sand where allowed.
    pub water_level: Option<f32>,
    /// Ordered generator list.
    pub generators: Vec<GeneratorKind>,
    pub selector: SelectorKind,
    /// Overrides the default `max_height * size / 2` displacement amplitude.
    pub noise_amplitude: Option<f32>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            seed: None,
            colors: None,
            water_level: None,
            generators: default_generators(),
            selector: SelectorKind::default(),
            noise_amplitude: None,
        }
    }
}

impl TerrainConfig {
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> String {
        self.seed.clone().unwrap_or_else(random_seed)
    }

    /// Build a session for `seed` from this configuration.
    pub fn session(&self, seed: &str) -> GenerationSession {
        GenerationSession::new(seed, self.size)
            .with_palette(Palette::from_overrides(self.colors.as_ref()))
            .with_water_level(self.water_level)
            .with_noise_amplitude(self.noise_amplitude)
    }

    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_persistence() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("configs").join("island.json");

        let mut colors = HashMap::new();
        colors.insert("GRASS".to_string(), [0.1, 0.9, 0.1]);
        let config = TerrainConfig {
            size: 64.0,
            seed: Some("90210".into()),
            colors: Some(colors),
            water_level: Some(-0.5),
            generators: vec![GeneratorKind::Displacement, GeneratorKind::Collapse],
            selector: SelectorKind::Digging,
            noise_amplitude: Some(4.0),
        };

        config.save_sync(&path).expect("save failed");
        let loaded = TerrainConfig::load_sync(&path).expect("load failed");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TerrainConfig = serde_json::from_str(r#"{"size": 8, "waterLevel": 0.5}"#).unwrap();
        assert_eq!(config.size, 8.0);
        assert_eq!(config.water_level, Some(0.5));
        assert_eq!(config.generators, vec![GeneratorKind::Landscape]);
        assert_eq!(config.selector, SelectorKind::Uniform);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_missing_seed_is_random_digits() {
        let seed = TerrainConfig::default().resolve_seed();
        assert!(!seed.is_empty() && seed.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(TerrainConfig::default().with_seed("abc").resolve_seed(), "abc");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let result = TerrainConfig::load_sync(&temp_dir.path().join("nope.json"));
        assert!(matches!(result, Err(crate::core::Error::Io(_))));
    }
}
