//! Biome labels, their adjacency rules and palette colors.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Surface biome of a terrain column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Biome {
    Grass,
    Dirt,
    Stone,
    Sand,
}

impl Biome {
    pub const ALL: [Biome; 4] = [Biome::Grass, Biome::Dirt, Biome::Stone, Biome::Sand];

    /// Palette key used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Biome::Grass => "GRASS",
            Biome::Dirt => "DIRT",
            Biome::Stone => "STONE",
            Biome::Sand => "SAND",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }

    /// Biomes allowed next to this one (always including itself).
    pub fn adjacency(&self) -> BiomeSet {
        match self {
            Biome::Grass => BiomeSet::of(&[Biome::Grass, Biome::Dirt, Biome::Stone]),
            Biome::Dirt => BiomeSet::ALL,
            Biome::Stone => BiomeSet::ALL,
            Biome::Sand => BiomeSet::of(&[Biome::Sand, Biome::Dirt, Biome::Stone]),
        }
    }

    /// Default surface color.
    pub fn default_color(&self) -> Vec3 {
        match self {
            Biome::Grass => Vec3::new(0.4, 0.8, 0.3),
            Biome::Dirt => Vec3::new(0.7, 0.5, 0.3),
            Biome::Stone => Vec3::new(0.6, 0.6, 0.6),
            Biome::Sand => Vec3::new(1.0, 0.8, 0.6),
        }
    }
}

/// Candidate biomes for a column, stored as a bitset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BiomeSet(u8);

impl BiomeSet {
    pub const EMPTY: BiomeSet = BiomeSet(0);
    pub const ALL: BiomeSet = BiomeSet(0b1111);

    pub fn of(biomes: &[Biome]) -> Self {
        BiomeSet(biomes.iter().fold(0, |bits, b| bits | b.bit()))
    }

    pub fn contains(&self, biome: Biome) -> bool {
        self.0 & biome.bit() != 0
    }

    pub fn intersect(self, other: BiomeSet) -> BiomeSet {
        BiomeSet(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Biome> + '_ {
        Biome::ALL.into_iter().filter(|b| self.contains(*b))
    }

    /// The `n`th member in `Biome::ALL` order.
    pub fn nth(&self, n: usize) -> Option<Biome> {
        self.iter().nth(n)
    }
}

impl Default for BiomeSet {
    fn default() -> Self {
        BiomeSet::ALL
    }
}

/// Biome colors, optionally overridden from configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: [Vec3; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: Biome::ALL.map(|b| b.default_color()),
        }
    }
}

impl Palette {
    /// Default palette with entries replaced by any matching `GRASS`/`DIRT`/... keys.
    pub fn from_overrides(overrides: Option<&HashMap<String, [f32; 3]>>) -> Self {
        let mut palette = Self::default();
        let Some(overrides) = overrides else {
            return palette;
        };

        for (key, rgb) in overrides {
            match Biome::ALL.iter().find(|b| b.name().eq_ignore_ascii_case(key)) {
                Some(biome) => palette.colors[*biome as usize] = Vec3::from_array(*rgb),
                None => log::warn!("Ignoring color for unknown biome '{}'", key),
            }
        }
        palette
    }

    pub fn color(&self, biome: Biome) -> Vec3 {
        self.colors[biome as usize]
    }

    /// Biome whose palette color is nearest to `color`.
    pub fn closest(&self, color: Vec3) -> Biome {
        Biome::ALL
            .into_iter()
            .min_by(|a, b| {
                let da = self.color(*a).distance_squared(color);
                let db = self.color(*b).distance_squared(color);
                da.total_cmp(&db)
            })
            .unwrap_or(Biome::Dirt)
    }
}
