//! Constraint-propagation biome colorer.
//!
//! Each world column (quantized x/z) holds a set of admissible biomes. The
//! first time a column is visited it is collapsed to one biome compatible with
//! its already-resolved neighbours, and the choice narrows the 8 surrounding
//! columns one hop deep. There is no backtracking: an empty candidate set
//! resets to every biome.
//!
//! Inherited corners already carry a color. They keep it, and a column first
//! seen through such a corner adopts that color instead of rolling a new one.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::biome::{Biome, BiomeSet, Palette};
use super::generator::Generator;
use super::registry::GeneratorKind;
use super::session::GenerationSession;
use crate::mesh::subdivide::{is_corner_slot, CORNER_SLOTS};
use crate::mesh::vertex::{Vertex, VERTICES_PER_SPLIT};

/// Probability of repeating the previous biome while the streak is below its cap.
const REPEAT_PROBABILITY: f64 = 0.75;
/// Consecutive repeats after which the previous biome gets no extra weight.
const MAX_STREAK: u32 = 12;
/// Per-channel color jitter (fraction).
const COLOR_JITTER: f32 = 0.08;
/// Quantization steps per world unit for column keys.
const COLUMN_RESOLUTION: f32 = 1024.0;

const NEIGHBOURS: [(f32, f32); 8] = [
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 1.0),
    (0.0, 1.0),
    (1.0, 1.0),
];

/// Quantized `(x, z)` of a terrain column.
pub type ColumnKey = (i64, i64);

pub fn column_key(x: f32, z: f32) -> ColumnKey {
    ((x * COLUMN_RESOLUTION).round() as i64, (z * COLUMN_RESOLUTION).round() as i64)
}

/// Spacing between neighbouring columns of a split: the top edge of its first child.
fn child_spacing(vertices: &[Vertex; VERTICES_PER_SPLIT]) -> f32 {
    (vertices[2].x() - vertices[5].x()).abs()
}

/// A resolved column, as exchanged with background workers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub key: ColumnKey,
    pub biome: Biome,
    pub color: Vec3,
}

#[derive(Clone, Copy, Debug, Default)]
struct Column {
    candidates: BiomeSet,
    resolved: Option<(Biome, Vec3)>,
}

/// Colorer memory carried across calls in one session.
#[derive(Debug, Default)]
pub struct CollapseState {
    columns: HashMap<ColumnKey, Column>,
    previous: Option<Biome>,
    streak: u32,
}

impl CollapseState {
    /// Biome chosen for the column at `(x, z)`, if it has been resolved.
    pub fn biome_at(&self, x: f32, z: f32) -> Option<Biome> {
        self.columns.get(&column_key(x, z))?.resolved.map(|(b, _)| b)
    }

    /// Remaining candidates for the column at `(x, z)`.
    pub fn candidates_at(&self, x: f32, z: f32) -> BiomeSet {
        self.columns
            .get(&column_key(x, z))
            .map(|c| c.candidates)
            .unwrap_or(BiomeSet::ALL)
    }

    pub fn resolved_count(&self) -> usize {
        self.columns.values().filter(|c| c.resolved.is_some()).count()
    }

    /// Every resolved column, ordered by key.
    pub fn resolved_columns(&self) -> Vec<ResolvedColumn> {
        self.resolved_where(|_| true)
    }

    /// Resolved columns whose x/z lies inside `[min, max]`.
    pub fn resolved_within(&self, min: Vec2, max: Vec2) -> Vec<ResolvedColumn> {
        let (lo, hi) = (column_key(min.x, min.y), column_key(max.x, max.y));
        self.resolved_where(|key| key.0 >= lo.0 && key.0 <= hi.0 && key.1 >= lo.1 && key.1 <= hi.1)
    }

    fn resolved_where(&self, keep: impl Fn(&ColumnKey) -> bool) -> Vec<ResolvedColumn> {
        let mut columns: Vec<ResolvedColumn> = self
            .columns
            .iter()
            .filter(|(key, _)| keep(key))
            .filter_map(|(key, column)| {
                column.resolved.map(|(biome, color)| ResolvedColumn { key: *key, biome, color })
            })
            .collect();
        columns.sort_by_key(|c| c.key);
        columns
    }

    /// Adopt columns resolved elsewhere. Columns already resolved here win.
    pub fn merge(&mut self, columns: impl IntoIterator<Item = ResolvedColumn>) {
        for ResolvedColumn { key, biome, color } in columns {
            let column = self.columns.entry(key).or_default();
            if column.resolved.is_none() {
                *column = Column { candidates: BiomeSet::of(&[biome]), resolved: Some((biome, color)) };
            }
        }
    }

    fn pick(&mut self, candidates: BiomeSet, rng: &mut impl Rng) -> Biome {
        let repeat = self
            .previous
            .filter(|prev| candidates.contains(*prev) && self.streak < MAX_STREAK)
            .filter(|_| rng.gen_bool(REPEAT_PROBABILITY));

        let choice = repeat
            .or_else(|| candidates.nth(rng.gen_range(0..candidates.len())))
            .unwrap_or(Biome::Dirt);
        self.record(choice);
        choice
    }

    fn record(&mut self, choice: Biome) {
        if self.previous == Some(choice) {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        self.previous = Some(choice);
    }

    fn resolve(&mut self, position: Vec3, spacing: f32, session: &mut GenerationSession) -> Vec3 {
        let key = column_key(position.x, position.z);
        if let Some((_, color)) = self.columns.get(&key).and_then(|c| c.resolved) {
            return color;
        }

        let neighbour_keys = NEIGHBOURS.map(|(dx, dz)| {
            column_key(position.x + dx * spacing, position.z + dz * spacing)
        });

        let mut candidates = self.candidates_at(position.x, position.z);
        let mut neighbour_colors = Vec::with_capacity(NEIGHBOURS.len());
        for neighbour in &neighbour_keys {
            if let Some((biome, color)) = self.columns.get(neighbour).and_then(|c| c.resolved) {
                candidates = candidates.intersect(biome.adjacency());
                neighbour_colors.push(color);
            }
        }
        if candidates.is_empty() {
            log::trace!("Column {:?} has no admissible biome, resetting", key);
            candidates = BiomeSet::ALL;
        }

        let underwater = session.water_level.is_some_and(|level| position.y < level);
        let biome = if underwater && candidates.contains(Biome::Sand) {
            self.record(Biome::Sand);
            Biome::Sand
        } else {
            self.pick(candidates, &mut session.rng)
        };

        let color = blend_color(session, biome, &neighbour_colors);
        self.settle(key, biome, color, &neighbour_keys);
        color
    }

    /// Resolve the column at `position` to an already chosen `color`, unless it is resolved.
    fn adopt(&mut self, position: Vec3, color: Vec3, spacing: f32, palette: &Palette) {
        let key = column_key(position.x, position.z);
        if self.columns.get(&key).is_some_and(|c| c.resolved.is_some()) {
            return;
        }
        let neighbour_keys = NEIGHBOURS.map(|(dx, dz)| {
            column_key(position.x + dx * spacing, position.z + dz * spacing)
        });
        self.settle(key, palette.closest(color), color, &neighbour_keys);
    }

    fn settle(&mut self, key: ColumnKey, biome: Biome, color: Vec3, neighbour_keys: &[ColumnKey]) {
        self.columns.insert(key, Column { candidates: BiomeSet::of(&[biome]), resolved: Some((biome, color)) });

        // One-hop propagation into unresolved neighbours.
        for neighbour in neighbour_keys {
            let column = self.columns.entry(*neighbour).or_default();
            if column.resolved.is_none() {
                let narrowed = column.candidates.intersect(biome.adjacency());
                column.candidates = if narrowed.is_empty() { biome.adjacency() } else { narrowed };
            }
        }
    }
}

/// Palette color (weight 2) averaged with neighbour colors (weight 1), then jittered.
fn blend_color(session: &mut GenerationSession, biome: Biome, neighbours: &[Vec3]) -> Vec3 {
    let sum = session.palette.color(biome) * 2.0 + neighbours.iter().copied().sum::<Vec3>();
    let mean = sum / (2 + neighbours.len()) as f32;

    let mut jitter = || 1.0 + session.rng.gen_range(-COLOR_JITTER..=COLOR_JITTER);
    let jittered = Vec3::new(mean.x * jitter(), mean.y * jitter(), mean.z * jitter());
    jittered.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Colors every vertex by its column's collapsed biome. Colored corners are left alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollapseColorer;

impl Generator for CollapseColorer {
    fn apply(
        &self,
        vertices: &mut [Vertex; VERTICES_PER_SPLIT],
        _noise: &[f32; VERTICES_PER_SPLIT],
        session: &mut GenerationSession,
    ) {
        let spacing = child_spacing(vertices);

        // Take the state out so the session's RNG and palette stay borrowable.
        let mut state = std::mem::take(session.state_mut::<CollapseState>());
        for slot in CORNER_SLOTS {
            if let Some(color) = vertices[slot].color {
                state.adopt(vertices[slot].position, color, spacing, &session.palette);
            }
        }
        for (slot, vertex) in vertices.iter_mut().enumerate() {
            if is_corner_slot(slot) && vertex.color.is_some() {
                continue;
            }
            vertex.color = Some(state.resolve(vertex.position, spacing, session));
        }
        *session.state_mut::<CollapseState>() = state;
    }

    fn kind(&self) -> Option<GeneratorKind> {
        Some(GeneratorKind::Collapse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::buffer::VertexBuffer;
    use crate::mesh::subdivide::subdivide;

    fn colored_split(session: &mut GenerationSession) -> [Vertex; VERTICES_PER_SPLIT] {
        let cell = VertexBuffer::new(session.size).cell(0).unwrap();
        let mut split = subdivide(&cell, 1).unwrap();
        CollapseColorer.apply(&mut split, &[0.0; VERTICES_PER_SPLIT], session);
        split
    }

    #[test]
    fn test_every_vertex_colored_in_range() {
        let mut session = GenerationSession::new("31415", 8.0);
        let split = colored_split(&mut session);
        for v in &split {
            let color = v.color.unwrap();
            assert!(color.cmpge(Vec3::ZERO).all() && color.cmple(Vec3::ONE).all());
        }
        // 3x3 grid of distinct columns
        assert_eq!(session.state::<CollapseState>().unwrap().resolved_count(), 9);
    }

    #[test]
    fn test_coincident_vertices_share_color() {
        let mut session = GenerationSession::new("31415", 8.0);
        let split = colored_split(&mut session);
        for a in &split {
            for b in &split {
                if a.position.x == b.position.x && a.position.z == b.position.z {
                    assert_eq!(a.color, b.color);
                }
            }
        }
    }

    #[test]
    fn test_resolved_neighbours_respect_adjacency() {
        let mut session = GenerationSession::new("27182", 8.0);
        colored_split(&mut session);
        let state = session.state::<CollapseState>().unwrap();

        let coords = [-4.0, 0.0, 4.0];
        for &x in &coords {
            for &z in &coords {
                let here = state.biome_at(x, z).unwrap();
                for (dx, dz) in NEIGHBOURS {
                    if let Some(there) = state.biome_at(x + dx * 4.0, z + dz * 4.0) {
                        assert!(here.adjacency().contains(there), "{:?} next to {:?}", here, there);
                    }
                }
            }
        }
    }

    #[test]
    fn test_propagation_narrows_neighbours() {
        let mut session = GenerationSession::new("1", 2.0);
        let mut state = CollapseState::default();
        state.resolve(Vec3::ZERO, 1.0, &mut session);

        let chosen = state.biome_at(0.0, 0.0).unwrap();
        assert_eq!(state.candidates_at(1.0, 0.0), chosen.adjacency());
        assert_eq!(state.candidates_at(5.0, 5.0), BiomeSet::ALL);
    }

    #[test]
    fn test_underwater_columns_are_sand() {
        let mut session = GenerationSession::new("5", 8.0).with_water_level(Some(10.0));
        colored_split(&mut session);
        let state = session.state::<CollapseState>().unwrap();
        // Nothing resolved yet could forbid sand on the first column.
        assert_eq!(state.biome_at(0.0, 0.0), Some(Biome::Sand));
    }

    #[test]
    fn test_streak_resets_on_change() {
        let mut state = CollapseState::default();
        state.record(Biome::Grass);
        state.record(Biome::Grass);
        state.record(Biome::Grass);
        assert_eq!(state.streak, 2);
        state.record(Biome::Stone);
        assert_eq!(state.streak, 0);
    }

    #[test]
    fn test_child_spacing_is_child_width() {
        let session = GenerationSession::new("1", 8.0);
        let cell = VertexBuffer::new(session.size).cell(0).unwrap();
        let split = subdivide(&cell, 1).unwrap();
        assert_eq!(child_spacing(&split), 4.0);
    }

    #[test]
    fn test_colored_corners_are_kept_and_adopted() {
        let mut session = GenerationSession::new("31415", 8.0);
        let mut cell = VertexBuffer::new(session.size).cell(0).unwrap();
        let inherited = Vec3::new(0.95, 0.81, 0.62);
        for vertex in cell.iter_mut() {
            vertex.color = Some(inherited);
        }
        let mut split = subdivide(&cell, 1).unwrap();
        CollapseColorer.apply(&mut split, &[0.0; VERTICES_PER_SPLIT], &mut session);

        for slot in CORNER_SLOTS {
            assert_eq!(split[slot].color, Some(inherited));
        }
        let state = session.state::<CollapseState>().unwrap();
        assert_eq!(state.biome_at(-4.0, -4.0), Some(Biome::Sand));
        assert_eq!(state.biome_at(4.0, 4.0), Some(Biome::Sand));
        // Grass may not sit next to the adopted sand corners.
        assert_ne!(state.biome_at(0.0, 0.0), Some(Biome::Grass));
    }

    #[test]
    fn test_merge_keeps_local_resolution() {
        let mut session = GenerationSession::new("77", 8.0);
        colored_split(&mut session);
        let local = session.state::<CollapseState>().unwrap().resolved_columns();

        let mut state = CollapseState::default();
        state.merge(local.iter().copied());
        let foreign = ResolvedColumn { key: local[0].key, biome: Biome::Stone, color: Vec3::ZERO };
        let fresh = ResolvedColumn { key: column_key(40.0, 40.0), biome: Biome::Grass, color: Vec3::ONE };
        state.merge([foreign, fresh]);

        assert_eq!(state.resolved_columns().len(), local.len() + 1);
        assert_eq!(state.resolved_columns()[0], local[0]);
        assert_eq!(state.biome_at(40.0, 40.0), Some(Biome::Grass));
    }

    #[test]
    fn test_resolved_within_bounds() {
        let mut session = GenerationSession::new("77", 8.0);
        colored_split(&mut session);
        let state = session.state::<CollapseState>().unwrap();
        // Right column of the 3x3 grid.
        let right = state.resolved_within(Vec2::new(2.0, -8.0), Vec2::new(8.0, 8.0));
        assert_eq!(right.len(), 3);
        assert!(right.iter().all(|c| c.key.0 == column_key(4.0, 0.0).0));
    }

    #[test]
    fn test_capped_streak_loses_bias() {
        let mut session = GenerationSession::new("9", 2.0);
        let mut state = CollapseState { previous: Some(Biome::Grass), streak: MAX_STREAK, ..Default::default() };
        let only_stone = BiomeSet::of(&[Biome::Stone]);
        assert_eq!(state.pick(only_stone, &mut session.rng), Biome::Stone);
        assert_eq!(state.streak, 0);
    }
}
