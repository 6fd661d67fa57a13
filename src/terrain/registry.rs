//! Terrain registry - owned by the embedding application, no global state.

use std::collections::HashMap;

use super::Terrain;
use crate::generation::TerrainConfig;

/// Handle to a terrain in a `TerrainRegistry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerrainId(pub u32);

impl std::fmt::Display for TerrainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "terrain-{}", self.0)
    }
}

/// Live terrains by id. Ids are allocated monotonically and never reused.
#[derive(Debug, Default)]
pub struct TerrainRegistry {
    terrains: HashMap<TerrainId, Terrain>,
    next_id: u32,
}

impl TerrainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, config: TerrainConfig) -> TerrainId {
        self.insert(Terrain::new(config))
    }

    /// Register an already built terrain (e.g. one with custom generators).
    pub fn insert(&mut self, terrain: Terrain) -> TerrainId {
        let id = TerrainId(self.next_id);
        self.next_id += 1;
        log::debug!("Registered {}", id);
        self.terrains.insert(id, terrain);
        id
    }

    pub fn get(&self, id: TerrainId) -> Option<&Terrain> {
        self.terrains.get(&id)
    }

    pub fn get_mut(&mut self, id: TerrainId) -> Option<&mut Terrain> {
        self.terrains.get_mut(&id)
    }

    /// Remove a terrain, returning it if it was registered.
    pub fn dispose(&mut self, id: TerrainId) -> Option<Terrain> {
        let terrain = self.terrains.remove(&id);
        if terrain.is_some() {
            log::debug!("Disposed {}", id);
        }
        terrain
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TerrainId> + '_ {
        self.terrains.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> TerrainConfig {
        TerrainConfig::default().with_seed("1").with_size(2.0)
    }

    #[test]
    fn test_create_lookup_dispose() {
        let mut registry = TerrainRegistry::new();
        let a = registry.create(small());
        let b = registry.create(small());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        registry.get_mut(a).unwrap().recurse_full_map(1).unwrap();
        assert_eq!(registry.get(a).unwrap().len(), 24);
        assert_eq!(registry.get(b).unwrap().len(), 6);

        assert!(registry.dispose(a).is_some());
        assert!(registry.get(a).is_none());
        assert!(registry.dispose(a).is_none());
    }

    #[test]
    fn test_ids_not_reused() {
        let mut registry = TerrainRegistry::new();
        let a = registry.create(small());
        registry.dispose(a);
        let b = registry.create(small());
        assert!(b > a);
        assert_eq!(b.to_string(), "terrain-1");
    }
}
