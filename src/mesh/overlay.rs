//! Transform overlay - sparse position overrides applied at export time.
//!
//! The canonical buffer is never edited by terraforming. Instead a hook decides
//! per vertex whether a transformation applies, and the transformed position is
//! remembered in the overlay so later exports start from it.

use std::collections::HashMap;

use glam::Vec3;

use crate::generation::noise::NoiseOracle;

/// Hook pair deciding whether and how to move an exported vertex.
pub trait TransformHook {
    /// Returns the transformation for a vertex at `position`, if any.
    fn filter(&self, position: Vec3) -> Option<Vec3>;

    /// Applies a transformation returned by `filter`.
    fn apply(&self, position: Vec3, transformation: Vec3) -> Vec3;
}

/// Overridden positions keyed by absolute buffer index.
#[derive(Clone, Debug, Default)]
pub struct TransformOverlay {
    positions: HashMap<usize, Vec3>,
}

impl TransformOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.positions.get(&index).copied()
    }

    pub fn set(&mut self, index: usize, position: Vec3) {
        self.positions.insert(index, position);
    }

    /// Position to export for `index`, falling back to the canonical one.
    pub fn resolve(&self, index: usize, canonical: Vec3) -> Vec3 {
        self.get(index).unwrap_or(canonical)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drop every override.
    ///
    /// Indices shift when cells are subdivided, so callers clear the overlay
    /// after recursing.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

/// A single column edit from the editing layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerraformEdit {
    pub x: f32,
    pub z: f32,
    pub delta: Vec3,
}

/// Moves every vertex in an edited column by that column's delta.
///
/// Columns match on exact x/z, so edits should be snapped with
/// `Terrain::nearest_grid_point` first.
#[derive(Clone, Debug, Default)]
pub struct Terraform {
    edits: HashMap<(u32, u32), Vec3>,
}

impl Terraform {
    pub fn new(edits: impl IntoIterator<Item = TerraformEdit>) -> Self {
        let mut terraform = Self::default();
        for edit in edits {
            terraform.push(edit);
        }
        terraform
    }

    /// Add an edit. A later edit to the same column replaces the earlier one.
    pub fn push(&mut self, edit: TerraformEdit) {
        self.edits.insert(column_key(edit.x, edit.z), edit.delta);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

// -0.0 and 0.0 must land on the same column
fn column_key(x: f32, z: f32) -> (u32, u32) {
    ((x + 0.0).to_bits(), (z + 0.0).to_bits())
}

impl TransformHook for Terraform {
    fn filter(&self, position: Vec3) -> Option<Vec3> {
        self.edits.get(&column_key(position.x, position.z)).copied()
    }

    fn apply(&self, position: Vec3, transformation: Vec3) -> Vec3 {
        position + transformation
    }
}

/// Noise-driven plateau shaping: flattens ground above a spline threshold and
/// deepens low ground into basins.
pub struct PlateauTransform<'a> {
    noise: &'a NoiseOracle,
}

impl<'a> PlateauTransform<'a> {
    pub fn new(noise: &'a NoiseOracle) -> Self {
        Self { noise }
    }

    /// Height above which ground is pulled toward a plateau at `(x, z)`.
    pub fn threshold(&self, x: f32, z: f32) -> f32 {
        let n1 = self.noise.sample(x, z, 20.0, 0.0);
        let n2 = self.noise.sample(x, z, 40.0, 100.0);
        let n3 = self.noise.sample(x, z, 60.0, 300.0);
        let n4 = self.noise.sample(x, z, 100.0, 500.0);

        let mut output = (2.0 * n1).atan().max(1.0) + (2.0 * n2 - 4.0).atan().max(1.0) - 0.4;
        let spline3 = n3.atan();
        if spline3 < 0.4 {
            output -= (2.0 * spline3).max(0.0);
        }
        if n2 > n1 {
            output += (2.0 * (n2 - n1)).atan();
        }
        if n4 > 0.5 {
            output *= 2.0;
        }
        output.max(0.1)
    }
}

impl TransformHook for PlateauTransform<'_> {
    fn filter(&self, position: Vec3) -> Option<Vec3> {
        let Vec3 { x, y, z } = position;
        let threshold = self.threshold(x, z);

        if y > threshold || threshold - y < 0.15 {
            let correction = (y - threshold - 0.1) * 0.8;
            return Some(Vec3::new(x, y - correction, z));
        }

        if y < 0.01 {
            let mut drop = 0.2;
            if y < -0.1 {
                drop += 0.2;
            }
            if y < -0.2 {
                drop += 0.2;
            }
            let correction = -drop * 0.3;
            return Some(Vec3::new(x, y + correction, z));
        }

        None
    }

    fn apply(&self, position: Vec3, transformation: Vec3) -> Vec3 {
        Vec3::new(position.x, transformation.y, position.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_resolve() {
        let mut overlay = TransformOverlay::new();
        let canonical = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(overlay.resolve(3, canonical), canonical);

        overlay.set(3, Vec3::new(1.0, 5.0, 1.0));
        assert_eq!(overlay.resolve(3, canonical).y, 5.0);
        assert_eq!(overlay.resolve(4, canonical), canonical);

        overlay.clear();
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_terraform_matches_exact_column() {
        let terraform = Terraform::new([TerraformEdit { x: 1.0, z: -2.0, delta: Vec3::new(0.0, 0.5, 0.0) }]);

        assert_eq!(terraform.filter(Vec3::new(1.0, 3.0, -2.0)), Some(Vec3::new(0.0, 0.5, 0.0)));
        assert_eq!(terraform.filter(Vec3::new(1.01, 3.0, -2.0)), None);

        let moved = terraform.apply(Vec3::new(1.0, 3.0, -2.0), Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(moved, Vec3::new(1.0, 3.5, -2.0));
    }

    #[test]
    fn test_terraform_negative_zero_column() {
        let terraform = Terraform::new([TerraformEdit { x: 0.0, z: 0.0, delta: Vec3::Y }]);
        assert!(terraform.filter(Vec3::new(-0.0, 0.0, -0.0)).is_some());
    }

    #[test]
    fn test_terraform_last_edit_wins() {
        let mut terraform = Terraform::default();
        terraform.push(TerraformEdit { x: 0.0, z: 0.0, delta: Vec3::Y });
        terraform.push(TerraformEdit { x: 0.0, z: 0.0, delta: Vec3::NEG_Y });
        assert_eq!(terraform.len(), 1);
        assert_eq!(terraform.filter(Vec3::ZERO), Some(Vec3::NEG_Y));
    }

    #[test]
    fn test_plateau_keeps_xz() {
        let noise = NoiseOracle::new("plateau");
        let plateau = PlateauTransform::new(&noise);

        let high = Vec3::new(3.0, 10.0, -7.0);
        let t = plateau.filter(high).expect("high ground is always flattened");
        let moved = plateau.apply(high, t);
        assert_eq!(moved.x, high.x);
        assert_eq!(moved.z, high.z);
        assert!(moved.y < high.y);
    }

    #[test]
    fn test_plateau_deepens_basins() {
        let noise = NoiseOracle::new("plateau");
        let plateau = PlateauTransform::new(&noise);

        let low = Vec3::new(3.0, -0.5, -7.0);
        if let Some(t) = plateau.filter(low) {
            assert!(plateau.apply(low, t).y < low.y);
        }
    }
}
