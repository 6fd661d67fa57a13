//! Generation parameters derived from the seed string.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum number of seed characters consulted when deriving parameters.
const SEED_DIGITS: usize = 10;

/// Shape parameters for displacement, fixed per seed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Noise scale of the continent mask
    pub island_size: f32,
    /// Divisor flattening the landmass spline
    pub landmass_slope: f32,
    /// Peak height as a fraction of half the map size
    pub max_height: f32,
    /// Noise scale of the detail octaves
    pub smoothness: f32,
    /// Landmass multiplier
    pub plateau_factor: f32,
    /// Divisor applied to x/z before the per-vertex noise sample
    pub noise_sample_scale: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            island_size: 10.0,
            landmass_slope: 25.0,
            max_height: 0.2,
            smoothness: 1.0,
            plateau_factor: 10.0,
            noise_sample_scale: 3.0,
        }
    }
}

impl GenerationParams {
    /// Derive parameters from the seed's characters.
    ///
    /// Lowercase ASCII letters are ignored and the remainder repeated to at
    /// least ten characters. Each parameter reads one position; a non-digit or
    /// a zero result falls back to the default.
    pub fn from_seed(seed: &str) -> Self {
        let chars: Vec<char> = seed.chars().filter(|c| !c.is_ascii_lowercase()).collect();
        let defaults = Self::default();
        if chars.is_empty() {
            return defaults;
        }

        let digit = |i: usize| chars[i % chars.len()].to_digit(10).map(|d| d as f32);
        let derive = |i: usize, f: fn(f32) -> f32, fallback: f32| match digit(i).map(f) {
            Some(v) if v != 0.0 => v,
            _ => fallback,
        };

        Self {
            island_size: derive(0, |d| d * 6.0 + 5.0, defaults.island_size),
            landmass_slope: derive(1, |d| d * 4.0 + 50.0, defaults.landmass_slope),
            max_height: derive(2, |d| d / 15.0, defaults.max_height),
            smoothness: derive(3, |d| (d + 1.0) * 0.2, defaults.smoothness),
            plateau_factor: derive(4, |d| d * 6.0 + 5.0, defaults.plateau_factor),
            noise_sample_scale: defaults.noise_sample_scale,
        }
    }
}

/// A fresh seed of random decimal digits.
pub fn random_seed() -> String {
    let mut rng = rand::thread_rng();
    (0..SEED_DIGITS + 6)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_seed() {
        let params = GenerationParams::from_seed("1234567890");
        assert_eq!(params.island_size, 11.0);
        assert_eq!(params.landmass_slope, 58.0);
        assert!((params.max_height - 0.2).abs() < 1e-6);
        assert!((params.smoothness - 1.0).abs() < 1e-6);
        assert_eq!(params.plateau_factor, 35.0);
        assert_eq!(params.noise_sample_scale, 3.0);
    }

    #[test]
    fn test_letters_are_stripped() {
        assert_eq!(GenerationParams::from_seed("a1b2c3d4e5"), GenerationParams::from_seed("12345"));
    }

    #[test]
    fn test_short_seed_repeats() {
        // "7" repeated: every position reads 7
        let params = GenerationParams::from_seed("7");
        assert_eq!(params.island_size, 47.0);
        assert_eq!(params.landmass_slope, 78.0);
        assert!((params.max_height - 7.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_fallbacks() {
        // zero max height and non-digit positions fall back
        let params = GenerationParams::from_seed("X-0Y!");
        assert_eq!(params.island_size, 10.0);
        assert_eq!(params.landmass_slope, 25.0);
        assert_eq!(params.max_height, 0.2);
        assert_eq!(params.smoothness, 1.0);
        assert_eq!(params.plateau_factor, 10.0);
    }

    #[test]
    fn test_all_letter_seed_uses_defaults() {
        assert_eq!(GenerationParams::from_seed("abc"), GenerationParams::default());
        assert_eq!(GenerationParams::from_seed(""), GenerationParams::default());
    }

    #[test]
    fn test_random_seed_is_digits() {
        let seed = random_seed();
        assert!(seed.len() >= SEED_DIGITS);
        assert!(seed.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_string(&GenerationParams::default()).unwrap();
        assert!(json.contains("islandSize"));
        assert!(json.contains("noiseSampleScale"));
    }
}
