//! Vegetation placement on the grass band of a loaded chunk.

use std::f32::consts::PI;

use atoll_chunk::{BandThresholds, GRASS, HeightBand, HeightmapSample, Rgb, rgb_from_hex};
use atoll_geom::{GridCoord, Vec3};

use crate::config::FeaturesConfig;
use crate::noise::{TerrainNoise, norm};
use crate::rng::SeededRng;

const TRUNK_FALLBACK: Rgb = [0x84, 0x47, 0x34];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureInstance {
    /// Index into `FeaturesConfig::varieties`.
    pub variety: usize,
    /// Offset from the chunk center; `y` is the terrain height.
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
    pub leaf_color: Rgb,
    pub trunk_color: Rgb,
}

/// Per-chunk stream seed so a chunk scatters identically regardless of the
/// order chunks are generated in.
#[inline]
pub fn feature_seed(seed: u64, coord: GridCoord) -> u64 {
    let hx = (coord.x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let hz = (coord.z as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    seed ^ hx ^ hz.rotate_left(17)
}

/// Density at a world position: a broad layer plus a quarter-weight fine layer.
#[inline]
pub fn density_at(noise: &TerrainNoise, wx: f32, wz: f32) -> f32 {
    noise.sample_layer(wx, wz, 30.0) + norm(noise.sample(wx, 0.0, wz)) / 4.0
}

pub fn scatter_features(
    cfg: &FeaturesConfig,
    noise: &TerrainNoise,
    bands: &BandThresholds,
    seed: u64,
    hm: &HeightmapSample,
    center: Vec3,
) -> Vec<FeatureInstance> {
    if !cfg.enabled || cfg.max_per_chunk == 0 {
        return Vec::new();
    }
    let weights: Vec<f32> = cfg.varieties.iter().map(|v| v.weight).collect();
    let mut rng = SeededRng::new(feature_seed(seed, hm.coord));
    let mut out = Vec::new();
    let width = hm.width();
    'rows: for row in 0..width {
        for col in 0..width {
            let base = hm.local_position(row, col);
            if bands.classify(base.y) != HeightBand::Grass {
                continue;
            }
            let wx = center.x + base.x;
            let wz = center.z + base.z;
            if density_at(noise, wx, wz) <= cfg.density_threshold {
                continue;
            }
            let Some(variety) = rng.pick_weighted(&weights) else {
                break 'rows;
            };
            let jx = rng.float(-cfg.jitter, cfg.jitter);
            let jz = rng.float(-cfg.jitter, cfg.jitter);
            let yaw = rng.float(-PI, PI);
            let scale = rng.int(cfg.scale_min, cfg.scale_max) as f32;
            let leaf_color = rng
                .index(cfg.leaf_colors.len())
                .map(|i| rgb_from_hex(cfg.leaf_colors[i]))
                .unwrap_or(GRASS);
            let trunk_color = rng
                .index(cfg.trunk_colors.len())
                .map(|i| rgb_from_hex(cfg.trunk_colors[i]))
                .unwrap_or(TRUNK_FALLBACK);
            out.push(FeatureInstance {
                variety,
                position: Vec3::new(base.x + jx, base.y, base.z + jz),
                yaw,
                scale,
                leaf_color,
                trunk_color,
            });
            if out.len() >= cfg.max_per_chunk {
                break 'rows;
            }
        }
    }
    out
}
