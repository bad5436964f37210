use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use atoll_chunk::BandThresholds;

pub const DEFAULT_SEED: u64 = 1_589_029_789_694;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_segments")]
    pub segments: usize,
    #[serde(default = "default_water_level")]
    pub water_level: f32,
    #[serde(default = "default_base_height")]
    pub base_height: f32,
    #[serde(default)]
    pub bands: BandConfig,
    #[serde(default)]
    pub noise: NoiseLayers,
    #[serde(default)]
    pub islands: IslandPlacement,
    #[serde(default)]
    pub features: FeaturesConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            segments: default_segments(),
            water_level: default_water_level(),
            base_height: default_base_height(),
            bands: BandConfig::default(),
            noise: NoiseLayers::default(),
            islands: IslandPlacement::default(),
            features: FeaturesConfig::default(),
        }
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_segments() -> usize {
    60
}
fn default_water_level() -> f32 {
    60.0
}
fn default_base_height() -> f32 {
    30.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct BandConfig {
    #[serde(default = "default_grass_from")]
    pub grass_from: f32,
    #[serde(default = "default_snow_from")]
    pub snow_from: f32,
}
fn default_grass_from() -> f32 {
    80.0
}
fn default_snow_from() -> f32 {
    160.0
}
impl Default for BandConfig {
    fn default() -> Self {
        Self {
            grass_from: default_grass_from(),
            snow_from: default_snow_from(),
        }
    }
}

impl BandConfig {
    #[inline]
    pub fn thresholds(&self) -> BandThresholds {
        BandThresholds {
            grass_from: self.grass_from,
            snow_from: self.snow_from,
        }
    }
}

/// One octave of the height field: `norm(noise(x / scale, 0, z / scale)) * amplitude`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct NoiseLayer {
    pub scale: f32,
    pub amplitude: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NoiseLayers {
    #[serde(default = "default_continent")]
    pub continent: NoiseLayer,
    #[serde(default = "default_hills")]
    pub hills: NoiseLayer,
    #[serde(default = "default_detail")]
    pub detail: NoiseLayer,
}
fn default_continent() -> NoiseLayer {
    NoiseLayer {
        scale: 60.0,
        amplitude: 120.0,
    }
}
fn default_hills() -> NoiseLayer {
    NoiseLayer {
        scale: 30.0,
        amplitude: 40.0,
    }
}
fn default_detail() -> NoiseLayer {
    NoiseLayer {
        scale: 10.0,
        amplitude: 5.0,
    }
}
impl Default for NoiseLayers {
    fn default() -> Self {
        Self {
            continent: default_continent(),
            hills: default_hills(),
            detail: default_detail(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct IslandPlacement {
    #[serde(default = "default_region_size")]
    pub region_size: f32,
    #[serde(default = "default_min_spacing")]
    pub min_spacing: f32,
    #[serde(default = "default_max_spacing")]
    pub max_spacing: f32,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_size_min")]
    pub size_min: f32,
    #[serde(default = "default_size_max")]
    pub size_max: f32,
    #[serde(default = "default_height_min")]
    pub height_min: f32,
    #[serde(default = "default_height_max")]
    pub height_max: f32,
}
fn default_region_size() -> f32 {
    5000.0
}
fn default_min_spacing() -> f32 {
    1500.0
}
fn default_max_spacing() -> f32 {
    4000.0
}
fn default_attempts() -> u32 {
    10
}
fn default_size_min() -> f32 {
    100.0
}
fn default_size_max() -> f32 {
    600.0
}
fn default_height_min() -> f32 {
    0.3
}
fn default_height_max() -> f32 {
    1.7
}
impl Default for IslandPlacement {
    fn default() -> Self {
        Self {
            region_size: default_region_size(),
            min_spacing: default_min_spacing(),
            max_spacing: default_max_spacing(),
            attempts: default_attempts(),
            size_min: default_size_min(),
            size_max: default_size_max(),
            height_min: default_height_min(),
            height_max: default_height_max(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeatureVariety {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}
fn default_weight() -> f32 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_features_enabled")]
    pub enabled: bool,
    #[serde(default = "default_density_threshold")]
    pub density_threshold: f32,
    #[serde(default = "default_jitter")]
    pub jitter: f32,
    #[serde(default = "default_scale_min")]
    pub scale_min: i32,
    #[serde(default = "default_scale_max")]
    pub scale_max: i32,
    #[serde(default = "default_max_per_chunk")]
    pub max_per_chunk: usize,
    #[serde(default = "default_varieties")]
    pub varieties: Vec<FeatureVariety>,
    #[serde(default = "default_leaf_colors")]
    pub leaf_colors: Vec<u32>,
    #[serde(default = "default_trunk_colors")]
    pub trunk_colors: Vec<u32>,
}
fn default_features_enabled() -> bool {
    true
}
fn default_density_threshold() -> f32 {
    0.6
}
fn default_jitter() -> f32 {
    1.0
}
fn default_scale_min() -> i32 {
    5
}
fn default_scale_max() -> i32 {
    8
}
fn default_max_per_chunk() -> usize {
    400
}
fn default_varieties() -> Vec<FeatureVariety> {
    ["oak", "detailed", "cone", "default", "fat"]
        .into_iter()
        .map(|name| FeatureVariety {
            name: name.to_string(),
            weight: 1.0,
        })
        .collect()
}
fn default_leaf_colors() -> Vec<u32> {
    vec![0x82c62d, 0x76b02e, 0x96b02e, 0xbcd84d]
}
fn default_trunk_colors() -> Vec<u32> {
    vec![0x844734, 0x7b444a]
}
impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            enabled: default_features_enabled(),
            density_threshold: default_density_threshold(),
            jitter: default_jitter(),
            scale_min: default_scale_min(),
            scale_max: default_scale_max(),
            max_per_chunk: default_max_per_chunk(),
            varieties: default_varieties(),
            leaf_colors: default_leaf_colors(),
            trunk_colors: default_trunk_colors(),
        }
    }
}

pub fn load_terrain_config(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    Ok(cfg)
}
