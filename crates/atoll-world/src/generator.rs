use std::fmt;

use atoll_chunk::{BandThresholds, HeightmapSample};
use atoll_geom::{GridCoord, Vec3};

use crate::config::TerrainConfig;
use crate::features::{FeatureInstance, scatter_features};
use crate::islands::{self, Island};
use crate::noise::{TerrainNoise, noise_seed};
use crate::rng::SeededRng;

/// Every LOD mesh divisor must split the full-resolution grid evenly.
pub const LOD_DIVISORS: [usize; 3] = [1, 2, 6];
/// Largest grid that still fits 16-bit mesh indices: `(254 + 1)² <= u16::MAX`.
pub const MAX_SEGMENTS: usize = 254;

#[derive(Clone, Debug, PartialEq)]
pub enum GenError {
    InvalidConfig(String),
    NoIslands,
    NegativeHeight {
        coord: GridCoord,
        world_x: f32,
        world_z: f32,
        height: f32,
    },
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::InvalidConfig(msg) => write!(f, "invalid terrain config: {msg}"),
            GenError::NoIslands => write!(f, "island placement produced no islands"),
            GenError::NegativeHeight {
                coord,
                world_x,
                world_z,
                height,
            } => write!(
                f,
                "negative height {height:.3} at world ({world_x:.2}, {world_z:.2}) in chunk {coord}"
            ),
        }
    }
}

impl std::error::Error for GenError {}

impl GenError {
    #[inline]
    pub fn is_content_fault(&self) -> bool {
        matches!(self, GenError::NegativeHeight { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyReason {
    /// Gated out: no island close enough to the chunk center.
    NoNearbyIsland,
    /// Synthesized, but every sample is at or below the water level.
    BelowWater,
}

/// Cached result of synthesizing one chunk; never recomputed on LOD change.
#[derive(Clone, Debug)]
pub struct TerrainData {
    pub heightmap: HeightmapSample,
    pub features: Vec<FeatureInstance>,
}

#[derive(Clone, Debug)]
pub enum GenOutcome {
    Empty(EmptyReason),
    Loaded(TerrainData),
}

impl GenOutcome {
    #[inline]
    pub fn has_terrain_data(&self) -> bool {
        matches!(self, GenOutcome::Loaded(_))
    }
}

/// Owns the island set and the noise source. Immutable after construction, so
/// it can be shared across worker threads behind an `Arc`.
#[derive(Debug)]
pub struct TerrainGenerator {
    config: TerrainConfig,
    chunk_size: f32,
    islands: Vec<Island>,
    noise: TerrainNoise,
    bands: BandThresholds,
}

impl TerrainGenerator {
    pub fn new(config: TerrainConfig, chunk_size: f32) -> Result<Self, GenError> {
        validate(&config, chunk_size)?;
        let mut rng = SeededRng::new(config.seed);
        let islands = islands::place_islands(&config.islands, &mut rng);
        Self::assemble(config, chunk_size, islands)
    }

    /// Builds a generator around an explicit island list.
    pub fn with_islands(
        config: TerrainConfig,
        chunk_size: f32,
        islands: Vec<Island>,
    ) -> Result<Self, GenError> {
        validate(&config, chunk_size)?;
        Self::assemble(config, chunk_size, islands)
    }

    fn assemble(config: TerrainConfig, chunk_size: f32, islands: Vec<Island>) -> Result<Self, GenError> {
        if islands.is_empty() {
            return Err(GenError::NoIslands);
        }
        let noise = TerrainNoise::new(noise_seed(config.seed));
        let bands = config.bands.thresholds();
        log::info!(
            target: "terrain",
            "terrain generator ready: {} islands, seed {}, {} segments, chunk size {}",
            islands.len(),
            config.seed,
            config.segments,
            chunk_size
        );
        Ok(Self {
            config,
            chunk_size,
            islands,
            noise,
            bands,
        })
    }

    #[inline]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    #[inline]
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    #[inline]
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    #[inline]
    pub fn bands(&self) -> BandThresholds {
        self.bands
    }

    #[inline]
    pub fn nearest_island(&self, p: Vec3) -> Option<&Island> {
        islands::nearest(&self.islands, p)
    }

    /// True iff the nearest island is closer to the chunk center than
    /// `island.size + chunk_size`.
    pub fn should_generate(&self, coord: GridCoord) -> bool {
        let center = coord.world_center(self.chunk_size);
        match self.nearest_island(center) {
            Some(island) => island.position.horizontal_distance(center) < island.size + self.chunk_size,
            None => false,
        }
    }

    /// Raw height at a world position. Can be negative for hostile island
    /// parameters; callers decide how to treat that.
    pub fn height_at(&self, wx: f32, wz: f32) -> f32 {
        let p = Vec3::flat(wx, wz);
        let Some(island) = self.nearest_island(p) else {
            return self.config.base_height;
        };
        let layers = &self.config.noise;
        let app = (island.position.horizontal_distance(p) / island.size).clamp(0.0, 1.0);
        let mut h = self.noise.sample_layer(wx, wz, layers.continent.scale) * layers.continent.amplitude
            + self.noise.sample_layer(wx, wz, layers.hills.scale) * layers.hills.amplitude;
        h *= 1.0 - app;
        h += self.noise.sample_layer(wx, wz, layers.detail.scale) * layers.detail.amplitude;
        h *= island.height_multiplier;
        h + self.config.base_height
    }

    /// Samples the `(segments + 1)²` grid covering the chunk square centered
    /// on its world center. Aborts on the first negative height.
    pub fn sample_heightmap(&self, coord: GridCoord) -> Result<HeightmapSample, GenError> {
        let segments = self.config.segments;
        let width = segments + 1;
        let center = coord.world_center(self.chunk_size);
        let half = self.chunk_size * 0.5;
        let step = self.chunk_size / segments as f32;
        let mut heights = Vec::with_capacity(width * width);
        let mut colors = Vec::with_capacity(width * width);
        for row in 0..width {
            let wz = center.z - half + row as f32 * step;
            for col in 0..width {
                let wx = center.x - half + col as f32 * step;
                let h = self.height_at(wx, wz);
                if h < 0.0 {
                    return Err(GenError::NegativeHeight {
                        coord,
                        world_x: wx,
                        world_z: wz,
                        height: h,
                    });
                }
                heights.push(h);
                colors.push(self.bands.classify(h).color());
            }
        }
        Ok(HeightmapSample {
            coord,
            segments,
            size: self.chunk_size,
            heights,
            colors,
        })
    }

    /// Gating, synthesis, water test, and feature scattering for one chunk.
    pub fn generate(&self, coord: GridCoord) -> Result<GenOutcome, GenError> {
        if !self.should_generate(coord) {
            log::trace!(target: "terrain", "chunk {coord} gated out");
            return Ok(GenOutcome::Empty(EmptyReason::NoNearbyIsland));
        }
        let heightmap = self.sample_heightmap(coord)?;
        if heightmap.occupancy(self.config.water_level).is_submerged() {
            log::trace!(target: "terrain", "chunk {coord} below water");
            return Ok(GenOutcome::Empty(EmptyReason::BelowWater));
        }
        let features = scatter_features(
            &self.config.features,
            &self.noise,
            &self.bands,
            self.config.seed,
            &heightmap,
            coord.world_center(self.chunk_size),
        );
        log::debug!(
            target: "terrain",
            "chunk {coord} loaded: max height {:.1}, {} features",
            heightmap.max_height(),
            features.len()
        );
        Ok(GenOutcome::Loaded(TerrainData {
            heightmap,
            features,
        }))
    }
}

fn validate(cfg: &TerrainConfig, chunk_size: f32) -> Result<(), GenError> {
    let bad = |msg: String| Err(GenError::InvalidConfig(msg));
    if !(chunk_size.is_finite() && chunk_size > 0.0) {
        return bad(format!("chunk size must be positive, got {chunk_size}"));
    }
    if cfg.segments == 0 || cfg.segments > MAX_SEGMENTS {
        return bad(format!("segments must be in 1..={MAX_SEGMENTS}, got {}", cfg.segments));
    }
    if let Some(d) = LOD_DIVISORS.iter().find(|d| cfg.segments % **d != 0) {
        return bad(format!("segments {} not divisible by LOD divisor {d}", cfg.segments));
    }
    let layers = [&cfg.noise.continent, &cfg.noise.hills, &cfg.noise.detail];
    if layers.iter().any(|l| !(l.scale.is_finite() && l.scale > 0.0)) {
        return bad("noise layer scales must be positive".to_string());
    }
    let p = &cfg.islands;
    if !(p.region_size.is_finite() && p.region_size > 0.0) {
        return bad(format!("island region size must be positive, got {}", p.region_size));
    }
    if !(p.min_spacing > 0.0 && p.min_spacing <= p.max_spacing && p.max_spacing.is_finite()) {
        return bad(format!(
            "island spacing must satisfy 0 < min <= max, got {}..{}",
            p.min_spacing, p.max_spacing
        ));
    }
    if p.attempts == 0 {
        return bad("island attempts must be positive".to_string());
    }
    if !(p.size_min < p.size_max) {
        return bad(format!("island size range {}..{} is empty", p.size_min, p.size_max));
    }
    if !(p.size_min > 0.0) {
        return bad(format!("island size must be positive, got {}", p.size_min));
    }
    if !(p.height_min < p.height_max) {
        return bad(format!(
            "island height range {}..{} is empty",
            p.height_min, p.height_max
        ));
    }
    let f = &cfg.features;
    if f.scale_min > f.scale_max {
        return bad(format!("feature scale range {}..={} is empty", f.scale_min, f.scale_max));
    }
    Ok(())
}
