//! Heightmap buffers and height band classification for terrain chunks.
#![forbid(unsafe_code)]

use std::fmt;

use atoll_geom::{GridCoord, Vec3};

pub type Rgb = [u8; 3];

pub const SAND: Rgb = [0xF4, 0xA4, 0x60];
pub const GRASS: Rgb = [0x82, 0xC6, 0x2D];
pub const SNOW: Rgb = [0xFF, 0xFF, 0xFF];

#[inline]
pub const fn rgb_from_hex(hex: u32) -> Rgb {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeightBand {
    Sand,
    Grass,
    Snow,
}

impl HeightBand {
    #[inline]
    pub fn color(self) -> Rgb {
        match self {
            HeightBand::Sand => SAND,
            HeightBand::Grass => GRASS,
            HeightBand::Snow => SNOW,
        }
    }
}

/// Height thresholds separating the color bands. A height equal to a
/// threshold belongs to the upper band.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BandThresholds {
    pub grass_from: f32,
    pub snow_from: f32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            grass_from: 80.0,
            snow_from: 160.0,
        }
    }
}

impl BandThresholds {
    #[inline]
    pub fn classify(&self, h: f32) -> HeightBand {
        if h < self.grass_from {
            HeightBand::Sand
        } else if h < self.snow_from {
            HeightBand::Grass
        } else {
            HeightBand::Snow
        }
    }
}

/// Buffer lengths handed to [`HeightmapSample::from_parts`] did not match
/// the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SampleShapeError {
    pub expected: usize,
    pub heights: usize,
    pub colors: usize,
}

impl fmt::Display for SampleShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "heightmap needs {} samples, got {} heights and {} colors",
            self.expected, self.heights, self.colors
        )
    }
}

impl std::error::Error for SampleShapeError {}

/// Square grid of `(segments + 1)²` height samples centered on a chunk.
/// Row runs along +Z, column along +X.
#[derive(Clone, Debug)]
pub struct HeightmapSample {
    pub coord: GridCoord,
    pub segments: usize,
    pub size: f32,
    pub heights: Vec<f32>,
    pub colors: Vec<Rgb>,
}

impl HeightmapSample {
    /// Both buffers must hold exactly `(segments + 1)²` entries.
    pub fn from_parts(
        coord: GridCoord,
        segments: usize,
        size: f32,
        heights: Vec<f32>,
        colors: Vec<Rgb>,
    ) -> Result<Self, SampleShapeError> {
        let expected = (segments + 1) * (segments + 1);
        if heights.len() != expected || colors.len() != expected {
            return Err(SampleShapeError {
                expected,
                heights: heights.len(),
                colors: colors.len(),
            });
        }
        Ok(Self {
            coord,
            segments,
            size,
            heights,
            colors,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.segments + 1
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        row * self.width() + col
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.size / self.segments as f32
    }

    #[inline]
    pub fn height(&self, row: usize, col: usize) -> f32 {
        self.heights[self.idx(row, col)]
    }

    #[inline]
    pub fn color(&self, row: usize, col: usize) -> Rgb {
        self.colors[self.idx(row, col)]
    }

    /// Vertex position relative to the chunk center, in `[-size/2, size/2]`.
    #[inline]
    pub fn local_position(&self, row: usize, col: usize) -> Vec3 {
        let half = self.size * 0.5;
        let step = self.step();
        Vec3::new(
            -half + col as f32 * step,
            self.height(row, col),
            -half + row as f32 * step,
        )
    }

    #[inline]
    pub fn max_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    #[inline]
    pub fn any_above(&self, level: f32) -> bool {
        self.heights.iter().any(|h| *h > level)
    }

    #[inline]
    pub fn occupancy(&self, water_level: f32) -> ChunkOccupancy {
        if self.any_above(water_level) {
            ChunkOccupancy::Land
        } else {
            ChunkOccupancy::Submerged
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkOccupancy {
    Submerged,
    Land,
}

impl ChunkOccupancy {
    #[inline]
    pub fn is_submerged(self) -> bool {
        matches!(self, ChunkOccupancy::Submerged)
    }

    #[inline]
    pub fn has_land(self) -> bool {
        matches!(self, ChunkOccupancy::Land)
    }
}
