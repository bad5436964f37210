use serde::Deserialize;

use atoll_geom::round_half_up;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct StreamConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f32,
    #[serde(default = "default_max_view_distance")]
    pub max_view_distance: f32,
    #[serde(default = "default_lod_levels")]
    pub lod_levels: u32,
}

fn default_chunk_size() -> f32 {
    250.0
}
fn default_max_view_distance() -> f32 {
    5000.0
}
fn default_lod_levels() -> u32 {
    16
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_view_distance: default_max_view_distance(),
            lod_levels: default_lod_levels(),
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(ConfigError::ChunkSize(self.chunk_size));
        }
        if !(self.max_view_distance.is_finite() && self.max_view_distance > 0.0) {
            return Err(ConfigError::ViewDistance(self.max_view_distance));
        }
        if self.lod_levels == 0 {
            return Err(ConfigError::ZeroLodLevels);
        }
        Ok(())
    }

    /// Half-width of the swept window, in chunks.
    #[inline]
    pub fn chunks_visible_in_view(&self) -> i32 {
        round_half_up(self.max_view_distance / self.chunk_size)
    }

    /// `floor(distance / max_view_distance * lod_levels)`, clamped to the last
    /// level so float round-up at the far edge never produces an extra level.
    #[inline]
    pub fn level_of_detail(&self, distance: f32) -> u32 {
        let raw = (distance / self.max_view_distance * self.lod_levels as f32).floor();
        (raw.max(0.0) as u32).min(self.lod_levels - 1)
    }
}
