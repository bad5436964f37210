use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use atoll_stream::StreamConfig;
use atoll_world::TerrainConfig;

/// Everything the binary reads from its TOML file. Missing tables fall back
/// to their defaults, so an empty file is a valid configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub viewer: ViewerSection,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ViewerSection {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_fps")]
    pub target_fps: u32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Chunks farther than this from the camera skip feature drawing.
    #[serde(default = "default_feature_distance")]
    pub feature_distance: f32,
    #[serde(default = "default_start_height")]
    pub start_height: f32,
    /// Generation threads; 0 sizes the pool from the machine.
    #[serde(default)]
    pub workers: usize,
}

fn default_width() -> i32 {
    1280
}
fn default_height() -> i32 {
    720
}
fn default_fps() -> u32 {
    60
}
fn default_move_speed() -> f32 {
    120.0
}
fn default_feature_distance() -> f32 {
    1000.0
}
fn default_start_height() -> f32 {
    250.0
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            target_fps: default_fps(),
            move_speed: default_move_speed(),
            feature_distance: default_feature_distance(),
            start_height: default_start_height(),
            workers: 0,
        }
    }
}

pub fn load_app_config(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.stream, StreamConfig::default());
        assert_eq!(cfg.terrain.segments, TerrainConfig::default().segments);
        assert_eq!(cfg.viewer.width, 1280);
        assert_eq!(cfg.viewer.workers, 0);
    }

    #[test]
    fn sections_override_independently() {
        let src = r#"
            [stream]
            max_view_distance = 2000.0

            [terrain]
            seed = 7
            water_level = 40.0

            [viewer]
            workers = 3
        "#;
        let cfg: AppConfig = toml::from_str(src).unwrap();
        assert_eq!(cfg.stream.max_view_distance, 2000.0);
        assert_eq!(cfg.stream.chunk_size, 250.0);
        assert_eq!(cfg.terrain.seed, 7);
        assert_eq!(cfg.terrain.water_level, 40.0);
        assert_eq!(cfg.terrain.segments, 60);
        assert_eq!(cfg.viewer.workers, 3);
        assert_eq!(cfg.viewer.target_fps, 60);
    }
}
