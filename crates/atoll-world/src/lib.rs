//! Island placement, heightmap synthesis, and terrain generation parameters.
#![forbid(unsafe_code)]

pub mod config;
pub mod features;
mod generator;
pub mod islands;
mod noise;
mod rng;

pub use config::{
    BandConfig, FeatureVariety, FeaturesConfig, IslandPlacement, NoiseLayer, NoiseLayers,
    TerrainConfig, load_terrain_config,
};
pub use features::FeatureInstance;
pub use generator::{EmptyReason, GenError, GenOutcome, TerrainData, TerrainGenerator};
pub use islands::Island;
pub use noise::{TerrainNoise, noise_seed, norm};
pub use rng::SeededRng;
