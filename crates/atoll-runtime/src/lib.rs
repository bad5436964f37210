//! Terrain chunk provider, entity collaborator seam, and generation workers.
#![forbid(unsafe_code)]

mod entities;
mod error;
mod provider;
mod workers;

use std::sync::Arc;

use atoll_stream::{ChunkStreamer, StreamConfig};
use atoll_world::{TerrainConfig, TerrainGenerator};

pub use entities::{
    ChunkComponent, ChunkEntities, ChunkHandle, ComponentKind, MemoryEntities, MemoryEntity,
};
pub use error::RuntimeError;
pub use provider::{ChunkState, GenerationMode, TerrainChunk, TerrainProvider};
pub use workers::{GenJob, GenOut, GenWorkers};

pub type TerrainStreamer<E> = ChunkStreamer<TerrainProvider<E>>;

/// Places islands, starts workers if asked, and wires a streamer around them.
pub fn terrain_streamer<E: ChunkEntities>(
    stream: StreamConfig,
    terrain: TerrainConfig,
    entities: E,
    mode: GenerationMode,
) -> Result<TerrainStreamer<E>, RuntimeError> {
    stream.validate()?;
    let generator = Arc::new(TerrainGenerator::new(terrain, stream.chunk_size)?);
    let provider = TerrainProvider::new(generator, entities, mode)?;
    Ok(ChunkStreamer::new(stream, provider)?)
}
