use std::sync::Arc;

use atoll_geom::{GridCoord, Vec3};
use atoll_mesh::{build_collider, build_lod_mesh, lod_divisor};
use atoll_stream::ChunkProvider;
use atoll_world::{EmptyReason, GenError, GenOutcome, TerrainData, TerrainGenerator};

use crate::entities::{ChunkComponent, ChunkEntities, ChunkHandle, ComponentKind};
use crate::error::RuntimeError;
use crate::workers::{GenJob, GenOut, GenWorkers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationMode {
    /// Synthesize inside `create_chunk`.
    Inline,
    /// Synthesize on a worker pool; `0` picks the thread count automatically.
    Workers(usize),
}

#[derive(Clone, Debug)]
pub enum ChunkState {
    Pending { job_id: u64 },
    Empty(EmptyReason),
    Loaded(Arc<TerrainData>),
    Faulted,
}

#[derive(Clone, Debug)]
pub struct TerrainChunk {
    pub handle: ChunkHandle,
    pub state: ChunkState,
    pub has_mesh: bool,
    pub has_collider: bool,
    /// Divisor of the attached mesh.
    pub mesh_divisor: Option<usize>,
}

impl TerrainChunk {
    fn new(handle: ChunkHandle, state: ChunkState) -> Self {
        Self {
            handle,
            state,
            has_mesh: false,
            has_collider: false,
            mesh_divisor: None,
        }
    }

    #[inline]
    pub fn has_terrain_data(&self) -> bool {
        matches!(self.state, ChunkState::Loaded(_))
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, ChunkState::Pending { .. })
    }

    #[inline]
    pub fn is_faulted(&self) -> bool {
        matches!(self.state, ChunkState::Faulted)
    }

    #[inline]
    pub fn data(&self) -> Option<&Arc<TerrainData>> {
        match &self.state {
            ChunkState::Loaded(d) => Some(d),
            _ => None,
        }
    }
}

/// Adapts `TerrainGenerator` to the streamer: one entity per chunk, LOD
/// meshes swapped on refinement, collider present near the observer only.
pub struct TerrainProvider<E: ChunkEntities> {
    generator: Arc<TerrainGenerator>,
    entities: E,
    workers: Option<GenWorkers>,
    next_job_id: u64,
    outstanding: usize,
}

impl<E: ChunkEntities> TerrainProvider<E> {
    pub fn new(generator: Arc<TerrainGenerator>, entities: E, mode: GenerationMode) -> Result<Self, RuntimeError> {
        let workers = match mode {
            GenerationMode::Inline => None,
            GenerationMode::Workers(n) => Some(GenWorkers::new(generator.clone(), n)?),
        };
        Ok(Self {
            generator,
            entities,
            workers,
            next_job_id: 1,
            outstanding: 0,
        })
    }

    #[inline]
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    #[inline]
    pub fn entities(&self) -> &E {
        &self.entities
    }

    #[inline]
    pub fn entities_mut(&mut self) -> &mut E {
        &mut self.entities
    }

    #[inline]
    pub fn workers(&self) -> Option<&GenWorkers> {
        self.workers.as_ref()
    }

    /// Background jobs submitted whose results have not been drained yet.
    #[inline]
    pub fn pending_jobs(&self) -> usize {
        self.outstanding
    }

    fn state_from_outcome(&mut self, handle: ChunkHandle, outcome: GenOutcome) -> ChunkState {
        match outcome {
            GenOutcome::Empty(reason) => ChunkState::Empty(reason),
            GenOutcome::Loaded(data) => {
                if !data.features.is_empty() {
                    self.entities
                        .attach_component(handle, ChunkComponent::Features(data.features.clone()));
                }
                ChunkState::Loaded(Arc::new(data))
            }
        }
    }

    /// Swaps the render mesh if the sample stride changed, then applies the
    /// collider policy: attach at LOD 0, drop beyond LOD 1, keep at LOD 1.
    fn apply_lod(&mut self, chunk: &mut TerrainChunk, data: &TerrainData, lod: u32) {
        let divisor = lod_divisor(lod);
        if chunk.mesh_divisor != Some(divisor) {
            if chunk.has_mesh {
                self.entities.remove_component(chunk.handle, ComponentKind::Mesh);
            }
            let mesh = build_lod_mesh(&data.heightmap, lod);
            self.entities.attach_component(chunk.handle, ChunkComponent::Mesh(mesh));
            chunk.has_mesh = true;
            chunk.mesh_divisor = Some(divisor);
        }
        if lod == 0 && !chunk.has_collider {
            let collider = build_collider(&data.heightmap);
            self.entities
                .attach_component(chunk.handle, ChunkComponent::Collider(collider));
            chunk.has_collider = true;
        } else if lod > 1 && chunk.has_collider {
            self.entities.remove_component(chunk.handle, ComponentKind::Collider);
            chunk.has_collider = false;
        }
    }
}

impl<E: ChunkEntities> ChunkProvider for TerrainProvider<E> {
    type Chunk = TerrainChunk;
    type Error = GenError;
    type Payload = GenOut;

    fn create_chunk(&mut self, coord: GridCoord, world_center: Vec3) -> Result<TerrainChunk, GenError> {
        if let Some(workers) = &self.workers {
            let job_id = self.next_job_id;
            if workers.submit(GenJob { coord, job_id }) {
                self.next_job_id += 1;
                self.outstanding += 1;
                let handle = self.entities.spawn_chunk_entity(world_center);
                return Ok(TerrainChunk::new(handle, ChunkState::Pending { job_id }));
            }
            log::warn!(target: "runtime", "generation pool closed; building {coord} inline");
        }
        let outcome = self.generator.generate(coord)?;
        let handle = self.entities.spawn_chunk_entity(world_center);
        let state = self.state_from_outcome(handle, outcome);
        Ok(TerrainChunk::new(handle, state))
    }

    fn refine_chunk(&mut self, _coord: GridCoord, chunk: &mut TerrainChunk, lod: u32) -> Result<(), GenError> {
        if let ChunkState::Loaded(data) = &chunk.state {
            let data = Arc::clone(data);
            self.apply_lod(chunk, &data, lod);
        }
        Ok(())
    }

    fn destroy_chunk(&mut self, coord: GridCoord, chunk: TerrainChunk) {
        if chunk.is_pending() {
            log::trace!(target: "runtime", "chunk {coord} evicted before generation finished");
        }
        self.entities.destroy_chunk_entity(chunk.handle);
    }

    fn poll_completed(&mut self) -> Vec<(GridCoord, GenOut)> {
        let Some(workers) = &self.workers else {
            return Vec::new();
        };
        let results = workers.drain_results();
        self.outstanding = self.outstanding.saturating_sub(results.len());
        results.into_iter().map(|out| (out.coord, out)).collect()
    }

    fn apply_completed(
        &mut self,
        coord: GridCoord,
        chunk: &mut TerrainChunk,
        lod: Option<u32>,
        payload: GenOut,
    ) -> Result<bool, GenError> {
        match chunk.state {
            ChunkState::Pending { job_id } if job_id == payload.job_id => {}
            _ => {
                log::debug!(
                    target: "runtime",
                    "ignoring stale result for {coord} (job {})",
                    payload.job_id
                );
                return Ok(false);
            }
        }
        log::trace!(target: "runtime", "chunk {coord} generated in {} ms", payload.t_gen_ms);
        match payload.result {
            Ok(outcome) => {
                chunk.state = self.state_from_outcome(chunk.handle, outcome);
                if let (ChunkState::Loaded(data), Some(lod)) = (&chunk.state, lod) {
                    let data = Arc::clone(data);
                    self.apply_lod(chunk, &data, lod);
                }
                Ok(true)
            }
            Err(e) => {
                chunk.state = ChunkState::Faulted;
                Err(e)
            }
        }
    }
}
