use atoll_geom::{GridCoord, Vec3};

/// Produces, refines, and releases chunk content on behalf of the streamer.
///
/// The streamer is the only writer of its registry; providers that generate
/// in the background hand results back through `poll_completed`, and the
/// streamer routes each payload to `apply_completed` while the chunk is
/// still registered. `apply_completed` answers whether the payload was
/// actually taken; superseded payloads return `Ok(false)`.
pub trait ChunkProvider {
    type Chunk;
    type Error: std::fmt::Debug + std::fmt::Display;
    type Payload;

    fn create_chunk(&mut self, coord: GridCoord, world_center: Vec3) -> Result<Self::Chunk, Self::Error>;

    fn refine_chunk(&mut self, coord: GridCoord, chunk: &mut Self::Chunk, lod: u32) -> Result<(), Self::Error>;

    fn destroy_chunk(&mut self, coord: GridCoord, chunk: Self::Chunk);

    fn poll_completed(&mut self) -> Vec<(GridCoord, Self::Payload)> {
        Vec::new()
    }

    fn apply_completed(
        &mut self,
        _coord: GridCoord,
        _chunk: &mut Self::Chunk,
        _lod: Option<u32>,
        _payload: Self::Payload,
    ) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

/// Where the streamer asks for the observer each tick.
pub trait ObserverSource {
    fn current_observer_position(&self) -> Option<Vec3>;
}

impl ObserverSource for Option<Vec3> {
    #[inline]
    fn current_observer_position(&self) -> Option<Vec3> {
        *self
    }
}

impl ObserverSource for Vec3 {
    #[inline]
    fn current_observer_position(&self) -> Option<Vec3> {
        Some(*self)
    }
}
