use atoll_geom::{GridCoord, Vec3};

#[derive(Clone, Debug)]
pub struct ChunkRecord<C> {
    pub coord: GridCoord,
    pub world_center: Vec3,
    /// `None` until the first refinement.
    pub lod: Option<u32>,
    pub content: C,
}

impl<C> ChunkRecord<C> {
    #[inline]
    pub fn new(coord: GridCoord, world_center: Vec3, content: C) -> Self {
        Self {
            coord,
            world_center,
            lod: None,
            content,
        }
    }

    /// Stored level of detail, `-1` before the first refinement.
    #[inline]
    pub fn current_lod(&self) -> i32 {
        self.lod.map_or(-1, |l| l as i32)
    }
}
