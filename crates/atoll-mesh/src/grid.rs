use atoll_chunk::HeightmapSample;
use atoll_geom::{Aabb, GridCoord, Vec3};

use crate::mesh_build::MeshBuild;

/// Sample stride for a level of detail: full resolution for the two nearest
/// levels, then every 2nd and every 6th sample.
#[inline]
pub fn lod_divisor(lod: u32) -> usize {
    match lod {
        0 | 1 => 1,
        2 => 2,
        _ => 6,
    }
}

/// Render mesh for one chunk at one LOD, in chunk-local coordinates.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub coord: GridCoord,
    pub lod: u32,
    pub divisor: usize,
    pub bbox: Aabb,
    pub mesh: MeshBuild,
}

impl TerrainMesh {
    /// Vertices per edge.
    #[inline]
    pub fn width(&self) -> usize {
        self.mesh.vertex_count().isqrt()
    }
}

/// Decimates the heightmap by `lod_divisor(lod)` and triangulates the grid
/// with upward-facing counter-clockwise triangles.
pub fn build_lod_mesh(hm: &HeightmapSample, lod: u32) -> TerrainMesh {
    let mut divisor = lod_divisor(lod);
    if hm.segments % divisor != 0 {
        log::warn!(
            target: "mesh",
            "segments {} not divisible by {divisor}; meshing chunk {} at full resolution",
            hm.segments,
            hm.coord
        );
        divisor = 1;
    }
    let quads = hm.segments / divisor;
    let width = quads + 1;
    let mut mesh = MeshBuild::default();
    mesh.reserve_grid(width);
    let mut lo = Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut hi = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for r in 0..width {
        for c in 0..width {
            let (row, col) = (r * divisor, c * divisor);
            let p = hm.local_position(row, col);
            lo = lo.min(p);
            hi = hi.max(p);
            mesh.push_vertex(p, hm.color(row, col));
        }
    }
    for r in 0..quads {
        for c in 0..quads {
            let a = (r * width + c) as u16;
            let b = ((r + 1) * width + c) as u16;
            let cc = (r * width + c + 1) as u16;
            let d = ((r + 1) * width + c + 1) as u16;
            mesh.push_triangle(a, b, cc);
            mesh.push_triangle(cc, b, d);
        }
    }
    mesh.recompute_normals();
    TerrainMesh {
        coord: hm.coord,
        lod,
        divisor,
        bbox: Aabb::new(lo, hi),
        mesh,
    }
}
