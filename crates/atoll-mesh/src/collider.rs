use atoll_chunk::HeightmapSample;
use atoll_geom::{Aabb, GridCoord, Vec3};

/// Static triangle mesh for the physics collaborator, always full resolution.
#[derive(Clone, Debug)]
pub struct TriMeshCollider {
    pub coord: GridCoord,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
    pub bbox: Aabb,
}

pub fn build_collider(hm: &HeightmapSample) -> TriMeshCollider {
    let width = hm.width();
    let mut vertices = Vec::with_capacity(width * width);
    for row in 0..width {
        for col in 0..width {
            vertices.push(hm.local_position(row, col));
        }
    }
    let mut indices = Vec::with_capacity(hm.segments * hm.segments * 2);
    let w = width as u32;
    for r in 0..hm.segments as u32 {
        for c in 0..hm.segments as u32 {
            let a = r * w + c;
            let b = (r + 1) * w + c;
            let cc = a + 1;
            let d = b + 1;
            indices.push([a, b, cc]);
            indices.push([cc, b, d]);
        }
    }
    let bbox = Aabb::from_points(&vertices).unwrap_or_default();
    TriMeshCollider {
        coord: hm.coord,
        vertices,
        indices,
        bbox,
    }
}
