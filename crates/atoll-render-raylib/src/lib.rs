//! Raylib-based GPU helpers: conversions, terrain mesh upload, feature drawing.
// Unsafe is required for Raylib mesh/model upload operations in this crate.

use atoll_geom::{Aabb, Vec3};
use atoll_mesh::TerrainMesh;
use atoll_world::FeatureInstance;
use raylib::prelude::*;

pub mod conv {
    use atoll_chunk::Rgb;
    use atoll_geom::Vec3;

    pub fn vec3_to_rl(v: Vec3) -> raylib::prelude::Vector3 {
        raylib::prelude::Vector3::new(v.x, v.y, v.z)
    }

    pub fn rgb_to_color(c: Rgb) -> raylib::prelude::Color {
        raylib::prelude::Color::new(c[0], c[1], c[2], 255)
    }
}

/// GPU copy of one chunk's terrain mesh, placed at the chunk's world center.
pub struct TerrainModel {
    pub origin: Vector3,
    /// World-space bounds.
    pub bbox: Aabb,
    pub model: Model,
}

pub fn upload_terrain_mesh(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    cpu: &TerrainMesh,
    world_center: Vec3,
) -> Option<TerrainModel> {
    let mb = &cpu.mesh;
    let v_count = mb.vertex_count();
    if v_count == 0 || mb.idx.is_empty() {
        return None;
    }
    let mut raw: raylib::ffi::Mesh = unsafe { std::mem::zeroed() };
    raw.vertexCount = v_count as i32;
    raw.triangleCount = mb.triangle_count() as i32;
    unsafe {
        let vbytes = (v_count * 3 * std::mem::size_of::<f32>()) as u32;
        let tbytes = (v_count * 2 * std::mem::size_of::<f32>()) as u32;
        let cbytes = (v_count * 4 * std::mem::size_of::<u8>()) as u32;
        let ibytes = (mb.idx.len() * std::mem::size_of::<u16>()) as u32;
        raw.vertices = raylib::ffi::MemAlloc(vbytes) as *mut f32;
        raw.normals = raylib::ffi::MemAlloc(vbytes) as *mut f32;
        // Zero-filled; terrain is untextured.
        raw.texcoords = raylib::ffi::MemAlloc(tbytes) as *mut f32;
        raw.colors = raylib::ffi::MemAlloc(cbytes) as *mut u8;
        raw.indices = raylib::ffi::MemAlloc(ibytes) as *mut u16;
        std::ptr::copy_nonoverlapping(mb.pos.as_ptr(), raw.vertices, v_count * 3);
        std::ptr::copy_nonoverlapping(mb.norm.as_ptr(), raw.normals, v_count * 3);
        std::ptr::copy_nonoverlapping(mb.col.as_ptr(), raw.colors, v_count * 4);
        std::ptr::copy_nonoverlapping(mb.idx.as_ptr(), raw.indices, mb.idx.len());
    }
    let mut mesh = unsafe { raylib::core::models::Mesh::from_raw(raw) };
    unsafe {
        mesh.upload(false);
    }
    let model = match rl.load_model_from_mesh(thread, unsafe { mesh.make_weak() }) {
        Ok(m) => m,
        Err(e) => {
            log::warn!(target: "render", "model upload failed for chunk {}: {e}", cpu.coord);
            return None;
        }
    };
    let origin = conv::vec3_to_rl(world_center);
    Some(TerrainModel {
        origin,
        bbox: cpu.bbox.translated(world_center),
        model,
    })
}

pub fn draw_terrain_model<D: RaylibDraw3D>(d3: &mut D, tm: &TerrainModel, wireframe: bool) {
    if wireframe {
        d3.draw_model_wires(&tm.model, tm.origin, 1.0, Color::DARKGRAY);
    } else {
        d3.draw_model(&tm.model, tm.origin, 1.0, Color::WHITE);
    }
}

/// Trunk cylinder plus a leaf cone per instance; positions are relative to
/// `chunk_center`.
pub fn draw_features<D: RaylibDraw3D>(d3: &mut D, chunk_center: Vec3, features: &[FeatureInstance]) {
    for f in features {
        let base = chunk_center + f.position;
        let s = f.scale;
        let trunk_h = 0.6 * s;
        d3.draw_cylinder(
            conv::vec3_to_rl(base),
            0.08 * s,
            0.12 * s,
            trunk_h,
            6,
            conv::rgb_to_color(f.trunk_color),
        );
        d3.draw_cylinder(
            conv::vec3_to_rl(base.with_y(base.y + trunk_h)),
            0.0,
            0.5 * s,
            1.4 * s,
            7,
            conv::rgb_to_color(f.leaf_color),
        );
    }
}

/// Flat sea surface centered under the camera.
pub fn draw_water_plane<D: RaylibDraw3D>(d3: &mut D, center: Vec3, level: f32, extent: f32) {
    d3.draw_plane(
        Vector3::new(center.x, level, center.z),
        Vector2::new(extent, extent),
        Color::new(40, 110, 190, 170),
    );
}
