//! CPU terrain meshing: LOD grid meshes and static collider geometry (engine-only).
#![forbid(unsafe_code)]

mod collider;
mod grid;
mod mesh_build;

pub use collider::{TriMeshCollider, build_collider};
pub use grid::{TerrainMesh, build_lod_mesh, lod_divisor};
pub use mesh_build::MeshBuild;
