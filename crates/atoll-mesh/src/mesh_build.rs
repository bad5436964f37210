use atoll_chunk::Rgb;
use atoll_geom::Vec3;

/// Interleaving-free vertex arrays ready for GPU upload.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub idx: Vec<u16>,
    pub col: Vec<u8>,
}

impl MeshBuild {
    /// Pre-reserve capacity for a `width × width` vertex grid.
    #[inline]
    pub fn reserve_grid(&mut self, width: usize) {
        let verts = width * width;
        let quads = width.saturating_sub(1).pow(2);
        self.pos.reserve(verts * 3);
        self.norm.reserve(verts * 3);
        self.col.reserve(verts * 4);
        self.idx.reserve(quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }

    #[inline]
    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::new(self.norm[i * 3], self.norm[i * 3 + 1], self.norm[i * 3 + 2])
    }

    /// Appends an opaque vertex; its normal is filled in by `recompute_normals`.
    #[inline]
    pub fn push_vertex(&mut self, p: Vec3, rgb: Rgb) {
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        self.norm.extend_from_slice(&[0.0, 0.0, 0.0]);
        self.col.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.idx.extend_from_slice(&[a, b, c]);
    }

    /// Area-weighted vertex normals: each triangle adds its unnormalized face
    /// normal to its three corners.
    pub fn recompute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.vertex_count()];
        for tri in self.idx.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.vertex(a);
            let face = (self.vertex(b) - pa).cross(self.vertex(c) - pa);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        for (i, n) in acc.into_iter().enumerate() {
            let n = if n.length() > 0.0 { n.normalized() } else { Vec3::UP };
            self.norm[i * 3] = n.x;
            self.norm[i * 3 + 1] = n.y;
            self.norm[i * 3 + 2] = n.z;
        }
    }
}
