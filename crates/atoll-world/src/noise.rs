use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Maps noise in `[-1, 1]` onto `[0, 1]`.
#[inline]
pub fn norm(n: f32) -> f32 {
    (n + 1.0) * 0.5
}

/// Folds a 64-bit seed into the 32-bit seed FastNoiseLite takes.
#[inline]
pub fn noise_seed(seed: u64) -> i32 {
    (seed ^ (seed >> 32)) as i32
}

/// Seeded 3D OpenSimplex2 source at unit frequency; callers scale coordinates.
pub struct TerrainNoise {
    inner: FastNoiseLite,
    seed: i32,
}

impl TerrainNoise {
    pub fn new(seed: i32) -> Self {
        let mut inner = FastNoiseLite::with_seed(seed);
        inner.set_noise_type(Some(NoiseType::OpenSimplex2));
        inner.set_frequency(Some(1.0));
        Self { inner, seed }
    }

    /// Value in `[-1, 1]`.
    #[inline]
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self.inner.get_noise_3d(x, y, z).clamp(-1.0, 1.0)
    }

    /// `norm(sample(x / scale, 0, z / scale))`.
    #[inline]
    pub fn sample_layer(&self, x: f32, z: f32, scale: f32) -> f32 {
        norm(self.sample(x / scale, 0.0, z / scale))
    }
}

impl std::fmt::Debug for TerrainNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainNoise").field("seed", &self.seed).finish()
    }
}
