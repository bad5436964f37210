//! Poisson-disk island scatter.

use std::f32::consts::TAU;

use atoll_geom::Vec3;

use crate::config::IslandPlacement;
use crate::rng::SeededRng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Island {
    /// Ground-plane position (`y == 0`).
    pub position: Vec3,
    pub size: f32,
    pub height_multiplier: f32,
}

/// Background grid for neighbor rejection; each cell holds at most one point.
struct SampleGrid {
    cell: f32,
    cols: usize,
    rows: usize,
    slots: Vec<Option<usize>>,
}

impl SampleGrid {
    fn new(extent: f32, min_spacing: f32) -> Self {
        let cell = min_spacing / std::f32::consts::SQRT_2;
        let cols = ((extent / cell).ceil() as usize).max(1);
        let rows = cols;
        Self {
            cell,
            cols,
            rows,
            slots: vec![None; cols * rows],
        }
    }

    #[inline]
    fn cell_of(&self, x: f32, z: f32) -> (usize, usize) {
        let cx = ((x / self.cell) as usize).min(self.cols - 1);
        let cz = ((z / self.cell) as usize).min(self.rows - 1);
        (cx, cz)
    }

    fn insert(&mut self, x: f32, z: f32, id: usize) {
        let (cx, cz) = self.cell_of(x, z);
        self.slots[cz * self.cols + cx] = Some(id);
    }

    fn has_neighbor_within(&self, points: &[(f32, f32)], x: f32, z: f32, r: f32) -> bool {
        let (cx, cz) = self.cell_of(x, z);
        let r2 = r * r;
        let x0 = cx.saturating_sub(2);
        let z0 = cz.saturating_sub(2);
        let x1 = (cx + 2).min(self.cols - 1);
        let z1 = (cz + 2).min(self.rows - 1);
        for gz in z0..=z1 {
            for gx in x0..=x1 {
                if let Some(id) = self.slots[gz * self.cols + gx] {
                    let (px, pz) = points[id];
                    let dx = px - x;
                    let dz = pz - z;
                    if dx * dx + dz * dz < r2 {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Bridson sampling over `[0, region_size]²`: candidates are drawn from the
/// annulus `[min_spacing, max_spacing)` around a random active point, up to
/// `attempts` per point. Each accepted point then draws its size and height
/// multiplier from the same generator, in acceptance order.
pub fn place_islands(p: &IslandPlacement, rng: &mut SeededRng) -> Vec<Island> {
    let extent = p.region_size;
    let mut grid = SampleGrid::new(extent, p.min_spacing);
    let mut points: Vec<(f32, f32)> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let first = (rng.float(0.0, extent), rng.float(0.0, extent));
    grid.insert(first.0, first.1, 0);
    points.push(first);
    active.push(0);

    let min2 = p.min_spacing * p.min_spacing;
    let max2 = p.max_spacing * p.max_spacing;
    while let Some(slot) = rng.index(active.len()) {
        let (ax, az) = points[active[slot]];
        let mut accepted = false;
        for _ in 0..p.attempts {
            let angle = rng.float(0.0, TAU);
            let radius = (rng.float(0.0, 1.0) * (max2 - min2) + min2).sqrt();
            let x = ax + radius * angle.cos();
            let z = az + radius * angle.sin();
            if !(0.0..=extent).contains(&x) || !(0.0..=extent).contains(&z) {
                continue;
            }
            if grid.has_neighbor_within(&points, x, z, p.min_spacing) {
                continue;
            }
            let id = points.len();
            grid.insert(x, z, id);
            points.push((x, z));
            active.push(id);
            accepted = true;
            break;
        }
        if !accepted {
            active.swap_remove(slot);
        }
    }

    let islands: Vec<Island> = points
        .into_iter()
        .map(|(x, z)| Island {
            position: Vec3::flat(x, z),
            size: rng.float(p.size_min, p.size_max),
            height_multiplier: rng.float(p.height_min, p.height_max),
        })
        .collect();
    log::debug!(
        target: "terrain",
        "placed {} islands over {}x{}",
        islands.len(),
        extent,
        extent
    );
    islands
}

/// Nearest island on the XZ plane; the first of equally near islands wins.
pub fn nearest(islands: &[Island], p: Vec3) -> Option<&Island> {
    let mut best: Option<(&Island, f32)> = None;
    for island in islands {
        let d = island.position.horizontal_distance(p);
        match best {
            Some((_, bd)) if bd <= d => {}
            _ => best = Some((island, d)),
        }
    }
    best.map(|(island, _)| island)
}
