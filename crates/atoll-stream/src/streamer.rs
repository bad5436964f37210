use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};

use atoll_geom::{GridCoord, Vec3};

use crate::config::StreamConfig;
use crate::error::{ContentFault, StreamError};
use crate::provider::{ChunkProvider, ObserverSource};
use crate::record::ChunkRecord;

/// Counters for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// `None` when the tick was skipped for lack of an observer.
    pub observer_chunk: Option<GridCoord>,
    pub created: usize,
    pub refined: usize,
    pub evicted: usize,
    /// Background results applied to registered chunks.
    pub completed: usize,
    pub active: usize,
}

impl TickReport {
    #[inline]
    pub fn skipped(active: usize) -> Self {
        Self {
            active,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.observer_chunk.is_none()
    }

    #[inline]
    pub fn changed(&self) -> bool {
        self.created + self.refined + self.evicted + self.completed > 0
    }
}

pub struct ChunkStreamer<P: ChunkProvider> {
    config: StreamConfig,
    visible_radius: i32,
    provider: P,
    records: HashMap<GridCoord, ChunkRecord<P::Chunk>>,
    faulted: HashSet<GridCoord>,
    observer_chunk: Option<GridCoord>,
    observer_present: bool,
    last_report: TickReport,
}

impl<P: ChunkProvider> ChunkStreamer<P> {
    pub fn new(config: StreamConfig, provider: P) -> Result<Self, StreamError<P::Error>> {
        config.validate()?;
        let visible_radius = config.chunks_visible_in_view();
        log::info!(
            target: "stream",
            "streamer ready: chunk {} view {} lods {} window ±{}",
            config.chunk_size,
            config.max_view_distance,
            config.lod_levels,
            visible_radius
        );
        Ok(Self {
            config,
            visible_radius,
            provider,
            records: HashMap::new(),
            faulted: HashSet::new(),
            observer_chunk: None,
            observer_present: true,
            last_report: TickReport::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    #[inline]
    pub fn chunks_visible_in_view(&self) -> i32 {
        self.visible_radius
    }

    #[inline]
    pub fn level_of_detail(&self, distance: f32) -> u32 {
        self.config.level_of_detail(distance)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, coord: GridCoord) -> Option<&ChunkRecord<P::Chunk>> {
        self.records.get(&coord)
    }

    #[inline]
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.records.contains_key(&coord)
    }

    pub fn records(&self) -> impl Iterator<Item = &ChunkRecord<P::Chunk>> {
        self.records.values()
    }

    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.records.keys().copied()
    }

    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[inline]
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    #[inline]
    pub fn observer_chunk(&self) -> Option<GridCoord> {
        self.observer_chunk
    }

    pub fn faulted_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.faulted.iter().copied()
    }

    #[inline]
    pub fn last_report(&self) -> TickReport {
        self.last_report
    }

    pub fn tick_from<S: ObserverSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<TickReport, StreamError<P::Error>> {
        self.tick(source.current_observer_position())
    }

    /// One streaming step around `observer`: apply finished background work,
    /// create or refine every chunk inside the view window, evict the rest.
    /// Content faults do not stop the sweep; they are reported once it ends.
    pub fn tick(&mut self, observer: Option<Vec3>) -> Result<TickReport, StreamError<P::Error>> {
        let Some(pos) = observer else {
            if self.observer_present {
                log::debug!(target: "stream", "no observer; streaming paused");
                self.observer_present = false;
            }
            self.last_report = TickReport::skipped(self.records.len());
            return Ok(self.last_report);
        };
        let Some(center) = self.observer_cell(pos) else {
            log::warn!(
                target: "stream",
                "observer at ({}, {}, {}) is off the chunk grid; tick skipped",
                pos.x,
                pos.y,
                pos.z
            );
            self.last_report = TickReport::skipped(self.records.len());
            return Ok(self.last_report);
        };
        if !self.observer_present {
            log::debug!(target: "stream", "observer back at ({:.1}, {:.1})", pos.x, pos.z);
            self.observer_present = true;
        }

        let mut report = TickReport::default();
        let mut faults: Vec<ContentFault<P::Error>> = Vec::new();

        for (coord, payload) in self.provider.poll_completed() {
            let Some(rec) = self.records.get_mut(&coord) else {
                log::debug!(target: "stream", "dropping result for evicted chunk {coord}");
                continue;
            };
            match self.provider.apply_completed(coord, &mut rec.content, rec.lod, payload) {
                Ok(true) => report.completed += 1,
                Ok(false) => {}
                Err(error) => {
                    report.completed += 1;
                    log::error!(target: "stream", "chunk {coord} failed: {error}");
                    faults.push(ContentFault { coord, error });
                }
            }
        }

        let chunk_size = self.config.chunk_size;
        let max = self.config.max_view_distance;
        let n = self.visible_radius;
        let side = (2 * n.max(0)) as usize;
        let mut visible: HashSet<GridCoord> = HashSet::with_capacity(side * side);

        for dx in -n..n {
            for dz in -n..n {
                let Some(coord) = center.offset(dx, dz) else {
                    continue;
                };
                let world_center = coord.world_center(chunk_size);
                let distance = world_center.horizontal_distance(pos);
                if distance >= max {
                    continue;
                }
                let lod = self.config.level_of_detail(distance);
                visible.insert(coord);
                if self.faulted.contains(&coord) {
                    continue;
                }
                let rec = match self.records.entry(coord) {
                    Entry::Occupied(o) => o.into_mut(),
                    Entry::Vacant(v) => match self.provider.create_chunk(coord, world_center) {
                        Ok(content) => {
                            report.created += 1;
                            log::trace!(target: "stream", "create {coord} at distance {distance:.1}");
                            v.insert(ChunkRecord::new(coord, world_center, content))
                        }
                        Err(error) => {
                            log::error!(target: "stream", "chunk {coord} failed: {error}");
                            self.faulted.insert(coord);
                            faults.push(ContentFault { coord, error });
                            continue;
                        }
                    },
                };
                if rec.lod != Some(lod) {
                    log::trace!(
                        target: "stream",
                        "refine {coord}: lod {} -> {lod}",
                        rec.current_lod()
                    );
                    let res = self.provider.refine_chunk(coord, &mut rec.content, lod);
                    rec.lod = Some(lod);
                    report.refined += 1;
                    if let Err(error) = res {
                        log::error!(target: "stream", "chunk {coord} failed at lod {lod}: {error}");
                        faults.push(ContentFault { coord, error });
                    }
                }
            }
        }

        let mut leaving: Vec<GridCoord> = self
            .records
            .keys()
            .filter(|c| !visible.contains(*c))
            .copied()
            .collect();
        leaving.sort_unstable();
        for coord in leaving {
            if let Some(rec) = self.records.remove(&coord) {
                log::trace!(target: "stream", "evict {coord}");
                self.provider.destroy_chunk(coord, rec.content);
                report.evicted += 1;
            }
        }
        self.faulted.retain(|c| visible.contains(c));

        report.observer_chunk = Some(center);
        report.active = self.records.len();
        if self.observer_chunk != Some(center) {
            log::debug!(target: "stream", "observer entered chunk {center}");
        }
        self.observer_chunk = Some(center);
        self.last_report = report;
        if report.changed() {
            log::trace!(
                target: "stream",
                "tick at {center}: +{} ~{} -{} done {} active {}",
                report.created,
                report.refined,
                report.evicted,
                report.completed,
                report.active
            );
        }

        if faults.is_empty() {
            Ok(report)
        } else {
            Err(StreamError::Content { faults, report })
        }
    }

    /// Grid cell of the observer, or `None` when the position is not finite
    /// or the view window around it would leave the `i32` grid.
    fn observer_cell(&self, pos: Vec3) -> Option<GridCoord> {
        let limit = i32::MAX as f32;
        let cx = pos.x / self.config.chunk_size;
        let cz = pos.z / self.config.chunk_size;
        if !(cx.is_finite() && cz.is_finite() && cx.abs() < limit && cz.abs() < limit) {
            return None;
        }
        let center = GridCoord::containing(pos, self.config.chunk_size);
        let n = self.visible_radius;
        center.offset(-n, -n)?;
        center.offset(n, n)?;
        Some(center)
    }

    /// Evicts every chunk through the provider.
    pub fn clear(&mut self) {
        let mut all: Vec<GridCoord> = self.records.keys().copied().collect();
        all.sort_unstable();
        for coord in all {
            if let Some(rec) = self.records.remove(&coord) {
                self.provider.destroy_chunk(coord, rec.content);
            }
        }
        self.faulted.clear();
        self.observer_chunk = None;
        log::debug!(target: "stream", "streamer cleared");
    }
}
