use std::error::Error;
use std::time::{Duration, Instant};

use atoll_geom::Vec3;
use atoll_runtime::{GenerationMode, MemoryEntities, TerrainStreamer, terrain_streamer};
use atoll_stream::{StreamError, TickReport};
use atoll_world::{GenError, Island};

use crate::config::AppConfig;

const CRUISE_HEIGHT: f32 = 200.0;
const SETTLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Polyline through island centers, sampled by arc length. A single island
/// gets a circle around it.
#[derive(Clone, Debug)]
pub struct FlightPath {
    points: Vec<Vec3>,
    total: f32,
}

impl FlightPath {
    pub fn through_islands(islands: &[Island], max_stops: usize) -> Self {
        let mut points: Vec<Vec3> = islands
            .iter()
            .take(max_stops.max(1))
            .map(|i| i.position.with_y(CRUISE_HEIGHT))
            .collect();
        if points.len() == 1 {
            let c = points[0];
            let r = islands[0].size.max(100.0);
            points = (0..=16)
                .map(|k| {
                    let a = k as f32 / 16.0 * std::f32::consts::TAU;
                    Vec3::new(c.x + r * a.cos(), CRUISE_HEIGHT, c.z + r * a.sin())
                })
                .collect();
        }
        let total = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        Self { points, total }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.total
    }

    /// Position at fraction `t` of the path, clamped to `[0, 1]`.
    pub fn at(&self, t: f32) -> Vec3 {
        let Some(first) = self.points.first().copied() else {
            return Vec3::new(0.0, CRUISE_HEIGHT, 0.0);
        };
        if self.total <= 0.0 {
            return first;
        }
        let mut left = t.clamp(0.0, 1.0) * self.total;
        for w in self.points.windows(2) {
            let seg = w[0].distance(w[1]);
            if left <= seg {
                if seg <= 0.0 {
                    return w[0];
                }
                return w[0] + (w[1] - w[0]) * (left / seg);
            }
            left -= seg;
        }
        self.points[self.points.len() - 1]
    }
}

#[derive(Clone, Debug, Default)]
pub struct HeadlessSummary {
    pub ticks: usize,
    pub last: TickReport,
    pub peak_active: usize,
    pub created: usize,
    pub evicted: usize,
    pub faults: usize,
    pub entities: usize,
    pub leaks: usize,
}

impl HeadlessSummary {
    #[inline]
    pub fn clean(&self) -> bool {
        self.faults == 0 && self.leaks == 0
    }
}

/// Folds one tick into the summary. Fault ticks still carry their counters.
fn absorb(summary: &mut HeadlessSummary, result: Result<TickReport, StreamError<GenError>>) {
    let report = match result {
        Ok(r) => r,
        Err(StreamError::Content { faults, report }) => {
            summary.faults += faults.len();
            report
        }
        Err(e) => {
            log::error!("{e}");
            summary.faults += 1;
            return;
        }
    };
    summary.created += report.created;
    summary.evicted += report.evicted;
    summary.peak_active = summary.peak_active.max(report.active);
}

/// Flies `ticks` steps along a path through the first few islands with an
/// in-memory entity store, then lets outstanding background work land.
pub fn run_headless(
    cfg: &AppConfig,
    ticks: usize,
    mode: GenerationMode,
) -> Result<HeadlessSummary, Box<dyn Error>> {
    let mut streamer: TerrainStreamer<MemoryEntities> =
        terrain_streamer(cfg.stream, cfg.terrain.clone(), MemoryEntities::new(), mode)?;
    let path = FlightPath::through_islands(streamer.provider().generator().islands(), 4);
    log::info!(
        "headless: {ticks} ticks over {:.0} units, {} islands placed",
        path.length(),
        streamer.provider().generator().islands().len()
    );

    let mut summary = HeadlessSummary::default();
    let steps = ticks.max(1);
    for i in 0..ticks {
        let t = i as f32 / (steps.saturating_sub(1).max(1)) as f32;
        let res = streamer.tick(Some(path.at(t)));
        absorb(&mut summary, res);
        summary.ticks += 1;
    }

    let end = path.at(1.0);
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    while streamer.provider().pending_jobs() > 0 {
        if Instant::now() > deadline {
            log::warn!(
                "headless: {} jobs still pending after {:?}",
                streamer.provider().pending_jobs(),
                SETTLE_TIMEOUT
            );
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
        let res = streamer.tick(Some(end));
        absorb(&mut summary, res);
    }

    summary.last = streamer.last_report();
    summary.entities = streamer.provider().entities().len();
    summary.leaks = streamer.provider().entities().leaks();
    if summary.entities != streamer.len() {
        log::warn!(
            "headless: {} entities for {} records",
            summary.entities,
            streamer.len()
        );
        summary.leaks += summary.entities.abs_diff(streamer.len());
    }
    Ok(summary)
}
