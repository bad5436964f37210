use atoll_geom::{GridCoord, Vec3};
use atoll_stream::{ChunkProvider, ChunkStreamer, ConfigError, StreamConfig, StreamError};
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
struct Recorder {
    created: Vec<GridCoord>,
    refined: Vec<(GridCoord, u32)>,
    destroyed: Vec<GridCoord>,
    fail_at: HashSet<GridCoord>,
    pending: Vec<(GridCoord, u32)>,
    applied: Vec<(GridCoord, Option<u32>, u32)>,
}

#[derive(Debug, PartialEq)]
struct Cell {
    lod_seen: Vec<u32>,
    payloads: Vec<u32>,
}

impl ChunkProvider for Recorder {
    type Chunk = Cell;
    type Error = String;
    type Payload = u32;

    fn create_chunk(&mut self, coord: GridCoord, _world_center: Vec3) -> Result<Cell, String> {
        if self.fail_at.contains(&coord) {
            return Err(format!("bad terrain at {coord}"));
        }
        self.created.push(coord);
        Ok(Cell {
            lod_seen: Vec::new(),
            payloads: Vec::new(),
        })
    }

    fn refine_chunk(&mut self, coord: GridCoord, chunk: &mut Cell, lod: u32) -> Result<(), String> {
        self.refined.push((coord, lod));
        chunk.lod_seen.push(lod);
        Ok(())
    }

    fn destroy_chunk(&mut self, coord: GridCoord, _chunk: Cell) {
        self.destroyed.push(coord);
    }

    fn poll_completed(&mut self) -> Vec<(GridCoord, u32)> {
        std::mem::take(&mut self.pending)
    }

    fn apply_completed(
        &mut self,
        coord: GridCoord,
        chunk: &mut Cell,
        lod: Option<u32>,
        payload: u32,
    ) -> Result<bool, String> {
        // Payloads from 100 up stand for superseded jobs.
        if payload >= 100 {
            return Ok(false);
        }
        self.applied.push((coord, lod, payload));
        chunk.payloads.push(payload);
        if payload == 0 {
            return Err("empty payload".to_string());
        }
        Ok(true)
    }
}

fn default_streamer() -> ChunkStreamer<Recorder> {
    ChunkStreamer::new(StreamConfig::default(), Recorder::default()).unwrap()
}

/// Expected active set by brute force over the documented window.
fn expected(cfg: &StreamConfig, pos: Vec3) -> BTreeMap<GridCoord, u32> {
    let n = cfg.chunks_visible_in_view();
    let center = GridCoord::containing(pos, cfg.chunk_size);
    let mut out = BTreeMap::new();
    for dx in -n..n {
        for dz in -n..n {
            let c = center.offset(dx, dz).unwrap();
            let d = c.world_center(cfg.chunk_size).horizontal_distance(pos);
            if d < cfg.max_view_distance {
                let lod = ((d / cfg.max_view_distance) * cfg.lod_levels as f32).floor() as u32;
                out.insert(c, lod.min(cfg.lod_levels - 1));
            }
        }
    }
    out
}

#[test]
fn origin_window_matches_reference_example() {
    let mut s = default_streamer();
    assert_eq!(s.chunks_visible_in_view(), 20);
    let report = s.tick(Some(Vec3::new(0.0, 123.0, 0.0))).unwrap();
    let want = expected(s.config(), Vec3::ZERO);
    assert_eq!(report.observer_chunk, Some(GridCoord::new(0, 0)));
    assert_eq!(report.created, want.len());
    assert_eq!(report.refined, want.len());
    assert_eq!(report.active, want.len());
    for (coord, lod) in &want {
        let rec = s.get(*coord).expect("visible chunk registered");
        assert_eq!(rec.lod, Some(*lod));
        assert_eq!(rec.content.lod_seen, vec![*lod]);
    }
    // Lower bound inclusive, upper exclusive, and 5000 itself excluded.
    assert!(s.contains(GridCoord::new(-19, 0)));
    assert!(!s.contains(GridCoord::new(-20, 0)));
    assert!(!s.contains(GridCoord::new(20, 0)));
    assert!(s.contains(GridCoord::new(19, 0)));
    assert_eq!(s.get(GridCoord::new(0, 0)).unwrap().lod, Some(0));
}

#[test]
fn level_of_detail_edges() {
    let s = default_streamer();
    assert_eq!(s.level_of_detail(0.0), 0);
    assert_eq!(s.level_of_detail(312.4), 0);
    assert_eq!(s.level_of_detail(312.5), 1);
    assert_eq!(s.level_of_detail(4999.0), 15);
    assert_eq!(s.level_of_detail(4999.999), 15);
}

#[test]
fn second_tick_at_same_position_is_idempotent() {
    let mut s = default_streamer();
    let p = Vec3::new(410.0, 0.0, -77.0);
    s.tick(Some(p)).unwrap();
    let calls = (s.provider().created.len(), s.provider().refined.len());
    let report = s.tick(Some(p)).unwrap();
    assert!(!report.changed());
    assert_eq!(report.active, s.len());
    assert_eq!((s.provider().created.len(), s.provider().refined.len()), calls);
    assert!(s.provider().destroyed.is_empty());
}

#[test]
fn moving_observer_refines_and_evicts() {
    let mut s = default_streamer();
    s.tick(Some(Vec3::ZERO)).unwrap();
    let before: HashSet<GridCoord> = s.coords().collect();
    let p = Vec3::new(1000.0, 0.0, 0.0);
    let report = s.tick(Some(p)).unwrap();
    let want = expected(s.config(), p);
    let after: HashSet<GridCoord> = s.coords().collect();
    assert_eq!(after, want.keys().copied().collect::<HashSet<_>>());
    let left: HashSet<GridCoord> = before.difference(&after).copied().collect();
    assert_eq!(report.evicted, left.len());
    assert_eq!(s.provider().destroyed.iter().copied().collect::<HashSet<_>>(), left);
    for (coord, lod) in want {
        assert_eq!(s.get(coord).unwrap().current_lod(), lod as i32);
    }
    // The origin chunk stepped away from LOD 0.
    assert_eq!(s.get(GridCoord::new(0, 0)).unwrap().content.lod_seen, vec![0, 3]);
}

#[test]
fn missing_observer_skips_without_touching_chunks() {
    let mut s = default_streamer();
    let r = s.tick(None).unwrap();
    assert!(r.is_skipped());
    assert!(s.is_empty());
    s.tick(Some(Vec3::ZERO)).unwrap();
    let n = s.len();
    let r = s.tick_from(&None::<Vec3>).unwrap();
    assert!(r.is_skipped());
    assert_eq!(r.active, n);
    assert_eq!(s.len(), n);
    assert!(s.provider().destroyed.is_empty());
}

#[test]
fn malformed_config_fails_fast() {
    let bad = [
        (StreamConfig { chunk_size: 0.0, ..StreamConfig::default() }, ConfigError::ChunkSize(0.0)),
        (
            StreamConfig { max_view_distance: -1.0, ..StreamConfig::default() },
            ConfigError::ViewDistance(-1.0),
        ),
        (StreamConfig { lod_levels: 0, ..StreamConfig::default() }, ConfigError::ZeroLodLevels),
    ];
    for (cfg, want) in bad {
        match ChunkStreamer::new(cfg, Recorder::default()) {
            Err(StreamError::Config(e)) => assert_eq!(e, want),
            _ => panic!("expected config error for {cfg:?}"),
        }
    }
    let nan = StreamConfig { chunk_size: f32::NAN, ..StreamConfig::default() };
    assert!(ChunkStreamer::new(nan, Recorder::default()).is_err());
}

#[test]
fn creation_fault_finishes_sweep_and_is_not_retried_while_visible() {
    let bad = GridCoord::new(1, 1);
    let mut provider = Recorder::default();
    provider.fail_at.insert(bad);
    let mut s = ChunkStreamer::new(StreamConfig::default(), provider).unwrap();
    let err = s.tick(Some(Vec3::ZERO)).unwrap_err();
    let StreamError::Content { faults, report } = err else {
        panic!("expected content fault");
    };
    assert_eq!(report, s.last_report());
    assert_eq!(report.created, s.len());
    assert_eq!(report.active, s.len());
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].coord, bad);
    assert!(!s.contains(bad));
    assert_eq!(s.len(), expected(s.config(), Vec3::ZERO).len() - 1);
    assert_eq!(s.faulted_coords().collect::<Vec<_>>(), vec![bad]);
    assert_eq!(s.last_report().created, s.len());

    // Still visible: no retry, no new fault.
    s.tick(Some(Vec3::ZERO)).unwrap();
    assert!(s.faulted_coords().any(|c| c == bad));

    // Out of view then back: retried.
    s.tick(Some(Vec3::new(50_000.0, 0.0, 0.0))).unwrap();
    assert_eq!(s.faulted_coords().count(), 0);
    assert!(s.tick(Some(Vec3::ZERO)).is_err());
}

#[test]
fn completed_payloads_reach_registered_chunks_only() {
    let mut s = default_streamer();
    s.tick(Some(Vec3::ZERO)).unwrap();
    s.provider_mut().pending = vec![(GridCoord::new(0, 0), 7), (GridCoord::new(900, 900), 8)];
    let report = s.tick(Some(Vec3::ZERO)).unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(s.provider().applied, vec![(GridCoord::new(0, 0), Some(0), 7)]);
    assert_eq!(s.get(GridCoord::new(0, 0)).unwrap().content.payloads, vec![7]);

    s.provider_mut().pending = vec![(GridCoord::new(2, 0), 0)];
    match s.tick(Some(Vec3::ZERO)) {
        Err(StreamError::Content { faults, report }) => {
            assert_eq!(faults[0].coord, GridCoord::new(2, 0));
            assert_eq!(report.completed, 1);
        }
        other => panic!("expected content fault, got {other:?}"),
    }
    assert!(s.contains(GridCoord::new(2, 0)));
}

#[test]
fn superseded_payloads_are_not_counted_as_completed() {
    let mut s = default_streamer();
    s.tick(Some(Vec3::ZERO)).unwrap();
    s.provider_mut().pending = vec![
        (GridCoord::new(0, 0), 150),
        (GridCoord::new(1, 0), 3),
        (GridCoord::new(2, 0), 101),
    ];
    let report = s.tick(Some(Vec3::ZERO)).unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(s.provider().applied, vec![(GridCoord::new(1, 0), Some(0), 3)]);
    assert!(s.get(GridCoord::new(0, 0)).unwrap().content.payloads.is_empty());
}

#[test]
fn non_finite_observer_is_skipped() {
    let mut s = default_streamer();
    for bad in [
        Vec3::new(f32::NAN, 0.0, 0.0),
        Vec3::new(0.0, 0.0, f32::INFINITY),
        Vec3::new(f32::NEG_INFINITY, f32::NAN, 5.0),
    ] {
        let r = s.tick(Some(bad)).unwrap();
        assert!(r.is_skipped());
        assert!(s.is_empty());
    }
    // A NaN height alone does not matter: only x and z pick the cell.
    let r = s.tick(Some(Vec3::new(0.0, f32::NAN, 0.0))).unwrap();
    assert_eq!(r.observer_chunk, Some(GridCoord::new(0, 0)));
    let n = s.len();
    let r = s.tick(Some(Vec3::new(f32::NAN, 0.0, 0.0))).unwrap();
    assert!(r.is_skipped());
    assert_eq!(r.active, n);
    assert!(s.provider().destroyed.is_empty());
}

#[test]
fn observer_beyond_the_grid_is_skipped() {
    let mut s = default_streamer();
    for far in [
        Vec3::new(1e12, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -1e12),
        Vec3::new(f32::MAX, 0.0, f32::MAX),
    ] {
        let r = s.tick(Some(far)).unwrap();
        assert!(r.is_skipped());
        assert!(s.is_empty());
    }
    // Cell itself fits in i32, but the window around it does not.
    let cfg = StreamConfig {
        chunk_size: 1.0,
        max_view_distance: 500.0,
        lod_levels: 4,
    };
    let mut s = ChunkStreamer::new(cfg, Recorder::default()).unwrap();
    let r = s.tick(Some(Vec3::new(2_147_483_520.0, 0.0, 0.0))).unwrap();
    assert!(r.is_skipped());
    assert!(s.is_empty());
}

#[test]
fn clear_destroys_everything() {
    let mut s = default_streamer();
    s.tick(Some(Vec3::ZERO)).unwrap();
    let n = s.len();
    s.clear();
    assert!(s.is_empty());
    assert_eq!(s.provider().destroyed.len(), n);
    assert_eq!(s.observer_chunk(), None);
}

#[test]
fn stream_config_from_toml_uses_defaults() {
    let cfg: StreamConfig = toml::from_str("max_view_distance = 1000.0\n").unwrap();
    assert_eq!(cfg.chunk_size, 250.0);
    assert_eq!(cfg.lod_levels, 16);
    assert_eq!(cfg.chunks_visible_in_view(), 4);
}
