use atoll_chunk::{
    BandThresholds, ChunkOccupancy, GRASS, HeightBand, HeightmapSample, SAND, SNOW, SampleShapeError, rgb_from_hex,
};
use atoll_geom::GridCoord;
use proptest::prelude::*;

fn segs() -> impl Strategy<Value = usize> {
    1usize..=24
}

fn coord() -> impl Strategy<Value = GridCoord> {
    (-1000i32..=1000, -1000i32..=1000).prop_map(|(x, z)| GridCoord::new(x, z))
}

fn level(c: GridCoord, segments: usize, size: f32, h: f32) -> HeightmapSample {
    let n = (segments + 1) * (segments + 1);
    HeightmapSample::from_parts(c, segments, size, vec![h; n], vec![SAND; n]).unwrap()
}

proptest! {
    #[test]
    fn idx_is_unique_and_in_range(c in coord(), s in segs()) {
        let hm = level(c, s, 250.0, 0.0);
        let n = (s + 1) * (s + 1);
        let mut seen = vec![false; n];
        for row in 0..=s {
            for col in 0..=s {
                let i = hm.idx(row, col);
                prop_assert!(i < n);
                prop_assert!(!seen[i]);
                seen[i] = true;
            }
        }
        prop_assert!(seen.into_iter().all(|b| b));
    }

    #[test]
    fn mismatched_buffers_are_rejected(c in coord(), s in segs(), len in 0usize..700) {
        let n = (s + 1) * (s + 1);
        prop_assume!(len != n);
        let err = HeightmapSample::from_parts(c, s, 100.0, vec![1.0; len], vec![GRASS; n]).unwrap_err();
        prop_assert_eq!(err, SampleShapeError { expected: n, heights: len, colors: n });
        let err = HeightmapSample::from_parts(c, s, 100.0, vec![1.0; n], vec![GRASS; len]).unwrap_err();
        prop_assert_eq!(err.colors, len);
        prop_assert!(HeightmapSample::from_parts(c, s, 100.0, vec![1.0; n], vec![GRASS; n]).is_ok());
    }

    #[test]
    fn local_positions_span_the_chunk(c in coord(), s in segs(), size in 1.0f32..1000.0) {
        let hm = level(c, s, size, 0.0);
        let first = hm.local_position(0, 0);
        let last = hm.local_position(s, s);
        prop_assert!((first.x + size / 2.0).abs() < 1e-3 * size);
        prop_assert!((first.z + size / 2.0).abs() < 1e-3 * size);
        prop_assert!((last.x - size / 2.0).abs() < 1e-3 * size);
        prop_assert!((last.z - size / 2.0).abs() < 1e-3 * size);
    }

    #[test]
    fn bands_are_ordered(a in -500.0f32..500.0, b in -500.0f32..500.0) {
        let t = BandThresholds::default();
        let rank = |band: HeightBand| match band {
            HeightBand::Sand => 0,
            HeightBand::Grass => 1,
            HeightBand::Snow => 2,
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(t.classify(lo)) <= rank(t.classify(hi)));
    }
}

#[test]
fn band_boundaries_belong_to_upper_band() {
    let t = BandThresholds::default();
    assert_eq!(t.classify(79.99), HeightBand::Sand);
    assert_eq!(t.classify(80.0), HeightBand::Grass);
    assert_eq!(t.classify(159.99), HeightBand::Grass);
    assert_eq!(t.classify(160.0), HeightBand::Snow);
    assert_eq!(HeightBand::Snow.color(), SNOW);
    assert_eq!(HeightBand::Sand.color(), SAND);
}

#[test]
fn hex_colors_decode() {
    assert_eq!(rgb_from_hex(0x82c62d), GRASS);
    assert_eq!(rgb_from_hex(0xF4A460), SAND);
}

#[test]
fn occupancy_uses_strict_water_level() {
    let mut hm = level(GridCoord::new(0, 0), 2, 10.0, 60.0);
    assert_eq!(hm.occupancy(60.0), ChunkOccupancy::Submerged);
    hm.heights[4] = 60.5;
    assert!(hm.occupancy(60.0).has_land());
    assert_eq!(hm.max_height(), 60.5);
}

#[test]
fn shape_error_names_both_lengths() {
    let err = HeightmapSample::from_parts(GridCoord::new(1, 1), 2, 10.0, vec![0.0; 4], vec![SAND; 9]).unwrap_err();
    assert_eq!(err.to_string(), "heightmap needs 9 samples, got 4 heights and 9 colors");
}
