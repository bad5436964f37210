use atoll_chunk::HeightBand;
use atoll_geom::{GridCoord, Vec3};
use atoll_world::{
    EmptyReason, GenError, GenOutcome, Island, TerrainConfig, TerrainGenerator, load_terrain_config,
};

const CHUNK: f32 = 250.0;

fn small_config() -> TerrainConfig {
    let mut cfg = TerrainConfig::default();
    cfg.segments = 12;
    cfg
}

fn island_at(x: f32, z: f32, size: f32, height_multiplier: f32) -> Island {
    Island {
        position: Vec3::flat(x, z),
        size,
        height_multiplier,
    }
}

#[test]
fn islands_are_reproducible_for_a_seed() {
    let a = TerrainGenerator::new(TerrainConfig::default(), CHUNK).unwrap();
    let b = TerrainGenerator::new(TerrainConfig::default(), CHUNK).unwrap();
    assert!(!a.islands().is_empty());
    assert_eq!(a.islands().len(), b.islands().len());
    for (ia, ib) in a.islands().iter().zip(b.islands()) {
        assert_eq!(ia.position.x.to_bits(), ib.position.x.to_bits());
        assert_eq!(ia.position.z.to_bits(), ib.position.z.to_bits());
        assert_eq!(ia.size.to_bits(), ib.size.to_bits());
        assert_eq!(ia.height_multiplier.to_bits(), ib.height_multiplier.to_bits());
    }
}

#[test]
fn default_islands_respect_placement_bounds() {
    let cfg = TerrainConfig::default();
    let generator = TerrainGenerator::new(cfg.clone(), CHUNK).unwrap();
    let p = &cfg.islands;
    for (i, a) in generator.islands().iter().enumerate() {
        assert_eq!(a.position.y, 0.0);
        assert!((0.0..=p.region_size).contains(&a.position.x));
        assert!((0.0..=p.region_size).contains(&a.position.z));
        assert!((p.size_min..p.size_max).contains(&a.size));
        assert!((p.height_min..p.height_max).contains(&a.height_multiplier));
        for b in &generator.islands()[i + 1..] {
            assert!(a.position.horizontal_distance(b.position) >= p.min_spacing);
        }
    }
}

#[test]
fn heightmaps_are_reproducible() {
    let a = TerrainGenerator::new(small_config(), CHUNK).unwrap();
    let b = TerrainGenerator::new(small_config(), CHUNK).unwrap();
    let island = a.islands()[0].position;
    let coord = GridCoord::containing(island, CHUNK);
    let ha = a.sample_heightmap(coord).unwrap();
    let hb = b.sample_heightmap(coord).unwrap();
    assert_eq!(ha.heights.len(), 13 * 13);
    for (x, y) in ha.heights.iter().zip(&hb.heights) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
    assert_eq!(ha.colors, hb.colors);
}

#[test]
fn colors_follow_height_bands() {
    let generator =
        TerrainGenerator::with_islands(small_config(), CHUNK, vec![island_at(0.0, 0.0, 600.0, 1.7)]).unwrap();
    let hm = generator.sample_heightmap(GridCoord::new(0, 0)).unwrap();
    let bands = generator.bands();
    for (h, c) in hm.heights.iter().zip(&hm.colors) {
        assert_eq!(*c, bands.classify(*h).color());
    }
}

#[test]
fn far_chunks_are_gated_out() {
    let generator = TerrainGenerator::new(small_config(), CHUNK).unwrap();
    let far = GridCoord::new(10_000, -10_000);
    assert!(!generator.should_generate(far));
    match generator.generate(far).unwrap() {
        GenOutcome::Empty(reason) => assert_eq!(reason, EmptyReason::NoNearbyIsland),
        GenOutcome::Loaded(_) => panic!("far chunk must not load terrain"),
    }
}

#[test]
fn gating_uses_island_size_plus_chunk_size() {
    let generator =
        TerrainGenerator::with_islands(small_config(), CHUNK, vec![island_at(0.0, 0.0, 100.0, 1.0)]).unwrap();
    // Centers at 250 and 500: 250 < 100 + 250, 500 >= 350.
    assert!(generator.should_generate(GridCoord::new(0, 0)));
    assert!(generator.should_generate(GridCoord::new(1, 0)));
    assert!(!generator.should_generate(GridCoord::new(2, 0)));
}

#[test]
fn tall_island_loads_with_features_in_grass_band() {
    let generator =
        TerrainGenerator::with_islands(small_config(), CHUNK, vec![island_at(0.0, 0.0, 2000.0, 1.7)]).unwrap();
    let outcome = generator.generate(GridCoord::new(0, 0)).unwrap();
    let GenOutcome::Loaded(data) = outcome else {
        panic!("expected terrain above water");
    };
    assert!(data.heightmap.any_above(generator.config().water_level));
    let cfg = &generator.config().features;
    assert!(data.features.len() <= cfg.max_per_chunk);
    for f in &data.features {
        assert_eq!(generator.bands().classify(f.position.y), HeightBand::Grass);
        assert!(f.variety < cfg.varieties.len());
        assert!((cfg.scale_min as f32..=cfg.scale_max as f32).contains(&f.scale));
        assert!(f.yaw >= -std::f32::consts::PI && f.yaw < std::f32::consts::PI);
        assert!(f.position.x.abs() <= CHUNK / 2.0 + cfg.jitter);
    }
    let again = generator.generate(GridCoord::new(0, 0)).unwrap();
    let GenOutcome::Loaded(again) = again else {
        panic!("expected terrain above water");
    };
    assert_eq!(data.features, again.features);
}

#[test]
fn submerged_chunk_is_empty() {
    let generator =
        TerrainGenerator::with_islands(small_config(), CHUNK, vec![island_at(0.0, 0.0, 300.0, 0.0)]).unwrap();
    // Multiplier zero flattens everything to the base height, below water.
    match generator.generate(GridCoord::new(0, 0)).unwrap() {
        GenOutcome::Empty(reason) => assert_eq!(reason, EmptyReason::BelowWater),
        GenOutcome::Loaded(_) => panic!("flat base height is below water"),
    }
}

#[test]
fn negative_height_aborts_chunk() {
    let generator =
        TerrainGenerator::with_islands(small_config(), CHUNK, vec![island_at(0.0, 0.0, 500.0, -1000.0)]).unwrap();
    let err = generator.generate(GridCoord::new(0, 0)).unwrap_err();
    assert!(err.is_content_fault());
    match err {
        GenError::NegativeHeight { coord, height, .. } => {
            assert_eq!(coord, GridCoord::new(0, 0));
            assert!(height < 0.0);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn invalid_configs_are_rejected() {
    let mut cfg = small_config();
    cfg.segments = 61;
    assert!(matches!(TerrainGenerator::new(cfg, CHUNK), Err(GenError::InvalidConfig(_))));

    let mut cfg = small_config();
    cfg.segments = 0;
    assert!(matches!(TerrainGenerator::new(cfg, CHUNK), Err(GenError::InvalidConfig(_))));

    let mut cfg = small_config();
    cfg.islands.min_spacing = 5000.0;
    cfg.islands.max_spacing = 10.0;
    assert!(matches!(TerrainGenerator::new(cfg, CHUNK), Err(GenError::InvalidConfig(_))));

    assert!(matches!(
        TerrainGenerator::new(small_config(), 0.0),
        Err(GenError::InvalidConfig(_))
    ));
}

#[test]
fn empty_island_list_is_a_configuration_error() {
    let err = TerrainGenerator::with_islands(small_config(), CHUNK, Vec::new()).unwrap_err();
    assert_eq!(err, GenError::NoIslands);
    assert!(!err.is_content_fault());
}

#[test]
fn config_file_overrides_only_named_fields() {
    let path = std::env::temp_dir().join(format!("atoll-terrain-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "seed = 42\nsegments = 30\n[islands]\nattempts = 4\n[features]\nenabled = false\n",
    )
    .unwrap();
    let cfg = load_terrain_config(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(cfg.seed, 42);
    assert_eq!(cfg.segments, 30);
    assert_eq!(cfg.islands.attempts, 4);
    assert_eq!(cfg.islands.min_spacing, 1500.0);
    assert!(!cfg.features.enabled);
    assert_eq!(cfg.features.varieties.len(), 5);
    assert_eq!(cfg.water_level, 60.0);
}
