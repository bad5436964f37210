use std::error::Error;

use hashbrown::HashMap;
use raylib::prelude::*;

use atoll_geom::Vec3;
use atoll_mesh::{TerrainMesh, TriMeshCollider};
use atoll_render_raylib::{
    TerrainModel, draw_features, draw_terrain_model, draw_water_plane, upload_terrain_mesh,
};
use atoll_runtime::{
    ChunkComponent, ChunkEntities, ChunkHandle, ComponentKind, GenerationMode, TerrainStreamer,
    terrain_streamer,
};
use atoll_stream::TickReport;
use atoll_world::FeatureInstance;

use crate::camera::FlyCamera;
use crate::config::AppConfig;

/// Mesh uploads per frame; the rest wait for the next frame.
const UPLOADS_PER_FRAME: usize = 24;

struct ViewEntity {
    position: Vec3,
    mesh: Option<TerrainMesh>,
    model: Option<TerrainModel>,
    collider: Option<TriMeshCollider>,
    features: Option<Vec<FeatureInstance>>,
}

/// Chunk entities for the window: CPU components arrive from the streamer,
/// GPU models are built from them lazily on the render thread.
#[derive(Default)]
pub struct RaylibEntities {
    next_id: u64,
    entities: HashMap<ChunkHandle, ViewEntity>,
    dirty: Vec<ChunkHandle>,
}

impl RaylibEntities {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn model_count(&self) -> usize {
        self.entities.values().filter(|e| e.model.is_some()).count()
    }

    pub fn collider_count(&self) -> usize {
        self.entities.values().filter(|e| e.collider.is_some()).count()
    }

    #[inline]
    pub fn pending_uploads(&self) -> usize {
        self.dirty.len()
    }

    /// Builds GPU models for up to `budget` freshly attached meshes.
    pub fn upload_pending(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, budget: usize) -> usize {
        let take = budget.min(self.dirty.len());
        let mut uploaded = 0;
        for handle in self.dirty.drain(..take) {
            let Some(e) = self.entities.get_mut(&handle) else {
                continue;
            };
            let Some(mesh) = &e.mesh else {
                continue;
            };
            e.model = upload_terrain_mesh(rl, thread, mesh, e.position);
            if e.model.is_some() {
                uploaded += 1;
            }
        }
        uploaded
    }

    /// Draws every uploaded chunk except those wholly behind the eye.
    /// Returns how many were drawn.
    pub fn draw_terrain<D: RaylibDraw3D>(&self, d3: &mut D, eye: Vec3, forward: Vec3, wireframe: bool) -> usize {
        let mut drawn = 0;
        for m in self.entities.values().filter_map(|e| e.model.as_ref()) {
            if m.bbox.is_behind(eye, forward) {
                continue;
            }
            draw_terrain_model(d3, m, wireframe);
            drawn += 1;
        }
        drawn
    }

    pub fn draw_features_near<D: RaylibDraw3D>(&self, d3: &mut D, eye: Vec3, max_distance: f32) {
        for e in self.entities.values() {
            let Some(features) = &e.features else {
                continue;
            };
            if e.model.is_none() || e.position.horizontal_distance(eye) > max_distance {
                continue;
            }
            draw_features(d3, e.position, features);
        }
    }
}

impl ChunkEntities for RaylibEntities {
    fn spawn_chunk_entity(&mut self, position: Vec3) -> ChunkHandle {
        let handle = ChunkHandle(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            handle,
            ViewEntity {
                position,
                mesh: None,
                model: None,
                collider: None,
                features: None,
            },
        );
        handle
    }

    fn destroy_chunk_entity(&mut self, handle: ChunkHandle) {
        self.entities.remove(&handle);
        self.dirty.retain(|h| *h != handle);
    }

    fn attach_component(&mut self, handle: ChunkHandle, component: ChunkComponent) {
        let Some(e) = self.entities.get_mut(&handle) else {
            log::warn!(target: "render", "attach to unknown entity {handle:?}");
            return;
        };
        match component {
            ChunkComponent::Mesh(mesh) => {
                e.mesh = Some(mesh);
                e.model = None;
                if !self.dirty.contains(&handle) {
                    self.dirty.push(handle);
                }
            }
            ChunkComponent::Collider(c) => e.collider = Some(c),
            ChunkComponent::Features(f) => e.features = Some(f),
        }
    }

    fn remove_component(&mut self, handle: ChunkHandle, kind: ComponentKind) {
        let Some(e) = self.entities.get_mut(&handle) else {
            return;
        };
        match kind {
            ComponentKind::Mesh => {
                e.mesh = None;
                e.model = None;
            }
            ComponentKind::Collider => e.collider = None,
            ComponentKind::Features => e.features = None,
        }
    }
}

fn draw_hud(
    d: &mut RaylibDrawHandle,
    cam: &FlyCamera,
    streamer: &TerrainStreamer<RaylibEntities>,
    report: TickReport,
    drawn: usize,
) {
    let ents = streamer.provider().entities();
    let p = cam.position;
    let chunk = streamer
        .observer_chunk()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let generation = match streamer.provider().workers() {
        Some(w) => {
            let (queued, running) = w.queue_counts();
            format!("workers {}  queued {queued}  running {running}", w.workers())
        }
        None => "generation inline".to_string(),
    };
    let lines = [
        format!("pos ({:.0}, {:.0}, {:.0})  chunk {chunk}", p.x, p.y, p.z),
        format!(
            "active {}  +{} ~{} -{}  done {}",
            report.active, report.created, report.refined, report.evicted, report.completed
        ),
        format!(
            "entities {}  models {} ({drawn} drawn)  colliders {}  uploads queued {}  jobs {}",
            ents.len(),
            ents.model_count(),
            ents.collider_count(),
            ents.pending_uploads(),
            streamer.provider().pending_jobs()
        ),
        generation,
        "WASD/QE move, Shift boost, Tab mouse, F1 wireframe".to_string(),
    ];
    for (i, line) in lines.iter().enumerate() {
        d.draw_text(line, 12, 12 + 22 * i as i32, 18, Color::DARKGRAY);
    }
    d.draw_fps(12, 12 + 22 * lines.len() as i32);
}

/// Opens the window and streams terrain around the fly camera until the
/// window closes. A content fault ends the loop with an error.
pub fn run_viewer(cfg: &AppConfig, mode: GenerationMode) -> Result<(), Box<dyn Error>> {
    let mut streamer = terrain_streamer(cfg.stream, cfg.terrain.clone(), RaylibEntities::new(), mode)?;
    let start = streamer
        .provider()
        .generator()
        .islands()
        .first()
        .map(|i| i.position)
        .unwrap_or(Vec3::ZERO)
        .with_y(cfg.viewer.start_height);

    let (mut rl, thread) = raylib::init()
        .size(cfg.viewer.width, cfg.viewer.height)
        .title("Atoll")
        .resizable()
        .build();
    rl.set_target_fps(cfg.viewer.target_fps);
    rl.disable_cursor();

    let mut cam = FlyCamera::new(start, cfg.viewer.move_speed);
    let water_level = cfg.terrain.water_level;
    let water_extent = cfg.stream.max_view_distance * 2.0;
    let mut wireframe = false;
    let mut outcome: Result<(), Box<dyn Error>> = Ok(());

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        cam.update(&mut rl, dt);
        if rl.is_key_pressed(KeyboardKey::KEY_F1) {
            wireframe = !wireframe;
        }

        let report = match streamer.tick_from(&cam.position) {
            Ok(r) => r,
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        };
        streamer
            .provider_mut()
            .entities_mut()
            .upload_pending(&mut rl, &thread, UPLOADS_PER_FRAME);

        let eye = cam.position;
        let forward = cam.forward();
        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::new(150, 200, 235, 255));
        let drawn = {
            let mut d3 = d.begin_mode3D(cam.to_camera3d());
            let ents = streamer.provider().entities();
            let drawn = ents.draw_terrain(&mut d3, eye, forward, wireframe);
            ents.draw_features_near(&mut d3, eye, cfg.viewer.feature_distance);
            draw_water_plane(&mut d3, eye, water_level, water_extent);
            drawn
        };
        draw_hud(&mut d, &cam, &streamer, report, drawn);
    }
    // Models must be unloaded while the GL context is still alive.
    streamer.clear();
    outcome
}
