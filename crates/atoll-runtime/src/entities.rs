use hashbrown::HashMap;

use atoll_geom::Vec3;
use atoll_mesh::{TerrainMesh, TriMeshCollider};
use atoll_world::FeatureInstance;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Mesh,
    Collider,
    Features,
}

#[derive(Clone, Debug)]
pub enum ChunkComponent {
    Mesh(TerrainMesh),
    Collider(TriMeshCollider),
    Features(Vec<FeatureInstance>),
}

impl ChunkComponent {
    #[inline]
    pub fn kind(&self) -> ComponentKind {
        match self {
            ChunkComponent::Mesh(_) => ComponentKind::Mesh,
            ChunkComponent::Collider(_) => ComponentKind::Collider,
            ChunkComponent::Features(_) => ComponentKind::Features,
        }
    }
}

/// Entity storage owned by the embedding application (scene graph, ECS,
/// physics world). Chunk content is handed over as components.
pub trait ChunkEntities {
    fn spawn_chunk_entity(&mut self, position: Vec3) -> ChunkHandle;
    fn destroy_chunk_entity(&mut self, handle: ChunkHandle);
    fn attach_component(&mut self, handle: ChunkHandle, component: ChunkComponent);
    fn remove_component(&mut self, handle: ChunkHandle, kind: ComponentKind);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryEntity {
    pub position: Vec3,
    pub mesh: Option<TerrainMesh>,
    pub collider: Option<TriMeshCollider>,
    pub features: Option<Vec<FeatureInstance>>,
}

impl MemoryEntity {
    fn slot_is_filled(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Mesh => self.mesh.is_some(),
            ComponentKind::Collider => self.collider.is_some(),
            ComponentKind::Features => self.features.is_some(),
        }
    }
}

/// In-process entity store. Attaching a component kind that is already
/// present overwrites it and counts as a leak.
#[derive(Debug, Default)]
pub struct MemoryEntities {
    next_id: u64,
    entities: HashMap<ChunkHandle, MemoryEntity>,
    spawned: usize,
    destroyed: usize,
    leaks: usize,
}

impl MemoryEntities {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, handle: ChunkHandle) -> Option<&MemoryEntity> {
        self.entities.get(&handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkHandle, &MemoryEntity)> {
        self.entities.iter().map(|(h, e)| (*h, e))
    }

    #[inline]
    pub fn leaks(&self) -> usize {
        self.leaks
    }

    #[inline]
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    #[inline]
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    pub fn count_with(&self, kind: ComponentKind) -> usize {
        self.entities.values().filter(|e| e.slot_is_filled(kind)).count()
    }
}

impl ChunkEntities for MemoryEntities {
    fn spawn_chunk_entity(&mut self, position: Vec3) -> ChunkHandle {
        let handle = ChunkHandle(self.next_id);
        self.next_id += 1;
        self.spawned += 1;
        self.entities.insert(
            handle,
            MemoryEntity {
                position,
                ..MemoryEntity::default()
            },
        );
        handle
    }

    fn destroy_chunk_entity(&mut self, handle: ChunkHandle) {
        if self.entities.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            log::warn!(target: "entities", "destroy of unknown entity {handle:?}");
        }
    }

    fn attach_component(&mut self, handle: ChunkHandle, component: ChunkComponent) {
        let Some(entity) = self.entities.get_mut(&handle) else {
            log::warn!(target: "entities", "attach to unknown entity {handle:?}");
            return;
        };
        if entity.slot_is_filled(component.kind()) {
            self.leaks += 1;
            log::warn!(
                target: "entities",
                "{:?} already attached to {handle:?}; previous one leaked",
                component.kind()
            );
        }
        match component {
            ChunkComponent::Mesh(m) => entity.mesh = Some(m),
            ChunkComponent::Collider(c) => entity.collider = Some(c),
            ChunkComponent::Features(f) => entity.features = Some(f),
        }
    }

    fn remove_component(&mut self, handle: ChunkHandle, kind: ComponentKind) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            match kind {
                ComponentKind::Mesh => entity.mesh = None,
                ComponentKind::Collider => entity.collider = None,
                ComponentKind::Features => entity.features = None,
            }
        }
    }
}
