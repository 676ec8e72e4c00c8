/// Chunk residency and world-space block queries
/// Owns every resident chunk and streams them in and out around the viewpoint.
/// All block lookups that may cross a chunk boundary go through here.
use crate::config::{
    EngineConfig, MAX_CHUNK_HEIGHT, MAX_CHUNK_SIZE, MAX_RENDER_DISTANCE, MAX_UNLOAD_MARGIN,
};
use crate::count_add;
use crate::terrain::{self, TerrainGenerator};
use crate::voxel::{is_solid_id, Chunk, AIR};
use glam::{IVec2, IVec3, Vec3};
use log::debug;
use std::collections::HashMap;

/// What one streaming update changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamDelta {
    pub generated: usize,
    pub evicted: usize,
}

impl StreamDelta {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.generated == 0 && self.evicted == 0
    }
}

pub struct ChunkManager {
    chunks: HashMap<IVec2, Chunk>,
    chunk_size: i32,
    chunk_height: i32,
    render_distance: i32,
    unload_margin: i32,
    generator: Box<dyn TerrainGenerator>,
    last_center: Option<IVec2>,
}

impl ChunkManager {
    /// Chunk manager using the terrain generator named in the config
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_generator(config, terrain::from_config(&config.terrain))
    }

    /// Dimensions and radii are clamped to the ranges `EngineConfig::validate`
    /// accepts, so an unvalidated config cannot break coordinate math.
    pub fn with_generator(config: &EngineConfig, generator: Box<dyn TerrainGenerator>) -> Self {
        Self {
            chunks: HashMap::new(),
            chunk_size: clamp_extent(config.chunk_size, MAX_CHUNK_SIZE),
            chunk_height: clamp_extent(config.chunk_height, MAX_CHUNK_HEIGHT),
            render_distance: config.render_distance.clamp(0, MAX_RENDER_DISTANCE),
            unload_margin: config.unload_margin.clamp(0, MAX_UNLOAD_MARGIN),
            generator,
            last_center: None,
        }
    }

    /// Block id at world coordinates. Missing chunks read as air and are
    /// never created by a read.
    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> u8 {
        let (chunk_pos, local) = self.world_to_local(x, y, z);
        match self.chunks.get(&chunk_pos) {
            Some(chunk) => chunk.get_block(local.x, local.y, local.z),
            None => AIR,
        }
    }

    /// Set a block at world coordinates, creating the owning chunk if needed.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: u8) {
        let (chunk_pos, local) = self.world_to_local(x, y, z);
        self.ensure_chunk(chunk_pos);
        if let Some(chunk) = self.chunks.get_mut(&chunk_pos) {
            chunk.set_block(local.x, local.y, local.z, id);
        }
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        is_solid_id(self.get_block(x, y, z))
    }

    /// Block id of the cell containing a floating point position
    #[inline]
    pub fn block_at(&self, position: Vec3) -> u8 {
        let cell = position.floor().as_ivec3();
        self.get_block(cell.x, cell.y, cell.z)
    }

    /// Stream chunks around the viewpoint: load everything within the render
    /// distance, evict everything past render distance plus the unload margin.
    pub fn update(&mut self, viewpoint_x: f32, viewpoint_z: f32) -> StreamDelta {
        let center = self.world_to_chunk(viewpoint_x.floor() as i32, viewpoint_z.floor() as i32);
        let radius = self.render_distance;
        let radius_sq = radius * radius;

        let mut delta = StreamDelta::default();

        for cz in (center.y - radius)..=(center.y + radius) {
            for cx in (center.x - radius)..=(center.x + radius) {
                let chunk_pos = IVec2::new(cx, cz);
                if (chunk_pos - center).length_squared() > radius_sq {
                    continue;
                }
                if self.ensure_chunk(chunk_pos) {
                    delta.generated += 1;
                }
            }
        }

        let unload = radius + self.unload_margin;
        let unload_sq = unload * unload;
        let before = self.chunks.len();
        self.chunks
            .retain(|&pos, _| (pos - center).length_squared() <= unload_sq);
        delta.evicted = before - self.chunks.len();
        count_add!(crate::perf::ENGINE_COUNTERS.chunks_generated, delta.generated);
        count_add!(crate::perf::ENGINE_COUNTERS.chunks_evicted, delta.evicted);

        if !delta.is_empty() || self.last_center != Some(center) {
            debug!(
                "streaming around chunk ({}, {}): +{} -{} ({} resident)",
                center.x,
                center.y,
                delta.generated,
                delta.evicted,
                self.chunks.len()
            );
        }
        self.last_center = Some(center);

        delta
    }

    /// Create and populate a chunk if it is not resident. Returns true if created.
    fn ensure_chunk(&mut self, chunk_pos: IVec2) -> bool {
        if self.chunks.contains_key(&chunk_pos) {
            return false;
        }
        let mut chunk = Chunk::new(
            chunk_pos,
            self.chunk_size as usize,
            self.chunk_height as usize,
        );
        self.generator.populate(&mut chunk);
        self.chunks.insert(chunk_pos, chunk);
        true
    }

    /// Chunk coordinate owning a world column. Floors, so negative
    /// coordinates land in negative chunks.
    #[inline]
    pub fn world_to_chunk(&self, x: i32, z: i32) -> IVec2 {
        IVec2::new(x.div_euclid(self.chunk_size), z.div_euclid(self.chunk_size))
    }

    /// Split a world coordinate into (chunk coordinate, local coordinate).
    /// y passes through unchanged; chunks span the full height.
    #[inline]
    pub fn world_to_local(&self, x: i32, y: i32, z: i32) -> (IVec2, IVec3) {
        let chunk_pos = self.world_to_chunk(x, z);
        let local = IVec3::new(
            x.rem_euclid(self.chunk_size),
            y,
            z.rem_euclid(self.chunk_size),
        );
        (chunk_pos, local)
    }

    #[inline]
    pub fn is_resident(&self, cx: i32, cz: i32) -> bool {
        self.chunks.contains_key(&IVec2::new(cx, cz))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates of every resident chunk, in no particular order
    pub fn resident_chunks(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.chunks.keys().copied()
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn chunk_height(&self) -> i32 {
        self.chunk_height
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    pub fn unload_margin(&self) -> i32 {
        self.unload_margin
    }

    /// Drop every chunk
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.last_center = None;
    }
}

/// Clamp a chunk extent into 1..=max and convert without truncation.
fn clamp_extent(extent: usize, max: usize) -> i32 {
    i32::try_from(extent.clamp(1, max)).unwrap_or(1)
}
