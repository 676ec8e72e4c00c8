/// Block break/place driven by a per-frame targeting ray
use crate::camera::{body_cells, Camera};
use crate::config::EngineConfig;
use crate::raycast::{HitResult, Raycaster};
use crate::voxel::{BlockType, AIR};
use crate::world::ChunkManager;
use glam::IVec3;
use log::debug;

pub struct BlockInteraction {
    selected: u8,
    reach: f32,
    player_height: f32,
    /// Targeting result for the current frame
    pub target: HitResult,
}

impl BlockInteraction {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            selected: BlockType::Stone.id(),
            reach: config.reach_distance,
            player_height: config.player_height,
            target: HitResult::default(),
        }
    }

    /// Select the block id placed by `place_block`. Air is rejected.
    pub fn select(&mut self, id: u8) -> bool {
        if id == AIR {
            return false;
        }
        self.selected = id;
        true
    }

    #[inline]
    pub fn selected(&self) -> u8 {
        self.selected
    }

    /// Recompute the targeted cell from the camera's view ray.
    pub fn update_target(
        &mut self,
        camera: &Camera,
        chunks: &ChunkManager,
        raycaster: &Raycaster,
    ) -> bool {
        raycaster.cast(
            camera.position,
            camera.direction(),
            self.reach,
            chunks,
            &mut self.target,
        )
    }

    /// Clear the targeted cell. Returns the cell that was broken.
    pub fn break_block(&mut self, chunks: &mut ChunkManager) -> Option<IVec3> {
        if !self.target.hit {
            return None;
        }
        let cell = self.target.map_pos;
        chunks.set_block(cell.x, cell.y, cell.z, AIR);
        debug!("broke block {} at {}", self.target.block, cell);
        self.target.reset();
        Some(cell)
    }

    /// Put the selected block in the empty cell in front of the targeted face.
    /// Refuses cells the player's body occupies and cells that are not air.
    pub fn place_block(&mut self, camera: &Camera, chunks: &mut ChunkManager) -> Option<IVec3> {
        let cell = self.target.place_target()?;
        if body_cells(camera.position, self.player_height).contains(&cell) {
            return None;
        }
        if chunks.is_solid(cell.x, cell.y, cell.z) {
            return None;
        }
        chunks.set_block(cell.x, cell.y, cell.z, self.selected);
        debug!("placed block {} at {}", self.selected, cell);
        self.target.reset();
        Some(cell)
    }
}
