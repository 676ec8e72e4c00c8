/// Chunk content generation
/// Generators run exactly once, when a chunk is first created, and must be a
/// pure function of the chunk coordinate so regenerated chunks match.
use crate::config::TerrainConfig;
use crate::voxel::{BlockType, Chunk};
use noise::{NoiseFn, Perlin};

pub trait TerrainGenerator: Send + Sync {
    fn populate(&self, chunk: &mut Chunk);
}

/// Leaves chunks as air
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTerrain;

impl TerrainGenerator for EmptyTerrain {
    fn populate(&self, _chunk: &mut Chunk) {}
}

/// Solid `block` at every y in 0..=height
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub height: i32,
    pub block: u8,
}

impl TerrainGenerator for FlatTerrain {
    fn populate(&self, chunk: &mut Chunk) {
        let top = self.height.min(chunk.height() as i32 - 1);
        for y in 0..=top {
            chunk.fill_layer(y, self.block);
        }
    }
}

/// Perlin heightmap: grass on top, a few layers of dirt, stone below.
pub struct NoiseTerrain {
    perlin: Perlin,
    base_height: f64,
    amplitude: f64,
    scale: f64,
}

impl NoiseTerrain {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_height: 8.0,
            amplitude: 6.0,
            scale: 0.03,
        }
    }

    #[inline]
    pub fn sample_height(&self, world_x: i32, world_z: i32) -> i32 {
        let n = self
            .perlin
            .get([world_x as f64 * self.scale, world_z as f64 * self.scale]);
        (self.base_height + n * self.amplitude).floor() as i32
    }
}

impl TerrainGenerator for NoiseTerrain {
    fn populate(&self, chunk: &mut Chunk) {
        let size = chunk.size() as i32;
        let max_y = chunk.height() as i32 - 1;
        let origin_x = chunk.position.x * size;
        let origin_z = chunk.position.y * size;

        for z in 0..size {
            for x in 0..size {
                let top = self.sample_height(origin_x + x, origin_z + z).clamp(0, max_y);
                for y in 0..=top {
                    let block = if y == top {
                        BlockType::Grass
                    } else if y > top - 3 {
                        BlockType::Dirt
                    } else {
                        BlockType::Stone
                    };
                    chunk.set_block(x, y, z, block.id());
                }
            }
        }
    }
}

/// Build the generator a config asks for.
pub fn from_config(config: &TerrainConfig) -> Box<dyn TerrainGenerator> {
    match *config {
        TerrainConfig::Empty => Box::new(EmptyTerrain),
        TerrainConfig::Flat { height, block } => Box::new(FlatTerrain { height, block }),
        TerrainConfig::Noise { seed } => Box::new(NoiseTerrain::new(seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_flat_terrain_fills_floor_only() {
        let mut chunk = Chunk::new(IVec2::new(-3, 7), 16, 32);
        FlatTerrain {
            height: 0,
            block: BlockType::Stone.id(),
        }
        .populate(&mut chunk);

        assert_eq!(chunk.solid_count(), 16 * 16);
        assert_eq!(chunk.get_block(5, 0, 5), BlockType::Stone.id());
        assert_eq!(chunk.get_block(5, 1, 5), BlockType::Air.id());
    }

    #[test]
    fn test_flat_terrain_height_is_clamped_to_chunk() {
        let mut chunk = Chunk::new(IVec2::ZERO, 4, 8);
        FlatTerrain {
            height: i32::MAX,
            block: BlockType::Dirt.id(),
        }
        .populate(&mut chunk);
        assert_eq!(chunk.solid_count(), 4 * 4 * 8);

        let mut chunk = Chunk::new(IVec2::ZERO, 4, 8);
        FlatTerrain {
            height: -5,
            block: BlockType::Dirt.id(),
        }
        .populate(&mut chunk);
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_noise_terrain_is_deterministic_per_coordinate() {
        let generator = NoiseTerrain::new(7);
        let mut a = Chunk::new(IVec2::new(2, -1), 16, 32);
        let mut b = Chunk::new(IVec2::new(2, -1), 16, 32);
        generator.populate(&mut a);
        generator.populate(&mut b);
        assert_eq!(a.blocks(), b.blocks());
        assert!(!a.is_empty());
    }

    #[test]
    fn test_noise_terrain_columns_are_grass_topped() {
        let generator = NoiseTerrain::new(1);
        let mut chunk = Chunk::new(IVec2::ZERO, 16, 32);
        generator.populate(&mut chunk);

        let top = generator.sample_height(3, 4).clamp(0, 31);
        assert_eq!(chunk.get_block(3, top, 4), BlockType::Grass.id());
        assert_eq!(chunk.get_block(3, top + 1, 4), BlockType::Air.id());
    }
}
