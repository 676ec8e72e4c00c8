/// Dense voxel chunk storage
/// One byte per cell, laid out x-fastest, then z, then y.
use super::block_type::AIR;
use glam::IVec2;

pub struct Chunk {
    /// Chunk coordinate (cx, cz)
    pub position: IVec2,
    size: usize,
    height: usize,
    blocks: Box<[u8]>,
}

impl Chunk {
    /// Create an all-air chunk of `size` x `height` x `size` cells.
    pub fn new(position: IVec2, size: usize, height: usize) -> Self {
        Self {
            position,
            size,
            height,
            blocks: vec![AIR; size * size * height].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Linear index of a local cell, or None outside this chunk's extent.
    /// Every cell access goes through here.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.size || z >= self.size || y >= self.height {
            return None;
        }
        Some(x + z * self.size + y * self.size * self.size)
    }

    /// Block id at local coordinates; air outside the chunk.
    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> u8 {
        match self.index(x, y, z) {
            Some(index) => self.blocks[index],
            None => AIR,
        }
    }

    /// Set block id at local coordinates; out-of-range writes are ignored.
    #[inline]
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: u8) {
        if let Some(index) = self.index(x, y, z) {
            self.blocks[index] = id;
        }
    }

    /// Fill one horizontal layer. Layers outside the chunk are ignored.
    pub fn fill_layer(&mut self, y: i32, id: u8) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        let layer = self.size * self.size;
        let start = y as usize * layer;
        self.blocks[start..start + layer].fill(id);
    }

    /// True if every cell is air
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == AIR)
    }

    /// Number of non-air cells
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|&&b| b != AIR).count()
    }

    /// Raw cell array, in index order
    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk::new(IVec2::ZERO, 16, 32)
    }

    #[test]
    fn test_index_layout_is_x_then_z_then_y() {
        let c = chunk();
        assert_eq!(c.index(0, 0, 0), Some(0));
        assert_eq!(c.index(1, 0, 0), Some(1));
        assert_eq!(c.index(0, 0, 1), Some(16));
        assert_eq!(c.index(0, 1, 0), Some(256));
        assert_eq!(c.index(15, 31, 15), Some(16 * 16 * 32 - 1));
    }

    #[test]
    fn test_out_of_range_reads_are_air() {
        let mut c = chunk();
        c.fill_layer(0, 3);
        assert_eq!(c.get_block(-1, 0, 0), AIR);
        assert_eq!(c.get_block(16, 0, 0), AIR);
        assert_eq!(c.get_block(0, 0, 16), AIR);
        assert_eq!(c.get_block(0, -1, 0), AIR);
        assert_eq!(c.get_block(0, 32, 0), AIR);
    }

    #[test]
    fn test_out_of_range_writes_are_ignored() {
        let mut c = chunk();
        c.set_block(16, 0, 0, 3);
        c.set_block(0, 32, 0, 3);
        c.set_block(-1, 0, -1, 3);
        assert!(c.is_empty());
    }

    #[test]
    fn test_set_then_get_returns_id() {
        let mut c = chunk();
        for y in 0..32 {
            for z in 0..16 {
                for x in 0..16 {
                    let id = ((x + z + y) % 255 + 1) as u8;
                    c.set_block(x, y, z, id);
                    assert_eq!(c.get_block(x, y, z), id);
                }
            }
        }
        assert_eq!(c.solid_count(), 16 * 16 * 32);
    }

    #[test]
    fn test_fill_layer_only_touches_one_layer() {
        let mut c = chunk();
        c.fill_layer(4, 2);
        assert_eq!(c.solid_count(), 16 * 16);
        assert_eq!(c.get_block(7, 4, 9), 2);
        assert_eq!(c.get_block(7, 5, 9), AIR);
        c.fill_layer(99, 2);
        assert_eq!(c.solid_count(), 16 * 16);
    }
}
