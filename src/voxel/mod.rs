/// Core voxel data structures
pub mod block_type;
pub mod chunk;

pub use block_type::{block_color, is_solid_id, BlockType, AIR, BLOCK_TYPE_COUNT};
pub use chunk::Chunk;
