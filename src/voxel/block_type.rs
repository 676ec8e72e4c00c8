/// Block type enumeration
/// Cells store the raw u8 id; this enum names the ids the engine knows about.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BlockType {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Wood = 4,
    Sand = 5,
}

pub const BLOCK_TYPE_COUNT: usize = 6;

/// Block id that is always empty space
pub const AIR: u8 = BlockType::Air as u8;

// Lookup tables for block properties - eliminates branches in hot paths
const BLOCK_COLORS_LUT: [[u8; 3]; BLOCK_TYPE_COUNT] = [
    [0, 0, 0],       // Air
    [86, 168, 62],   // Grass
    [134, 96, 67],   // Dirt
    [128, 128, 128], // Stone
    [156, 122, 76],  // Wood
    [219, 207, 142], // Sand
];

/// Ids outside the table still render, just loudly.
const UNKNOWN_BLOCK_COLOR: [u8; 3] = [255, 0, 255];

impl BlockType {
    pub const ALL: [BlockType; BLOCK_TYPE_COUNT] = [
        BlockType::Air,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Wood,
        BlockType::Sand,
    ];

    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_solid(self) -> bool {
        !matches!(self, BlockType::Air)
    }

    #[inline]
    pub const fn color(self) -> [u8; 3] {
        BLOCK_COLORS_LUT[self as usize]
    }

    /// Convert from a raw id. Returns None for ids with no named type.
    #[inline]
    pub const fn from_id(value: u8) -> Option<Self> {
        match value {
            0 => Some(BlockType::Air),
            1 => Some(BlockType::Grass),
            2 => Some(BlockType::Dirt),
            3 => Some(BlockType::Stone),
            4 => Some(BlockType::Wood),
            5 => Some(BlockType::Sand),
            _ => None,
        }
    }
}

/// Base color for a raw block id, used by the renderer per hit pixel.
#[inline]
pub const fn block_color(id: u8) -> [u8; 3] {
    match BlockType::from_id(id) {
        Some(block) => block.color(),
        None => UNKNOWN_BLOCK_COLOR,
    }
}

/// Solidity of a raw block id. Unknown ids are solid so they stay visible.
#[inline]
pub const fn is_solid_id(id: u8) -> bool {
    match BlockType::from_id(id) {
        Some(block) => block.is_solid(),
        None => true,
    }
}
