/// DDA voxel raycast
///
/// Grid traversal after Amanatides & Woo, "A Fast Voxel Traversal Algorithm
/// for Ray Tracing". The ray visits every cell it passes through, one cell
/// boundary per step, and never touches chunk storage directly: every cell is
/// resolved through `ChunkManager::get_block`.
///
/// `cast` runs once per screen pixel, so it writes into a caller-owned
/// `HitResult` and allocates nothing.
use crate::config::EngineConfig;
use crate::voxel::AIR;
use crate::world::ChunkManager;
use glam::{IVec3, Vec3};

/// Axis the traversal last stepped along
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl Side {
    #[inline]
    pub const fn axis(self) -> usize {
        self as usize
    }

    #[inline]
    const fn from_axis(axis: usize) -> Self {
        match axis {
            0 => Side::X,
            1 => Side::Y,
            _ => Side::Z,
        }
    }
}

/// Face of the hit cell the ray entered through, named by its outward normal
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    #[default]
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

/// (side, step sign) -> face. Column 0 is a positive step, column 1 negative.
/// A positive step enters through the cell's negative face and vice versa.
const FACE_TABLE: [[Face; 2]; 3] = [
    [Face::NegX, Face::PosX],
    [Face::NegY, Face::PosY],
    [Face::NegZ, Face::PosZ],
];

/// Offset from a hit cell to the empty cell in front of each face
const NEIGHBOR_OFFSETS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Face entered when stepping along `side` with the given step sign.
    #[inline]
    pub const fn from_step(side: Side, step: i32) -> Self {
        FACE_TABLE[side as usize][if step > 0 { 0 } else { 1 }]
    }

    #[inline]
    pub const fn neighbor_offset(self) -> IVec3 {
        NEIGHBOR_OFFSETS[self as usize]
    }

    #[inline]
    pub const fn side(self) -> Side {
        match self {
            Face::PosX | Face::NegX => Side::X,
            Face::PosY | Face::NegY => Side::Y,
            Face::PosZ | Face::NegZ => Side::Z,
        }
    }
}

/// Result of a voxel raycast, reused across casts
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HitResult {
    pub hit: bool,
    /// Block id of the hit cell
    pub block: u8,
    /// World units from the ray origin to the entry point
    pub distance: f32,
    pub side: Side,
    pub face: Face,
    /// Integer coordinates of the hit cell
    pub map_pos: IVec3,
    /// Exact entry point on the hit cell's face
    pub hit_pos: Vec3,
    /// DDA iterations taken, hit or miss
    pub steps: u32,
}

impl HitResult {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Empty cell in front of the hit face, where a placed block goes.
    #[inline]
    pub fn place_target(&self) -> Option<IVec3> {
        self.hit.then(|| self.map_pos + self.face.neighbor_offset())
    }
}

/// One boundary crossing of a `VoxelWalk`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WalkStep {
    /// Cell just entered
    pub voxel: IVec3,
    pub side: Side,
    /// +1 or -1 along `side`
    pub step: i32,
    /// Ray parameter at the crossing
    pub distance: f32,
}

/// Incremental cell-by-cell traversal of a ray through the unit grid.
/// Yields cells after the starting one; ends only if the direction is zero.
#[derive(Clone, Debug)]
pub struct VoxelWalk {
    voxel: IVec3,
    step: IVec3,
    t_delta: Vec3,
    t_max: Vec3,
}

impl VoxelWalk {
    /// `direction` should be unit length for distances in world units.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let voxel = origin.floor().as_ivec3();
        let mut step = IVec3::ZERO;
        let mut t_delta = Vec3::INFINITY;
        let mut t_max = Vec3::INFINITY;

        for axis in 0..3 {
            let d = direction[axis];
            // Zero (or NaN) components never advance: infinite delta, never chosen.
            if d > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / d;
                t_max[axis] = (voxel[axis] as f32 + 1.0 - origin[axis]) / d;
            } else if d < 0.0 {
                step[axis] = -1;
                t_delta[axis] = -1.0 / d;
                t_max[axis] = (origin[axis] - voxel[axis] as f32) / -d;
            }
        }

        Self {
            voxel,
            step,
            t_delta,
            t_max,
        }
    }

    /// Cell containing the ray origin
    #[inline]
    pub fn current(&self) -> IVec3 {
        self.voxel
    }
}

impl Iterator for VoxelWalk {
    type Item = WalkStep;

    #[inline]
    fn next(&mut self) -> Option<WalkStep> {
        let t = self.t_max;
        let axis = if t.x <= t.y && t.x <= t.z {
            0
        } else if t.y <= t.z {
            1
        } else {
            2
        };

        let distance = t[axis];
        if distance == f32::INFINITY {
            return None;
        }

        // Origins past the i32 grid saturate; the walk ends at the grid edge.
        self.voxel[axis] = self.voxel[axis].checked_add(self.step[axis])?;
        self.t_max[axis] += self.t_delta[axis];

        Some(WalkStep {
            voxel: self.voxel,
            side: Side::from_axis(axis),
            step: self.step[axis],
            distance,
        })
    }
}

/// Ray-grid traversal against the chunked world
#[derive(Copy, Clone, Debug)]
pub struct Raycaster {
    max_steps: u32,
}

impl Raycaster {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_max_steps(config.max_ray_steps)
    }

    pub fn with_max_steps(max_steps: u32) -> Self {
        Self {
            max_steps: max_steps.max(1),
        }
    }

    #[inline]
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Cast a ray through the world. `direction` must be unit length.
    /// Fills `hit` and returns `hit.hit`.
    #[inline]
    pub fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        chunks: &ChunkManager,
        hit: &mut HitResult,
    ) -> bool {
        self.cast_with(origin, direction, max_distance, hit, |cell| {
            chunks.get_block(cell.x, cell.y, cell.z)
        })
    }

    /// Cast against any world-coordinate block lookup.
    #[inline]
    pub fn cast_with<F>(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        hit: &mut HitResult,
        block_at: F,
    ) -> bool
    where
        F: Fn(IVec3) -> u8,
    {
        hit.reset();

        let mut walk = VoxelWalk::new(origin, direction);
        let mut steps = 0;

        while steps < self.max_steps {
            let Some(step) = walk.next() else {
                break;
            };
            steps += 1;

            // Written so NaN distances stop the ray too.
            if !(step.distance <= max_distance) {
                break;
            }

            let block = block_at(step.voxel);
            if block != AIR {
                hit.hit = true;
                hit.block = block;
                hit.distance = step.distance;
                hit.side = step.side;
                hit.face = Face::from_step(step.side, step.step);
                hit.map_pos = step.voxel;
                hit.hit_pos = origin + direction * step.distance;
                hit.steps = steps;
                return true;
            }
        }

        hit.steps = steps;
        false
    }
}
