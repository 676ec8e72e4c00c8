/// Voxel Raycaster - per-pixel DDA ray casting over a streamed chunk grid
pub mod camera;
pub mod config;
pub mod interaction;
pub mod perf;
pub mod raycast;
pub mod rendering;
pub mod terrain;
pub mod voxel;
pub mod world;

pub use camera::{Camera, CameraController};
pub use config::{ConfigError, EngineConfig, TerrainConfig};
pub use interaction::BlockInteraction;
pub use perf::{FrameStats, PerfTimer};
pub use raycast::{Face, HitResult, Raycaster, Side, VoxelWalk, WalkStep};
pub use rendering::{Framebuffer, Renderer, ShadingConfig, ViewBasis};
pub use terrain::{EmptyTerrain, FlatTerrain, NoiseTerrain, TerrainGenerator};
pub use voxel::{BlockType, Chunk, AIR, BLOCK_TYPE_COUNT};
pub use world::{ChunkManager, StreamDelta};

pub use glam::{IVec2, IVec3, Vec3};
