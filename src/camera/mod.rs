/// Camera system with FPS-style controls
/// Mouse look and WASD movement with voxel occupancy collision
use crate::config::EngineConfig;
use crate::world::ChunkManager;
use glam::{IVec3, Vec3};

/// Pitch limit, strictly inside +-90 degrees
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

pub struct Camera {
    pub position: Vec3,
    yaw: f32,   // Rotation around Y axis (radians), 0 looks down -Z
    pitch: f32, // Elevation (radians), positive looks up
    fov: f32,
    mouse_sensitivity: f32,

    // Derived from yaw/pitch on every orientation change
    direction: Vec3,
    plane: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, config: &EngineConfig) -> Self {
        let mut camera = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: config.fov_radians(),
            mouse_sensitivity: config.mouse_sensitivity,
            direction: Vec3::NEG_Z,
            plane: Vec3::X,
        };
        camera.recompute();
        camera
    }

    /// Update camera orientation from a pointer delta in pixels
    pub fn rotate(&mut self, mouse_delta_x: f32, mouse_delta_y: f32) {
        self.set_orientation(
            self.yaw + mouse_delta_x * self.mouse_sensitivity,
            self.pitch - mouse_delta_y * self.mouse_sensitivity,
        );
    }

    /// Set absolute yaw/pitch (radians). Pitch is clamped like `rotate`.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
        self.recompute();
    }

    fn recompute(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        self.direction = Vec3::new(cos_pitch * sin_yaw, sin_pitch, -cos_pitch * cos_yaw);
        self.plane = Vec3::new(cos_yaw, 0.0, sin_yaw) * (self.fov * 0.5).tan();
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Unit view direction
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Horizontal field-of-view plane vector, length tan(fov / 2)
    #[inline]
    pub fn plane(&self) -> Vec3 {
        self.plane
    }

    /// View direction flattened onto the ground plane, unit length
    #[inline]
    pub fn forward_horizontal(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(sin_yaw, 0.0, -cos_yaw)
    }

    /// Horizontal right vector, unit length
    #[inline]
    pub fn right_horizontal(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, sin_yaw)
    }
}

/// Voxel cells occupied by a player whose eye is at `eye`: feet then head.
#[inline]
pub fn body_cells(eye: Vec3, player_height: f32) -> [IVec3; 2] {
    let feet = Vec3::new(eye.x, eye.y - player_height, eye.z);
    [feet.floor().as_ivec3(), eye.floor().as_ivec3()]
}

/// Camera controller - handles movement input state
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    pub run_pressed: bool,

    move_speed: f32,
    run_multiplier: f32,
    player_height: f32,
}

impl CameraController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            forward_pressed: false,
            backward_pressed: false,
            left_pressed: false,
            right_pressed: false,
            up_pressed: false,
            down_pressed: false,
            run_pressed: false,
            move_speed: config.move_speed,
            run_multiplier: config.run_multiplier,
            player_height: config.player_height,
        }
    }

    /// Movement intent in world space, before speed and collision
    pub fn intent(&self, camera: &Camera) -> Vec3 {
        let mut forward = 0.0;
        let mut right = 0.0;
        let mut up = 0.0;

        if self.forward_pressed {
            forward += 1.0;
        }
        if self.backward_pressed {
            forward -= 1.0;
        }
        if self.right_pressed {
            right += 1.0;
        }
        if self.left_pressed {
            right -= 1.0;
        }
        if self.up_pressed {
            up += 1.0;
        }
        if self.down_pressed {
            up -= 1.0;
        }

        let mut horizontal =
            camera.forward_horizontal() * forward + camera.right_horizontal() * right;
        if horizontal.length_squared() > 1.0 {
            horizontal = horizontal.normalize();
        }
        horizontal + Vec3::Y * up
    }

    /// Move the camera by the current intent. Each axis moves independently
    /// and only if the feet and head cells at the destination are air.
    pub fn update_camera(&self, camera: &mut Camera, chunks: &ChunkManager, dt: f32) {
        let mut speed = self.move_speed * dt;
        if self.run_pressed {
            speed *= self.run_multiplier;
        }
        let step = self.intent(camera) * speed;

        for axis in 0..3 {
            if step[axis] == 0.0 {
                continue;
            }
            let mut candidate = camera.position;
            candidate[axis] += step[axis];
            if self.is_free(candidate, chunks) {
                camera.position = candidate;
            }
        }
    }

    /// True if the player body fits at `eye`
    pub fn is_free(&self, eye: Vec3, chunks: &ChunkManager) -> bool {
        body_cells(eye, self.player_height)
            .iter()
            .all(|cell| !chunks.is_solid(cell.x, cell.y, cell.z))
    }

    pub fn player_height(&self) -> f32 {
        self.player_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;

    fn config() -> EngineConfig {
        EngineConfig {
            terrain: TerrainConfig::Empty,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO, &config());
        assert!((camera.direction() - Vec3::NEG_Z).length() < 1e-6);
        let expected = (70.0f32.to_radians() * 0.5).tan();
        assert!((camera.plane().length() - expected).abs() < 1e-6);
        assert!(camera.plane().dot(camera.direction()).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped_inside_vertical() {
        let mut camera = Camera::new(Vec3::ZERO, &config());
        camera.rotate(0.0, -1.0e6);
        assert!(camera.pitch() < std::f32::consts::FRAC_PI_2);
        assert!(camera.pitch() > 0.0);
        camera.rotate(0.0, 2.0e6);
        assert!(camera.pitch() > -std::f32::consts::FRAC_PI_2);
        assert!(camera.direction().y < -0.99);
    }

    #[test]
    fn test_rotate_scales_by_sensitivity() {
        let mut camera = Camera::new(Vec3::ZERO, &config());
        camera.rotate(100.0, 50.0);
        assert!((camera.yaw() - 0.2).abs() < 1e-6);
        assert!((camera.pitch() + 0.1).abs() < 1e-6);
        assert!((camera.direction().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_movement_is_blocked_per_axis_by_solid_cells() {
        let config = config();
        let mut chunks = ChunkManager::new(&config);
        // Wall across the -Z direction at feet and head height.
        for x in -4..8 {
            chunks.set_block(x, 1, -2, 3);
            chunks.set_block(x, 2, -2, 3);
        }

        let mut camera = Camera::new(Vec3::new(0.5, 2.6, -0.5), &config);
        let mut controller = CameraController::new(&config);
        controller.forward_pressed = true;
        controller.right_pressed = true;

        for _ in 0..20 {
            controller.update_camera(&mut camera, &chunks, 0.05);
        }

        // Slid along +X, never entered the wall row.
        assert!(camera.position.z > -1.0);
        assert!(camera.position.x > 1.0);
    }

    #[test]
    fn test_body_cells_cover_feet_and_head() {
        let cells = body_cells(Vec3::new(0.5, 2.6, 0.5), 1.6);
        assert_eq!(cells, [IVec3::new(0, 1, 0), IVec3::new(0, 2, 0)]);
    }
}
