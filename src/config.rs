/// Engine configuration
/// Built once at startup and shared by reference with the camera,
/// chunk manager and renderer. Nothing mutates it after construction.
use crate::voxel::BlockType;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Tallest chunk the packed block ids and the y loop counters are sized for.
pub const MAX_CHUNK_HEIGHT: usize = 256;
/// Widest chunk; keeps one chunk under 16 MiB at full height.
pub const MAX_CHUNK_SIZE: usize = 256;
/// Largest residency radius in chunks. Squared radii stay far inside i32.
pub const MAX_RENDER_DISTANCE: i32 = 64;
/// Largest hysteresis margin in chunks
pub const MAX_UNLOAD_MARGIN: i32 = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Which terrain generator new chunks are populated with.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainConfig {
    Empty,
    Flat { height: i32, block: u8 },
    Noise { seed: u32 },
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Flat {
            height: 0,
            block: BlockType::Stone as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Horizontal chunk extent in voxels (x and z)
    pub chunk_size: usize,
    /// Vertical chunk extent in voxels
    pub chunk_height: usize,
    /// Residency radius around the viewpoint, in chunks
    pub render_distance: i32,
    /// Extra chunks kept past `render_distance` before eviction
    pub unload_margin: i32,
    /// Rays stop after this many world units
    pub max_ray_distance: f32,
    /// Hard cap on DDA iterations per ray
    pub max_ray_steps: u32,
    pub fov_degrees: f32,
    /// Radians of rotation per pixel of pointer movement
    pub mouse_sensitivity: f32,
    /// Internal render resolution as a fraction of the window size
    pub resolution_scale: f32,
    pub move_speed: f32,
    pub run_multiplier: f32,
    /// Eye height above the feet cell
    pub player_height: f32,
    /// Max distance for break/place targeting
    pub reach_distance: f32,
    /// Cast rows on the rayon pool instead of the calling thread
    pub parallel_rows: bool,
    pub terrain: TerrainConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            chunk_height: 32,
            render_distance: 4,
            unload_margin: 1,
            max_ray_distance: 64.0,
            max_ray_steps: 512,
            fov_degrees: 70.0,
            mouse_sensitivity: 0.002,
            resolution_scale: 0.5,
            move_speed: 6.0,
            run_multiplier: 2.0,
            player_height: 1.6,
            reach_distance: 6.0,
            parallel_rows: false,
            terrain: TerrainConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(invalid(
                "chunk_size",
                format!("must be in 1..={MAX_CHUNK_SIZE}"),
            ));
        }
        if self.chunk_height == 0 || self.chunk_height > MAX_CHUNK_HEIGHT {
            return Err(invalid(
                "chunk_height",
                format!("must be in 1..={MAX_CHUNK_HEIGHT}"),
            ));
        }
        if !(0..=MAX_RENDER_DISTANCE).contains(&self.render_distance) {
            return Err(invalid(
                "render_distance",
                format!("must be in 0..={MAX_RENDER_DISTANCE}"),
            ));
        }
        if !(0..=MAX_UNLOAD_MARGIN).contains(&self.unload_margin) {
            return Err(invalid(
                "unload_margin",
                format!("must be in 0..={MAX_UNLOAD_MARGIN}"),
            ));
        }
        if !self.max_ray_distance.is_finite() || self.max_ray_distance <= 0.0 {
            return Err(invalid("max_ray_distance", "must be a positive number"));
        }
        if self.max_ray_steps == 0 {
            return Err(invalid("max_ray_steps", "must be at least 1"));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees", "must be in (0, 180)"));
        }
        if !(self.resolution_scale > 0.0 && self.resolution_scale <= 1.0) {
            return Err(invalid("resolution_scale", "must be in (0, 1]"));
        }
        if !self.reach_distance.is_finite() || self.reach_distance <= 0.0 {
            return Err(invalid("reach_distance", "must be a positive number"));
        }
        Ok(())
    }

    #[inline]
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Internal render size for a display surface of the given pixel size.
    /// Never returns a zero dimension.
    pub fn render_size(&self, display_width: u32, display_height: u32) -> (usize, usize) {
        let w = (display_width as f32 * self.resolution_scale).round() as usize;
        let h = (display_height as f32 * self.resolution_scale).round() as usize;
        (w.max(1), h.max(1))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            render_distance = 6
            resolution_scale = 0.25

            [terrain]
            kind = "noise"
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.render_distance, 6);
        assert_eq!(config.resolution_scale, 0.25);
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.terrain, TerrainConfig::Noise { seed: 42 });
    }

    #[test]
    fn test_rejects_zero_step_cap() {
        let err = EngineConfig::from_toml_str("max_ray_steps = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_ray_steps",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_oversized_chunks() {
        let err = EngineConfig::from_toml_str("chunk_size = 4294967296").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "chunk_size",
                ..
            }
        ));

        let config = EngineConfig {
            chunk_size: MAX_CHUNK_SIZE + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = EngineConfig {
            chunk_size: MAX_CHUNK_SIZE,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_streaming_radii() {
        let err = EngineConfig::from_toml_str("render_distance = 50000").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "render_distance",
                ..
            }
        ));
        let err = EngineConfig::from_toml_str("render_distance = -1").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let err = EngineConfig::from_toml_str("unload_margin = 1000").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "unload_margin",
                ..
            }
        ));
        assert!(EngineConfig::from_toml_str("render_distance = 64").is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_resolution_scale() {
        let config = EngineConfig {
            resolution_scale: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("chunk_size = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_render_size_never_collapses_to_zero() {
        let config = EngineConfig {
            resolution_scale: 0.01,
            ..Default::default()
        };
        assert_eq!(config.render_size(1280, 720), (13, 7));
        assert_eq!(config.render_size(10, 10), (1, 1));
    }
}
