/// Flat per-face shading and distance fog.
/// Kept separate from the renderer so the lighting model
/// can evolve independently of ray traversal.
use super::framebuffer::pack_abgr;
use crate::raycast::Side;
use crate::voxel::block_color;

/// Fog fraction at or past which a hit is drawn as plain sky
const FOG_CUTOFF: f32 = 0.999;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadingConfig {
    /// Background and fog color
    pub sky_color: [u8; 3],
    /// Brightness per side, indexed X, Y, Z. Y (top/bottom) is full bright,
    /// the two vertical face pairs get different darker factors.
    pub side_factors: [f32; 3],
    pub fog_enabled: bool,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            sky_color: [135, 206, 235],
            side_factors: [0.8, 1.0, 0.6],
            fog_enabled: true,
        }
    }
}

impl ShadingConfig {
    #[inline]
    pub fn sky_pixel(&self) -> u32 {
        let [r, g, b] = self.sky_color;
        pack_abgr(r, g, b)
    }

    #[inline]
    pub fn side_factor(&self, side: Side) -> f32 {
        self.side_factors[side.axis()]
    }

    /// Fog blend weight in [0, 1] for a hit at `distance`
    #[inline]
    pub fn fog_amount(&self, distance: f32, max_distance: f32) -> f32 {
        if !self.fog_enabled {
            return 0.0;
        }
        (distance / max_distance).clamp(0.0, 1.0)
    }

    /// Final packed pixel for a hit: palette color, side shading, then fog.
    #[inline]
    pub fn shade_hit(&self, block: u8, side: Side, distance: f32, max_distance: f32) -> u32 {
        let fog = self.fog_amount(distance, max_distance);
        if fog >= FOG_CUTOFF {
            return self.sky_pixel();
        }

        let base = block_color(block);
        let light = self.side_factor(side);
        let keep = 1.0 - fog;

        let channel = |i: usize| -> u8 {
            let lit = base[i] as f32 * light;
            let fogged = lit * keep + self.sky_color[i] as f32 * fog;
            fogged.round().clamp(0.0, 255.0) as u8
        };

        pack_abgr(channel(0), channel(1), channel(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::framebuffer::unpack_abgr;
    use crate::voxel::BlockType;

    fn no_fog() -> ShadingConfig {
        ShadingConfig {
            fog_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_top_faces_are_full_brightness() {
        let cfg = no_fog();
        let pixel = cfg.shade_hit(BlockType::Stone.id(), Side::Y, 1.0, 64.0);
        assert_eq!(unpack_abgr(pixel), [128, 128, 128]);
    }

    #[test]
    fn test_vertical_face_pairs_are_darker_and_distinct() {
        let cfg = no_fog();
        let top = unpack_abgr(cfg.shade_hit(BlockType::Sand.id(), Side::Y, 1.0, 64.0));
        let x = unpack_abgr(cfg.shade_hit(BlockType::Sand.id(), Side::X, 1.0, 64.0));
        let z = unpack_abgr(cfg.shade_hit(BlockType::Sand.id(), Side::Z, 1.0, 64.0));
        assert!(x[0] < top[0]);
        assert!(z[0] < top[0]);
        assert_ne!(x, z);
    }

    #[test]
    fn test_fog_reaches_sky_at_max_distance() {
        let cfg = ShadingConfig::default();
        assert_eq!(
            cfg.shade_hit(BlockType::Grass.id(), Side::Y, 64.0, 64.0),
            cfg.sky_pixel()
        );
        assert_eq!(cfg.fog_amount(32.0, 64.0), 0.5);
        assert_eq!(cfg.fog_amount(0.0, 64.0), 0.0);
    }

    #[test]
    fn test_fog_blends_linearly_toward_sky() {
        let cfg = ShadingConfig {
            sky_color: [200, 200, 200],
            ..Default::default()
        };
        let [r, _, _] = unpack_abgr(cfg.shade_hit(BlockType::Stone.id(), Side::Y, 32.0, 64.0));
        assert_eq!(r, 164);
    }
}
