/// Per-pixel ray cast renderer
/// One DDA ray per framebuffer pixel, shaded flat per face and fogged.
/// No heap allocation happens per pixel or per row.
use super::framebuffer::{FrameSlice, Framebuffer};
use super::shading::ShadingConfig;
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::count_add;
use crate::perf::FrameStats;
use crate::raycast::{HitResult, Raycaster};
use crate::world::ChunkManager;
use glam::Vec3;
use log::{trace, warn};
use std::time::{Duration, Instant};

const FRAME_BUDGET: Duration = Duration::from_millis(16);

/// Camera basis for one frame. `right` and `up` are pre-scaled so that
/// ndc coordinates in [-1, 1] span the field of view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewBasis {
    pub origin: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl ViewBasis {
    pub fn from_camera(camera: &Camera, aspect_ratio: f32) -> Self {
        let forward = camera.direction().normalize_or_zero();

        // Looking straight up or down: forward x world-up vanishes.
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() < 1e-8 {
            right = Vec3::X;
        } else {
            right = right.normalize();
        }
        let up = right.cross(forward);

        let tan_half_fov = (camera.fov() * 0.5).tan();
        Self {
            origin: camera.position,
            forward,
            right: right * (aspect_ratio * tan_half_fov),
            up: up * tan_half_fov,
        }
    }

    /// Unnormalised direction through the middle of a row; `ndc_y` is +1 at the top
    #[inline]
    pub fn row_base(&self, ndc_y: f32) -> Vec3 {
        self.forward + self.up * ndc_y
    }

    /// Unit ray direction for a pixel in a row; `ndc_x` runs -1 (left) to +1
    #[inline]
    pub fn ray_direction(&self, row_base: Vec3, ndc_x: f32) -> Vec3 {
        (row_base + self.right * ndc_x).normalize()
    }
}

pub struct Renderer {
    raycaster: Raycaster,
    pub shading: ShadingConfig,
    max_distance: f32,
    parallel_rows: bool,
}

impl Renderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            raycaster: Raycaster::new(config),
            shading: ShadingConfig::default(),
            max_distance: config.max_ray_distance,
            parallel_rows: config.parallel_rows,
        }
    }

    #[inline]
    pub fn raycaster(&self) -> &Raycaster {
        &self.raycaster
    }

    #[inline]
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn set_parallel_rows(&mut self, enabled: bool) {
        self.parallel_rows = enabled;
    }

    /// Render one frame into `framebuffer`. Every pixel is written.
    pub fn render(
        &self,
        camera: &Camera,
        chunks: &ChunkManager,
        framebuffer: &mut Framebuffer,
    ) -> FrameStats {
        let frame_start = Instant::now();

        if framebuffer.width == 0 || framebuffer.height == 0 {
            return FrameStats::default();
        }

        let aspect = framebuffer.width as f32 / framebuffer.height as f32;
        let basis = ViewBasis::from_camera(camera, aspect);

        let mut stats = if self.parallel_rows {
            self.render_parallel(&basis, chunks, framebuffer)
        } else {
            let mut slice = framebuffer.as_full_slice_mut();
            self.render_slice(&basis, chunks, &mut slice)
        };

        stats.frame_time = frame_start.elapsed();
        count_add!(crate::perf::ENGINE_COUNTERS.frames_rendered, 1);
        count_add!(crate::perf::ENGINE_COUNTERS.rays_cast, stats.rays_cast);
        count_add!(crate::perf::ENGINE_COUNTERS.dda_steps, stats.dda_steps);

        if stats.frame_time > FRAME_BUDGET {
            warn!(
                "Frame time: {:.2}ms (> 16ms), {:.1} steps/ray",
                stats.frame_time.as_secs_f64() * 1000.0,
                stats.average_steps()
            );
        } else {
            trace!(
                "frame {}x{}: {} rays, {} hits, {:.1} steps/ray",
                framebuffer.width,
                framebuffer.height,
                stats.rays_cast,
                stats.hits,
                stats.average_steps()
            );
        }

        stats
    }

    fn render_parallel(
        &self,
        basis: &ViewBasis,
        chunks: &ChunkManager,
        framebuffer: &mut Framebuffer,
    ) -> FrameStats {
        use rayon::prelude::*;

        // Over-subscribe for load balancing; sky rows are much cheaper than ground rows.
        let stripe_count = rayon::current_num_threads() * 4;
        framebuffer
            .split_into_stripes(stripe_count)
            .into_par_iter()
            .map(|mut slice| self.render_slice(basis, chunks, &mut slice))
            .reduce(FrameStats::default, |mut a, b| {
                a.merge(&b);
                a
            })
    }

    /// Cast and shade every pixel of a row stripe.
    fn render_slice(
        &self,
        basis: &ViewBasis,
        chunks: &ChunkManager,
        slice: &mut FrameSlice<'_>,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        let mut hit = HitResult::default();

        let width = slice.width;
        let full_height = slice.full_height as f32;
        let inv_width = 2.0 / width as f32;
        let sky = self.shading.sky_pixel();

        for y_local in 0..slice.height {
            let y = (slice.y0 + y_local) as f32;
            let ndc_y = 1.0 - 2.0 * (y + 0.5) / full_height;
            let row_base = basis.row_base(ndc_y);

            let row = slice.row_mut(y_local);
            for (x, pixel) in row.iter_mut().enumerate() {
                let ndc_x = (x as f32 + 0.5) * inv_width - 1.0;
                let dir = basis.ray_direction(row_base, ndc_x);

                let found = self.raycaster.cast(
                    basis.origin,
                    dir,
                    self.max_distance,
                    chunks,
                    &mut hit,
                );

                stats.rays_cast += 1;
                stats.dda_steps += hit.steps as u64;

                *pixel = if found {
                    stats.hits += 1;
                    self.shading
                        .shade_hit(hit.block, hit.side, hit.distance, self.max_distance)
                } else {
                    sky
                };
            }
        }

        stats
    }
}
