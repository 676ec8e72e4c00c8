/// Main application entry point
/// Handles window creation, input, and the frame loop
use glam::Vec3;
use log::{error, info};
use mimalloc::MiMalloc;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use voxel_raycaster::rendering::blit_scaled;
use voxel_raycaster::*;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowBuilder},
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const CROSSHAIR_COLOR: u32 = 0xFFFF_FFFF;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),
}

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {path}");
            EngineConfig::load(&path)?
        }
        None => EngineConfig::default(),
    };
    info!(
        "chunk {}x{}x{}, render distance {} (+{}), ray distance {}, scale {}",
        config.chunk_size,
        config.chunk_height,
        config.chunk_size,
        config.render_distance,
        config.unload_margin,
        config.max_ray_distance,
        config.resolution_scale
    );
    info!("Controls: WASD move, Space/Shift up/down, Ctrl run, mouse look");
    info!("LMB break, RMB place, 1-5 select block, Esc release cursor or exit");

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Voxel Raycaster")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    let context = softbuffer::Context::new(window.clone())?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())?;

    let window_size = window.inner_size();
    let (render_w, render_h) = config.render_size(window_size.width, window_size.height);
    let mut framebuffer = Framebuffer::new(render_w, render_h);

    let mut chunks = ChunkManager::new(&config);
    {
        voxel_raycaster::perf_scope!("initial streaming");
        let initial = chunks.update(0.5, 0.5);
        info!("Initial streaming: {} chunks", initial.generated);
    }

    let spawn_y = spawn_height(&chunks, 0, 0) + config.player_height + 0.01;
    let mut camera = Camera::new(Vec3::new(0.5, spawn_y, 0.5), &config);
    let mut controller = CameraController::new(&config);
    let mut interaction = BlockInteraction::new(&config);
    let renderer = Renderer::new(&config);

    let mut last_frame = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();
    let mut mouse_captured = false;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(new_size) => {
                    let (w, h) = config.render_size(new_size.width, new_size.height);
                    framebuffer.resize(w, h);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;
                    if let PhysicalKey::Code(keycode) = event.physical_key {
                        match keycode {
                            KeyCode::KeyW => controller.forward_pressed = pressed,
                            KeyCode::KeyS => controller.backward_pressed = pressed,
                            KeyCode::KeyA => controller.left_pressed = pressed,
                            KeyCode::KeyD => controller.right_pressed = pressed,
                            KeyCode::Space => controller.up_pressed = pressed,
                            KeyCode::ShiftLeft => controller.down_pressed = pressed,
                            KeyCode::ControlLeft => controller.run_pressed = pressed,
                            KeyCode::Digit1 if pressed => {
                                select(&mut interaction, BlockType::Grass)
                            }
                            KeyCode::Digit2 if pressed => {
                                select(&mut interaction, BlockType::Dirt)
                            }
                            KeyCode::Digit3 if pressed => {
                                select(&mut interaction, BlockType::Stone)
                            }
                            KeyCode::Digit4 if pressed => {
                                select(&mut interaction, BlockType::Wood)
                            }
                            KeyCode::Digit5 if pressed => {
                                select(&mut interaction, BlockType::Sand)
                            }
                            KeyCode::Escape if pressed => {
                                if mouse_captured {
                                    mouse_captured = false;
                                    release_cursor(&window);
                                } else {
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if state != ElementState::Pressed {
                        return;
                    }
                    if !mouse_captured {
                        if button == MouseButton::Left {
                            mouse_captured = true;
                            capture_cursor(&window);
                        }
                        return;
                    }
                    match button {
                        MouseButton::Left => {
                            interaction.break_block(&mut chunks);
                        }
                        MouseButton::Right => {
                            interaction.place_block(&camera, &mut chunks);
                        }
                        _ => {}
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32().min(0.1);
                    last_frame = now;

                    controller.update_camera(&mut camera, &chunks, dt);
                    chunks.update(camera.position.x, camera.position.z);
                    interaction.update_target(&camera, &chunks, renderer.raycaster());

                    let stats = renderer.render(&camera, &chunks, &mut framebuffer);
                    draw_crosshair(&mut framebuffer);

                    if let Err(err) = present(&mut surface, &window, &framebuffer) {
                        error!("Failed to present frame: {err}");
                        elwt.exit();
                        return;
                    }

                    frame_count += 1;
                    if fps_timer.elapsed().as_secs() >= 1 {
                        #[cfg(feature = "profiling")]
                        {
                            let totals = voxel_raycaster::perf::ENGINE_COUNTERS.snapshot();
                            log::debug!(
                                "totals: {} frames, {} rays, {} steps, +{} -{} chunks",
                                totals.frames_rendered,
                                totals.rays_cast,
                                totals.dda_steps,
                                totals.chunks_generated,
                                totals.chunks_evicted
                            );
                        }
                        let p = camera.position;
                        info!(
                            "FPS: {} | Chunks: {} | Pos: ({:.1}, {:.1}, {:.1}) | {:.1} steps/ray",
                            frame_count,
                            chunks.chunk_count(),
                            p.x,
                            p.y,
                            p.z,
                            stats.average_steps()
                        );
                        frame_count = 0;
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if mouse_captured {
                    camera.rotate(delta.0 as f32, delta.1 as f32);
                }
            }
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    })?;

    Ok(())
}

/// Top of the highest solid cell in a column, or 0 if the column is empty
fn spawn_height(chunks: &ChunkManager, x: i32, z: i32) -> f32 {
    (0..chunks.chunk_height())
        .rev()
        .find(|&y| chunks.is_solid(x, y, z))
        .map_or(0.0, |y| (y + 1) as f32)
}

fn select(interaction: &mut BlockInteraction, block: BlockType) {
    interaction.select(block.id());
    info!("Selected {:?}", block);
}

fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        error!("Cursor grab unavailable: {err}");
    }
    window.set_cursor_visible(false);
}

fn release_cursor(window: &Window) {
    let _ = window.set_cursor_grab(CursorGrabMode::None);
    window.set_cursor_visible(true);
}

fn draw_crosshair(framebuffer: &mut Framebuffer) {
    let cx = framebuffer.width / 2;
    let cy = framebuffer.height / 2;
    for d in 0..3 {
        framebuffer.set_pixel(cx + d, cy, CROSSHAIR_COLOR);
        framebuffer.set_pixel(cx.wrapping_sub(d), cy, CROSSHAIR_COLOR);
        framebuffer.set_pixel(cx, cy + d, CROSSHAIR_COLOR);
        framebuffer.set_pixel(cx, cy.wrapping_sub(d), CROSSHAIR_COLOR);
    }
}

/// Upscale the internal buffer onto the window surface and present it
fn present(
    surface: &mut softbuffer::Surface<Arc<Window>, Arc<Window>>,
    window: &Window,
    framebuffer: &Framebuffer,
) -> Result<(), softbuffer::SoftBufferError> {
    let size = window.inner_size();
    let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
    else {
        // Minimised
        return Ok(());
    };

    surface.resize(width, height)?;
    let mut buffer = surface.buffer_mut()?;
    blit_scaled(framebuffer, &mut buffer, size.width as usize, size.height as usize);
    buffer.present()
}
