/// Software ray cast rendering into a packed color buffer
pub mod framebuffer;
pub mod renderer;
pub mod shading;

pub use framebuffer::{blit_scaled, pack_abgr, unpack_abgr, FrameSlice, Framebuffer};
pub use renderer::{Renderer, ViewBasis};
pub use shading::ShadingConfig;
