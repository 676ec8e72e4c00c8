/// Framebuffer for software rendering
/// Packed 32-bit pixels, alpha in the high byte, then blue, green, red:
/// 0xAABBGGRR. The host converts to its surface format when blitting.

/// View into a contiguous set of rows in the framebuffer.
/// Used for multi-core rendering where each worker owns a disjoint slice.
pub struct FrameSlice<'a> {
    pub width: usize,
    pub full_height: usize,
    pub y0: usize,
    pub height: usize,
    pub color: &'a mut [u32],
}

impl<'a> FrameSlice<'a> {
    /// Pixels of one row, `y_local` relative to this slice
    #[inline]
    pub fn row_mut(&mut self, y_local: usize) -> &mut [u32] {
        let start = y_local * self.width;
        &mut self.color[start..start + self.width]
    }
}

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub color_buffer: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color_buffer: vec![0; width * height],
        }
    }

    pub fn clear(&mut self, clear_color: u32) {
        self.color_buffer.fill(clear_color);
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.color_buffer[y * self.width + x] = color;
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.color_buffer[y * self.width + x])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.color_buffer
    }

    /// Create a FrameSlice covering the entire framebuffer
    pub fn as_full_slice_mut(&mut self) -> FrameSlice<'_> {
        FrameSlice {
            width: self.width,
            full_height: self.height,
            y0: 0,
            height: self.height,
            color: &mut self.color_buffer,
        }
    }

    /// Resize; contents are unspecified until the next full render.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.color_buffer.resize(width * height, 0);
    }

    /// Split the framebuffer into horizontal stripes for multi-core rendering.
    /// Each stripe owns a disjoint subset of rows, so they can be rendered in parallel.
    pub fn split_into_stripes(&mut self, stripes: usize) -> Vec<FrameSlice<'_>> {
        let stripes = stripes.max(1);
        let width = self.width;
        let height = self.height;

        let mut slices = Vec::with_capacity(stripes);
        let mut remaining: &mut [u32] = self.color_buffer.as_mut_slice();

        let mut y0 = 0usize;
        let rows_per_stripe = (height + stripes - 1) / stripes;

        for _ in 0..stripes {
            if y0 >= height {
                break;
            }
            let rows = (height - y0).min(rows_per_stripe);
            let (head, tail) = remaining.split_at_mut(rows * width);

            slices.push(FrameSlice {
                width,
                full_height: height,
                y0,
                height: rows,
                color: head,
            });

            remaining = tail;
            y0 += rows;
        }

        slices
    }
}

/// Pack RGB into the framebuffer's 0xAABBGGRR layout, fully opaque
#[inline]
pub const fn pack_abgr(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32)
}

/// Unpack a 0xAABBGGRR pixel into [r, g, b]
#[inline]
pub const fn unpack_abgr(pixel: u32) -> [u8; 3] {
    [
        (pixel & 0xFF) as u8,
        ((pixel >> 8) & 0xFF) as u8,
        ((pixel >> 16) & 0xFF) as u8,
    ]
}

/// Convert 0xAABBGGRR to the 0x00RRGGBB layout most window surfaces expect
#[inline]
pub const fn abgr_to_xrgb(pixel: u32) -> u32 {
    ((pixel & 0xFF) << 16) | (pixel & 0xFF00) | ((pixel >> 16) & 0xFF)
}

/// Nearest-neighbour upscale of `src` into a `dst_width` x `dst_height`
/// 0RGB surface buffer.
pub fn blit_scaled(src: &Framebuffer, dst: &mut [u32], dst_width: usize, dst_height: usize) {
    if src.width == 0 || src.height == 0 || dst_width == 0 {
        return;
    }
    for (dy, dst_row) in dst.chunks_exact_mut(dst_width).take(dst_height).enumerate() {
        let sy = dy * src.height / dst_height;
        let src_row = &src.color_buffer[sy * src.width..(sy + 1) * src.width];
        for (dx, out) in dst_row.iter_mut().enumerate() {
            let sx = dx * src.width / dst_width;
            *out = abgr_to_xrgb(src_row[sx]);
        }
    }
}
