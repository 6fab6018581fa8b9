//! CPU colour buffer the frame is painted into before upload.
use raylib::core::texture::RaylibTexture2D;
use raylib::prelude::*;
use tracing::warn;

pub struct Framebuffer {
    pub color_buffer: Vec<Color>,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        let bg = Color::BLACK;
        Self { color_buffer: vec![bg; size], width, height, background_color: bg }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.color_buffer.fill(self.background_color);
    }

    #[inline]
    pub fn set_pixel_color(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.color_buffer[(y * self.width + x) as usize] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            return self.color_buffer[(y * self.width + x) as usize];
        }
        self.background_color
    }

    #[inline]
    pub fn set_background_color(&mut self, c: Color) {
        self.background_color = c;
    }

    /// Fills rows `y0..y1` with one colour, clipped to the buffer.
    pub fn fill_rows(&mut self, y0: u32, y1: u32, color: Color) {
        let y1 = y1.min(self.height);
        if y0 >= y1 {
            return;
        }
        let start = (y0 * self.width) as usize;
        let end = (y1 * self.width) as usize;
        self.color_buffer[start..end].fill(color);
    }

    /// Copies the pixels into a persistent texture of the same size.
    pub fn upload_to_texture(&self, tex: &mut Texture2D) {
        // &[Color] viewed as RGBA8 bytes, no copy
        let byte_len = self.color_buffer.len() * std::mem::size_of::<Color>();
        let bytes: &[u8] = unsafe { std::slice::from_raw_parts(self.color_buffer.as_ptr() as *const u8, byte_len) };
        if let Err(e) = tex.update_texture(bytes) {
            warn!(error = %e, "framebuffer upload failed");
        }
    }
}
