use image::RgbImage;
use rayon::prelude::*;

use super::DepthFunc;
use crate::core::Color;

/// Cleared depth value, the far end of the [0, 1] window depth range.
pub const DEPTH_CLEAR: f32 = 1.0;

/// Color (0RGB, the layout minifb presents) plus depth, one entry per pixel,
/// row 0 at the top.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let buf_size = width * height;
        FrameBuffer {
            width,
            height,
            data: vec![0; buf_size],
            depth: vec![DEPTH_CLEAR; buf_size],
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.data.par_chunks_mut(1024).for_each(|chunk| chunk.fill(color));
        self.depth
            .par_chunks_mut(1024)
            .for_each(|chunk| chunk.fill(DEPTH_CLEAR));
    }

    /// Reallocate for a new size. Contents are undefined until the next clear.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, 0);
        self.depth.resize(width * height, DEPTH_CLEAR);
    }

    /// Write a fragment if it survives the depth test. Returns whether it was written.
    pub fn set_pixel(
        &mut self,
        pos: (usize, usize),
        depth: f32,
        color: Color,
        depth_test: Option<DepthFunc>,
    ) -> bool {
        if pos.0 >= self.width || pos.1 >= self.height {
            return false;
        }
        let index = pos.0 + pos.1 * self.width;
        if let Some(func) = depth_test {
            if !func.passes(depth, self.depth[index]) {
                return false;
            }
            self.depth[index] = depth;
        }
        self.data[index] = color.to_u32();
        true
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.data[x + y * self.width])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.depth[x + y * self.width])
    }

    pub fn to_image(&self) -> RgbImage {
        let mut bytes = vec![0u8; self.data.len() * 3];
        bytes
            .par_chunks_mut(3)
            .zip(self.data.par_iter())
            .for_each(|(out, &px)| out.copy_from_slice(&Color::rgb_bytes(px)));
        RgbImage::from_raw(self.width as u32, self.height as u32, bytes)
            .unwrap_or_else(|| RgbImage::new(self.width as u32, self.height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_color_and_depth() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.set_pixel((1, 1), 0.25, Color::RED, Some(DepthFunc::LessEqual));
        fb.clear(0x0012_3456);
        assert!(fb.data.iter().all(|&c| c == 0x0012_3456));
        assert!(fb.depth.iter().all(|&d| d == DEPTH_CLEAR));
    }

    #[test]
    fn depth_test_keeps_nearest() {
        let mut fb = FrameBuffer::new(2, 2);
        let test = Some(DepthFunc::LessEqual);
        assert!(fb.set_pixel((0, 0), 0.5, Color::RED, test));
        assert!(!fb.set_pixel((0, 0), 0.7, Color::GREEN, test));
        assert!(fb.set_pixel((0, 0), 0.5, Color::BLUE, test));
        assert_eq!(fb.pixel(0, 0), Some(Color::BLUE.to_u32()));
        assert_eq!(fb.depth_at(0, 0), Some(0.5));
    }

    #[test]
    fn without_depth_test_last_write_wins() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set_pixel((1, 0), 0.1, Color::RED, None);
        fb.set_pixel((1, 0), 0.9, Color::GREEN, None);
        assert_eq!(fb.pixel(1, 0), Some(Color::GREEN.to_u32()));
        assert_eq!(fb.depth_at(1, 0), Some(DEPTH_CLEAR));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut fb = FrameBuffer::new(2, 2);
        assert!(!fb.set_pixel((2, 0), 0.0, Color::RED, None));
        assert_eq!(fb.pixel(5, 5), None);
    }

    #[test]
    fn image_matches_buffer() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.clear(Color::BLUE.to_u32());
        fb.set_pixel((2, 1), 0.0, Color::RED, None);
        let img = fb.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(2, 1).0, [255, 0, 0]);
    }
}
