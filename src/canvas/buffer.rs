use crate::canvas::error::CanvasError;
use crate::canvas::model::Color;
use image::{DynamicImage, RgbaImage};

pub const CHANNELS: usize = 4;

/// Row-major RGBA8 pixel storage with fixed, non-zero dimensions.
///
/// Per-pixel access tolerates out-of-range coordinates (reads return `None`,
/// writes are dropped). Whole-buffer operations reject mismatched dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Result<Self, CanvasError> {
        let len = byte_len(width, height)?;
        let mut pixels = vec![0u8; len];
        for chunk in pixels.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&fill.to_rgba_array());
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CanvasError> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(CanvasError::PixelLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Result<Self, CanvasError> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
    }

    /// Normalizes any decoded image (grayscale, RGB, 16-bit, ...) to RGBA8.
    pub fn from_dynamic_image(image: DynamicImage) -> Result<Self, CanvasError> {
        Self::from_rgba_image(image.into_rgba8())
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage, CanvasError> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            CanvasError::PixelLength {
                expected: self.pixels.len(),
                actual: self.pixels.len(),
            },
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub(crate) fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.index(x, y)?;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx..idx + CHANNELS].copy_from_slice(&color.to_rgba_array());
        }
    }

    /// Writes `color` to the inclusive span `x0..=x1` of row `y`, clipped to the buffer.
    pub(crate) fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        if y < 0 || y as u32 >= self.height {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32 - 1);
        if x0 > x1 {
            return;
        }
        let rgba = color.to_rgba_array();
        let row_base = y as usize * self.stride();
        for x in x0..=x1 {
            let idx = row_base + x as usize * CHANNELS;
            self.pixels[idx..idx + CHANNELS].copy_from_slice(&rgba);
        }
    }

    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba_array();
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Copies `other` into this buffer. Both must have identical dimensions.
    pub fn replace_from(&mut self, other: &PixelBuffer) -> Result<(), CanvasError> {
        if self.dimensions() != other.dimensions() {
            return Err(CanvasError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        self.pixels.copy_from_slice(&other.pixels);
        Ok(())
    }

    /// Reallocates to `width` x `height`, keeping the overlapping top-left
    /// region and filling newly exposed pixels with `fill`.
    pub fn resize(&mut self, width: u32, height: u32, fill: Color) -> Result<(), CanvasError> {
        if (width, height) == self.dimensions() {
            return Ok(());
        }
        let mut resized = PixelBuffer::new(width, height, fill)?;
        let copy_w = self.width.min(width) as usize * CHANNELS;
        for y in 0..self.height.min(height) as usize {
            let src = y * self.stride();
            let dst = y * resized.stride();
            resized.pixels[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
        }
        *self = resized;
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, CanvasError> {
    if width == 0 || height == 0 {
        return Err(CanvasError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(CanvasError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_every_pixel_with_color() {
        let buffer = PixelBuffer::new(3, 2, Color::rgba(1, 2, 3, 4)).expect("buffer");
        assert_eq!(buffer.as_raw().len(), 3 * 2 * 4);
        assert!(buffer
            .as_raw()
            .chunks_exact(4)
            .all(|px| px == [1, 2, 3, 4]));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            PixelBuffer::new(0, 5, Color::WHITE),
            Err(CanvasError::InvalidDimensions {
                width: 0,
                height: 5
            })
        );
    }

    #[test]
    fn set_then_get_returns_written_color() {
        let mut buffer = PixelBuffer::new(4, 4, Color::WHITE).expect("buffer");
        let color = Color::rgba(10, 20, 30, 40);
        for y in 0..4 {
            for x in 0..4 {
                buffer.set_pixel(x, y, color);
                assert_eq!(buffer.pixel(x, y), Some(color));
            }
        }
    }

    #[test]
    fn out_of_bounds_access_is_silent() {
        let mut buffer = PixelBuffer::new(2, 2, Color::WHITE).expect("buffer");
        let before = buffer.clone();
        buffer.set_pixel(-1, 0, Color::BLACK);
        buffer.set_pixel(0, 2, Color::BLACK);
        buffer.set_pixel(2, 0, Color::BLACK);
        assert_eq!(buffer, before);
        assert_eq!(buffer.pixel(5, 5), None);
        assert_eq!(buffer.pixel(-1, -1), None);
    }

    #[test]
    fn clear_fills_every_pixel_and_keeps_dimensions() {
        let mut buffer = PixelBuffer::new(3, 2, Color::WHITE).expect("buffer");
        buffer.set_pixel(1, 1, Color::BLACK);
        let teal = Color::rgba(0, 128, 128, 200);
        buffer.clear(teal);
        assert_eq!(buffer.dimensions(), (3, 2));
        assert!(buffer
            .as_raw()
            .chunks_exact(4)
            .all(|px| px == teal.to_rgba_array()));
    }

    #[test]
    fn clone_is_independent_of_source() {
        let mut buffer = PixelBuffer::new(2, 2, Color::WHITE).expect("buffer");
        let snapshot = buffer.clone();
        buffer.set_pixel(0, 0, Color::BLACK);
        assert_eq!(snapshot.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn replace_from_rejects_different_dimensions() {
        let mut buffer = PixelBuffer::new(2, 2, Color::WHITE).expect("buffer");
        let other = PixelBuffer::new(3, 2, Color::BLACK).expect("other");
        assert_eq!(
            buffer.replace_from(&other),
            Err(CanvasError::DimensionMismatch {
                expected: (2, 2),
                actual: (3, 2)
            })
        );
        assert!(buffer.as_raw().iter().all(|&c| c == 255));
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        assert_eq!(
            PixelBuffer::from_raw(2, 2, vec![0; 15]),
            Err(CanvasError::PixelLength {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn resize_keeps_overlap_and_fills_new_area() {
        let mut buffer = PixelBuffer::new(2, 2, Color::BLACK).expect("buffer");
        buffer.resize(3, 1, Color::WHITE).expect("resize");
        assert_eq!(buffer.dimensions(), (3, 1));
        assert_eq!(buffer.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(buffer.pixel(1, 0), Some(Color::BLACK));
        assert_eq!(buffer.pixel(2, 0), Some(Color::WHITE));
    }

    #[test]
    fn fill_span_clips_to_row() {
        let mut buffer = PixelBuffer::new(4, 1, Color::WHITE).expect("buffer");
        buffer.fill_span(0, -3, 1, Color::BLACK);
        assert_eq!(buffer.pixel(1, 0), Some(Color::BLACK));
        assert_eq!(buffer.pixel(2, 0), Some(Color::WHITE));
        buffer.fill_span(3, 0, 3, Color::BLACK);
        assert_eq!(buffer.pixel(3, 0), Some(Color::WHITE));
    }

    #[test]
    fn dynamic_image_is_normalized_to_rgba8() {
        let rgb = image::RgbImage::from_pixel(2, 1, image::Rgb([9, 8, 7]));
        let buffer =
            PixelBuffer::from_dynamic_image(DynamicImage::ImageRgb8(rgb)).expect("normalize");
        assert_eq!(buffer.pixel(1, 0), Some(Color::rgba(9, 8, 7, 255)));
    }
}
