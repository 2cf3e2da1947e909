use serde::{Deserialize, Serialize};

/// Fraction of the buffer width covered by a brush of size multiplier 1.
pub const BRUSH_WIDTH_FRACTION: f32 = 0.005;
pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }
}

/// Shape used for stroke ends and joints. Only round is rasterized today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapStyle {
    #[default]
    Round,
}

/// Current paint settings. The size is relative; the absolute stroke width
/// depends on the width of the buffer being painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushState {
    pub color: Color,
    size: u32,
    pub cap: CapStyle,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: MIN_BRUSH_SIZE,
            cap: CapStyle::Round,
        }
    }
}

impl BrushState {
    pub fn new(color: Color, size: u32) -> Self {
        let mut brush = Self {
            color,
            ..Self::default()
        };
        brush.set_size(size);
        brush
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    /// Absolute stroke width in pixels for a buffer of `buffer_width`.
    pub fn width_for(&self, buffer_width: u32) -> f32 {
        BRUSH_WIDTH_FRACTION * buffer_width as f32 * self.size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_brush_is_black_round_and_smallest() {
        let brush = BrushState::default();
        assert_eq!(brush.color, Color::BLACK);
        assert_eq!(brush.size(), 1);
        assert_eq!(brush.cap, CapStyle::Round);
    }

    #[test]
    fn width_scales_with_buffer_width_and_size() {
        let mut brush = BrushState::default();
        assert!((brush.width_for(800) - 4.0).abs() < f32::EPSILON);

        brush.set_size(10);
        assert!((brush.width_for(800) - 40.0).abs() < 1e-4);
        assert!((brush.width_for(400) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn size_is_clamped_to_supported_range() {
        let mut brush = BrushState::default();
        brush.set_size(0);
        assert_eq!(brush.size(), MIN_BRUSH_SIZE);
        brush.set_size(500);
        assert_eq!(brush.size(), MAX_BRUSH_SIZE);
    }

    #[test]
    fn color_array_conversion_preserves_channels() {
        let color = Color::rgba(1, 2, 3, 4);
        assert_eq!(Color::from_rgba_array(color.to_rgba_array()), color);
    }
}
