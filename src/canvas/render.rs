use crate::canvas::buffer::PixelBuffer;
use crate::canvas::model::{BrushState, Color};
use crate::canvas::state::DrawingMode;

/// Pixel-aligned bounds of a draw, in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Bounds are kept inside this range so widths never saturate in `i32`.
const COORD_LIMIT: f32 = 1.0e9;

impl DirtyRect {
    pub fn from_points(a: (f32, f32), b: (f32, f32), pad: f32) -> Self {
        let bound = |v: f32| v.clamp(-COORD_LIMIT, COORD_LIMIT);
        let min_x = bound((a.0.min(b.0) - pad).floor()) as i32;
        let max_x = bound((a.0.max(b.0) + pad).ceil()) as i32;
        let min_y = bound((a.1.min(b.1) - pad).floor()) as i32;
        let max_y = bound((a.1.max(b.1) + pad).ceil()) as i32;
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).saturating_add(1).max(1),
            height: max_y.saturating_sub(min_y).saturating_add(1).max(1),
        }
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        DirtyRect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(1),
            height: (max_y - min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.x.saturating_add(self.width).clamp(0, max_w);
        let y1 = self.y.saturating_add(self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Draws one freehand segment with round caps. Returns the touched bounds,
/// or `None` when nothing was drawn (wrong mode, degenerate brush, off-canvas).
pub fn stroke_segment(
    buffer: &mut PixelBuffer,
    brush: &BrushState,
    mode: DrawingMode,
    start: (f32, f32),
    end: (f32, f32),
) -> Option<DirtyRect> {
    if mode != DrawingMode::Freehand {
        return None;
    }
    let width = brush.width_for(buffer.width());
    draw_capsule(buffer, start, end, width, brush.color)
}

/// Stamps the shape selected by `mode` centered on `center`.
pub fn stamp(
    buffer: &mut PixelBuffer,
    brush: &BrushState,
    mode: DrawingMode,
    center: (f32, f32),
) -> Option<DirtyRect> {
    let width = brush.width_for(buffer.width());
    match mode {
        DrawingMode::Freehand => None,
        DrawingMode::StampCircle => fill_circle(buffer, center, width / 2.0, brush.color),
        DrawingMode::StampSquare => fill_square(buffer, center, width, brush.color),
    }
}

/// Fills every pixel whose center lies within `width / 2` of the segment.
pub fn draw_capsule(
    buffer: &mut PixelBuffer,
    start: (f32, f32),
    end: (f32, f32),
    width: f32,
    color: Color,
) -> Option<DirtyRect> {
    if !valid_extent(width) || !finite_point(start) || !finite_point(end) {
        return None;
    }
    let radius = width / 2.0;
    let clip = DirtyRect::from_points(start, end, radius + 1.0)
        .clamp(buffer.width(), buffer.height())?;

    let radius_sq = radius * radius;
    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            let center = (x as f32 + 0.5, y as f32 + 0.5);
            if point_segment_distance_sq(center, start, end) <= radius_sq {
                buffer.set_pixel(x, y, color);
            }
        }
    }
    Some(clip)
}

pub fn fill_circle(
    buffer: &mut PixelBuffer,
    center: (f32, f32),
    radius: f32,
    color: Color,
) -> Option<DirtyRect> {
    if !valid_extent(radius) || !finite_point(center) {
        return None;
    }
    let clip =
        DirtyRect::from_points(center, center, radius + 1.0).clamp(buffer.width(), buffer.height())?;

    let radius_sq = radius * radius;
    for y in clip.y..(clip.y + clip.height) {
        let dy = y as f32 + 0.5 - center.1;
        let rem = radius_sq - dy * dy;
        if rem < 0.0 {
            continue;
        }
        let half = rem.sqrt();
        let x0 = (center.0 - half - 0.5).ceil() as i32;
        let x1 = (center.0 + half - 0.5).floor() as i32;
        buffer.fill_span(y, x0, x1, color);
    }
    Some(clip)
}

/// Fills the axis-aligned square `[c - side/2, c + side/2)` on both axes,
/// sampled at pixel centers.
pub fn fill_square(
    buffer: &mut PixelBuffer,
    center: (f32, f32),
    side: f32,
    color: Color,
) -> Option<DirtyRect> {
    if !valid_extent(side) || !finite_point(center) {
        return None;
    }
    let half = side / 2.0;
    let clip =
        DirtyRect::from_points(center, center, half + 1.0).clamp(buffer.width(), buffer.height())?;

    let x0 = (center.0 - half - 0.5).ceil() as i32;
    let x1 = (center.0 + half - 0.5).ceil() as i32 - 1;
    let y0 = (center.1 - half - 0.5).ceil() as i32;
    let y1 = (center.1 + half - 0.5).ceil() as i32 - 1;
    for y in y0.max(clip.y)..=y1.min(clip.y + clip.height - 1) {
        buffer.fill_span(y, x0, x1, color);
    }
    Some(clip)
}

fn valid_extent(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn finite_point(point: (f32, f32)) -> bool {
    point.0.is_finite() && point.1.is_finite()
}

// f64 so endpoints far off the buffer still project accurately onto it.
fn point_segment_distance_sq(point: (f32, f32), start: (f32, f32), end: (f32, f32)) -> f32 {
    let (px, py) = (f64::from(point.0), f64::from(point.1));
    let (x0, y0) = (f64::from(start.0), f64::from(start.1));
    let (x1, y1) = (f64::from(end.0), f64::from(end.1));
    let vx = x1 - x0;
    let vy = y1 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f64::from(f32::EPSILON) {
        return (wx * wx + wy * wy) as f32;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    (dx * dx + dy * dy) as f32
}
