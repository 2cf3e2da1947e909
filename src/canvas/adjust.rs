//! Global image adjustments previewed on a copy of the base buffer.
//!
//! A preview is built from a fresh clone of the base by running an ordered
//! list of optional passes: noise, then brightness, then inversion. The base
//! is never touched; making a preview permanent is the session's job.

use crate::canvas::buffer::{PixelBuffer, CHANNELS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub const DEFAULT_BRIGHTNESS: f32 = 1.0;
pub const MAX_BRIGHTNESS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentParams {
    brightness: f32,
    noise: u8,
    inverted: bool,
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            noise: 0,
            inverted: false,
        }
    }
}

impl AdjustmentParams {
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn noise(&self) -> u8 {
        self.noise
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Sets the brightness factor, clamped to `[0, 2]`. NaN resets to 1.
    pub fn set_brightness(&mut self, factor: f32) {
        self.brightness = if factor.is_nan() {
            DEFAULT_BRIGHTNESS
        } else {
            factor.clamp(0.0, MAX_BRIGHTNESS)
        };
    }

    pub fn set_noise(&mut self, level: u8) {
        self.noise = level;
    }

    pub fn toggle_invert(&mut self) -> bool {
        self.inverted = !self.inverted;
        self.inverted
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_identity(&self) -> bool {
        self.passes(0).is_empty()
    }

    /// The passes these parameters enable, in application order.
    pub fn passes(&self, seed: u64) -> Vec<AdjustmentPass> {
        let mut passes = Vec::with_capacity(3);
        if self.noise > 0 {
            passes.push(AdjustmentPass::Noise {
                level: self.noise,
                seed,
            });
        }
        if self.brightness != DEFAULT_BRIGHTNESS {
            passes.push(AdjustmentPass::Brightness(self.brightness));
        }
        if self.inverted {
            passes.push(AdjustmentPass::Invert);
        }
        passes
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentPass {
    Noise { level: u8, seed: u64 },
    Brightness(f32),
    Invert,
}

impl AdjustmentPass {
    pub fn apply(self, buffer: &mut PixelBuffer) {
        match self {
            AdjustmentPass::Noise { level, seed } => add_noise(buffer, level, seed),
            AdjustmentPass::Brightness(factor) => scale_brightness(buffer, factor),
            AdjustmentPass::Invert => invert_colors(buffer),
        }
    }
}

/// Builds a preview with a freshly drawn noise seed.
pub fn compute_preview(base: &PixelBuffer, params: &AdjustmentParams) -> PixelBuffer {
    compute_preview_seeded(base, params, rand::random())
}

/// Builds a preview; identical inputs and `seed` give identical output.
pub fn compute_preview_seeded(
    base: &PixelBuffer,
    params: &AdjustmentParams,
    seed: u64,
) -> PixelBuffer {
    let mut preview = base.clone();
    for pass in params.passes(seed) {
        pass.apply(&mut preview);
    }
    tracing::debug!(
        brightness = params.brightness,
        noise = params.noise,
        inverted = params.inverted,
        "computed adjustment preview"
    );
    preview
}

/// Adds an independent uniform offset in `[-level, level]` to each of R, G, B.
/// Every row draws from its own generator derived from `seed`.
pub fn add_noise(buffer: &mut PixelBuffer, level: u8, seed: u64) {
    if level == 0 {
        return;
    }
    let level = level as i32;
    let stride = buffer.stride();
    buffer
        .raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, y));
            for px in row.chunks_exact_mut(CHANNELS) {
                for channel in &mut px[..3] {
                    let offset = rng.gen_range(-level..=level);
                    *channel = (*channel as i32 + offset).clamp(0, 255) as u8;
                }
            }
        });
}

/// Multiplies R, G, B by `factor`, truncating and clamping to `[0, 255]`.
pub fn scale_brightness(buffer: &mut PixelBuffer, factor: f32) {
    map_rgb(buffer, move |v| ((v as f32 * factor) as i32).clamp(0, 255) as u8);
}

/// Replaces R, G, B with `255 - v`. Applying it twice is the identity.
pub fn invert_colors(buffer: &mut PixelBuffer) {
    map_rgb(buffer, |v| 255 - v);
}

fn map_rgb<F>(buffer: &mut PixelBuffer, transform: F)
where
    F: Fn(u8) -> u8 + Sync,
{
    let stride = buffer.stride();
    buffer
        .raw_mut()
        .par_chunks_mut(stride)
        .for_each(|row| {
            for px in row.chunks_exact_mut(CHANNELS) {
                px[0] = transform(px[0]);
                px[1] = transform(px[1]);
                px[2] = transform(px[2]);
            }
        });
}

fn row_seed(seed: u64, row: usize) -> u64 {
    seed ^ (row as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
