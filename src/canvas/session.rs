//! The single owner of a canvas: base pixels, brush, tool mode, pending
//! adjustments and the bookkeeping needed to decide whether work is unsaved.

use crate::canvas::adjust::{self, AdjustmentParams};
use crate::canvas::buffer::PixelBuffer;
use crate::canvas::error::CanvasError;
use crate::canvas::messages::{StoreReply, StoreRequest};
use crate::canvas::model::{BrushState, Color};
use crate::canvas::render::{self, DirtyRect};
use crate::canvas::settings::CanvasSettings;
use crate::canvas::state::{DrawingMode, DrawingModeMachine};
use crate::canvas::store::{validate_name, DrawingStore};
use anyhow::{anyhow, Result};
use image::DynamicImage;

#[derive(Debug, Clone)]
pub struct CanvasSession {
    base: PixelBuffer,
    blank: PixelBuffer,
    preview: PixelBuffer,
    preview_stale: bool,
    params: AdjustmentParams,
    brush: BrushState,
    modes: DrawingModeMachine,
    modified: bool,
    last_name: Option<String>,
    revision: u64,
    generation: u64,
}

impl CanvasSession {
    pub fn new(settings: &CanvasSettings) -> Result<Self, CanvasError> {
        let blank = PixelBuffer::new(
            settings.canvas_width,
            settings.canvas_height,
            settings.background,
        )?;
        Ok(Self {
            base: blank.clone(),
            preview: blank.clone(),
            blank,
            preview_stale: false,
            params: AdjustmentParams::default(),
            brush: BrushState::new(settings.brush_color, settings.brush_size),
            modes: DrawingModeMachine::default(),
            modified: false,
            last_name: None,
            revision: 0,
            generation: 0,
        })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.base
    }

    /// Owned copy of the base pixels, unaffected by later edits.
    pub fn snapshot(&self) -> PixelBuffer {
        self.base.clone()
    }

    /// The last computed preview. Drawing after the preview was computed
    /// leaves it stale until the next adjustment call.
    pub fn preview(&self) -> &PixelBuffer {
        &self.preview
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn adjustments(&self) -> &AdjustmentParams {
        &self.params
    }

    /// Incremented by every change to the base pixels.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn new_canvas(&mut self) {
        self.adopt(self.blank.clone());
        self.last_name = None;
        self.modified = false;
        tracing::info!(
            width = self.base.width(),
            height = self.base.height(),
            "started new canvas"
        );
    }

    pub fn save<S: DrawingStore + ?Sized>(&mut self, store: &mut S, name: &str) -> Result<()> {
        if let Err(err) = store.save(name, &self.base) {
            tracing::error!(name, ?err, "failed to save drawing");
            return Err(err);
        }
        self.last_name = Some(name.to_string());
        self.modified = false;
        Ok(())
    }

    pub fn load<S: DrawingStore + ?Sized>(&mut self, store: &S, name: &str) -> Result<()> {
        let pixels = match store.load(name) {
            Ok(pixels) => pixels,
            Err(err) => {
                tracing::warn!(name, ?err, "failed to load drawing");
                return Err(err);
            }
        };
        self.adopt(pixels);
        self.last_name = Some(name.to_string());
        self.modified = false;
        Ok(())
    }

    /// Adopts an imported picture as the base. The modified flag is left as is.
    pub fn replace_from_external_image(&mut self, image: DynamicImage) -> Result<(), CanvasError> {
        let pixels = PixelBuffer::from_dynamic_image(image)?;
        tracing::info!(
            width = pixels.width(),
            height = pixels.height(),
            "imported external image"
        );
        self.adopt(pixels);
        Ok(())
    }

    pub fn stroke_segment(&mut self, start: (f32, f32), end: (f32, f32)) -> Option<DirtyRect> {
        let dirty = render::stroke_segment(
            &mut self.base,
            &self.brush,
            self.modes.current(),
            start,
            end,
        );
        self.after_draw(dirty)
    }

    pub fn stamp(&mut self, center: (f32, f32)) -> Option<DirtyRect> {
        let dirty = render::stamp(&mut self.base, &self.brush, self.modes.current(), center);
        self.after_draw(dirty)
    }

    /// Press at `point`: a stamp in stamp modes, a dot in freehand.
    pub fn pointer_down(&mut self, point: (f32, f32)) -> Option<DirtyRect> {
        let stamped = self.stamp(point);
        let dotted = self.stroke_segment(point, point);
        merge_dirty(stamped, dotted)
    }

    pub fn pointer_move(&mut self, last: (f32, f32), point: (f32, f32)) -> Option<DirtyRect> {
        self.stroke_segment(last, point)
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.color = color;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_size(size);
    }

    pub fn brush_size(&self) -> u32 {
        self.brush.size()
    }

    /// Absolute brush width for the current base buffer.
    pub fn brush_width(&self) -> f32 {
        self.brush.width_for(self.base.width())
    }

    pub fn mode(&self) -> DrawingMode {
        self.modes.current()
    }

    pub fn cycle_mode(&mut self) -> DrawingMode {
        let mode = self.modes.cycle();
        tracing::debug!(?mode, "drawing mode changed");
        mode
    }

    pub fn open_adjustments(&mut self) {
        self.reset_preview();
    }

    pub fn set_brightness(&mut self, factor: f32) {
        self.params.set_brightness(factor);
        self.refresh_preview();
    }

    pub fn set_noise(&mut self, level: u8) {
        self.params.set_noise(level);
        self.refresh_preview();
    }

    pub fn toggle_invert(&mut self) -> bool {
        let inverted = self.params.toggle_invert();
        self.refresh_preview();
        inverted
    }

    /// Makes the previewed adjustments permanent and resets the parameters.
    pub fn confirm_adjustments(&mut self) {
        if self.params.is_identity() {
            self.reset_preview();
            return;
        }
        if self.preview_stale || self.preview.dimensions() != self.base.dimensions() {
            self.refresh_preview();
        }
        let committed = self.params;
        std::mem::swap(&mut self.base, &mut self.preview);
        self.revision += 1;
        self.modified = true;
        self.reset_preview();
        tracing::info!(
            brightness = committed.brightness(),
            noise = committed.noise(),
            inverted = committed.inverted(),
            "committed adjustments"
        );
    }

    /// Drops pending adjustments. The base is left byte-for-byte unchanged.
    pub fn discard_adjustments(&mut self) {
        self.reset_preview();
    }

    /// Captures the current pixels for a background save.
    pub fn begin_save(&self, name: &str) -> Result<StoreRequest, CanvasError> {
        validate_name(name)?;
        Ok(StoreRequest::Save {
            name: name.to_string(),
            pixels: self.snapshot(),
            revision: self.revision,
            generation: self.generation,
        })
    }

    /// Applies a completion from the store worker. A save only clears the
    /// modified flag when nothing was drawn after its pixels were captured,
    /// and is ignored entirely once the base has been replaced.
    pub fn apply_store_reply(&mut self, reply: StoreReply) -> Result<()> {
        match reply {
            StoreReply::Saved {
                name,
                revision,
                generation,
            } => {
                if generation != self.generation {
                    tracing::debug!(name = %name, "ignoring save completion for a replaced canvas");
                    return Ok(());
                }
                if revision == self.revision {
                    self.modified = false;
                }
                self.last_name = Some(name);
                Ok(())
            }
            StoreReply::Loaded { name, pixels } => {
                self.adopt(pixels);
                self.last_name = Some(name);
                self.modified = false;
                Ok(())
            }
            StoreReply::SaveFailed { name, error } => {
                Err(anyhow!("save drawing '{name}' failed: {error}"))
            }
            StoreReply::LoadFailed {
                name,
                error,
                not_found,
            } => {
                if not_found {
                    Err(CanvasError::NotFound { name }.into())
                } else {
                    Err(anyhow!("load drawing '{name}' failed: {error}"))
                }
            }
            StoreReply::Names(_) => Ok(()),
        }
    }

    fn adopt(&mut self, pixels: PixelBuffer) {
        self.base = pixels;
        self.revision += 1;
        self.generation += 1;
        self.reset_preview();
    }

    fn after_draw(&mut self, dirty: Option<DirtyRect>) -> Option<DirtyRect> {
        if dirty.is_some() {
            self.modified = true;
            self.preview_stale = true;
            self.revision += 1;
        }
        dirty
    }

    fn reset_preview(&mut self) {
        self.params.reset();
        self.preview = self.base.clone();
        self.preview_stale = false;
    }

    fn refresh_preview(&mut self) {
        self.preview = adjust::compute_preview(&self.base, &self.params);
        self.preview_stale = false;
    }
}

fn merge_dirty(a: Option<DirtyRect>, b: Option<DirtyRect>) -> Option<DirtyRect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
