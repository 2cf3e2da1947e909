use crate::canvas::model::{Color, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 800;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSettings {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default = "default_brush_color")]
    pub brush_color: Color,
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,
    #[serde(default = "default_store_dir")]
    pub store_dir: String,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            background: default_background(),
            brush_color: default_brush_color(),
            brush_size: default_brush_size(),
            store_dir: default_store_dir(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl CanvasSettings {
    /// Pulls hand-edited values back into range. Returns whether anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        if self.canvas_width == 0 {
            self.canvas_width = default_canvas_width();
            changed = true;
        }
        if self.canvas_height == 0 {
            self.canvas_height = default_canvas_height();
            changed = true;
        }

        let size = self.brush_size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        changed |= size != self.brush_size;
        self.brush_size = size;

        if self.store_dir.trim().is_empty() {
            self.store_dir = default_store_dir();
            changed = true;
        }

        changed
    }
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_brush_color() -> Color {
    Color::BLACK
}

fn default_brush_size() -> u32 {
    MIN_BRUSH_SIZE
}

fn default_store_dir() -> String {
    "drawings".to_owned()
}
