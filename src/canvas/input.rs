use crate::canvas::render::DirtyRect;
use crate::canvas::session::CanvasSession;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Maps pointer events from view coordinates onto the session's buffer.
///
/// The canvas is shown as a square whose side is the view width in portrait
/// and the view height in landscape, so a single uniform scale applies.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput {
    view_width: f32,
    view_height: f32,
    orientation: Orientation,
    last: Option<(f32, f32)>,
}

impl PointerInput {
    pub fn new(view_width: f32, view_height: f32, orientation: Orientation) -> Self {
        Self {
            view_width,
            view_height,
            orientation,
            last: None,
        }
    }

    pub fn resize_view(&mut self, view_width: f32, view_height: f32, orientation: Orientation) {
        self.view_width = view_width;
        self.view_height = view_height;
        self.orientation = orientation;
    }

    /// Buffer pixels per view unit, or `None` for an unusable view size.
    pub fn scale_for(&self, buffer_width: u32) -> Option<f32> {
        let extent = match self.orientation {
            Orientation::Portrait => self.view_width,
            Orientation::Landscape => self.view_height,
        };
        if !extent.is_finite() || extent <= 0.0 {
            return None;
        }
        Some(buffer_width as f32 / extent)
    }

    pub fn to_buffer(&self, buffer_width: u32, point: (f32, f32)) -> Option<(f32, f32)> {
        let scale = self.scale_for(buffer_width)?;
        Some((point.0 * scale, point.1 * scale))
    }

    pub fn last_point(&self) -> Option<(f32, f32)> {
        self.last
    }

    pub fn handle_down(
        &mut self,
        session: &mut CanvasSession,
        point: (f32, f32),
    ) -> Option<DirtyRect> {
        let mapped = self.to_buffer(session.buffer().width(), point)?;
        self.last = Some(mapped);
        session.pointer_down(mapped)
    }

    /// Continues the stroke from the previous point. A move without a
    /// preceding press starts from the current point.
    pub fn handle_move(
        &mut self,
        session: &mut CanvasSession,
        point: (f32, f32),
    ) -> Option<DirtyRect> {
        let mapped = self.to_buffer(session.buffer().width(), point)?;
        let last = self.last.replace(mapped).unwrap_or(mapped);
        session.pointer_move(last, mapped)
    }

    pub fn handle_up(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::model::Color;
    use crate::canvas::settings::CanvasSettings;

    fn session() -> CanvasSession {
        CanvasSession::new(&CanvasSettings::default()).expect("session")
    }

    #[test]
    fn portrait_scale_uses_view_width() {
        let input = PointerInput::new(400.0, 900.0, Orientation::Portrait);
        assert_eq!(input.scale_for(800), Some(2.0));
        assert_eq!(input.to_buffer(800, (10.0, 20.0)), Some((20.0, 40.0)));
    }

    #[test]
    fn landscape_scale_uses_view_height() {
        let input = PointerInput::new(1600.0, 1600.0 / 4.0, Orientation::Landscape);
        assert_eq!(input.scale_for(800), Some(2.0));
    }

    #[test]
    fn zero_sized_view_ignores_input() {
        let mut session = session();
        let mut input = PointerInput::new(0.0, 0.0, Orientation::Portrait);
        assert!(input.handle_down(&mut session, (5.0, 5.0)).is_none());
        assert!(!session.is_modified());
    }

    #[test]
    fn press_and_drag_draw_a_scaled_stroke() {
        let mut session = session();
        let mut input = PointerInput::new(400.0, 400.0, Orientation::Portrait);
        input.handle_down(&mut session, (10.0, 50.0));
        input.handle_move(&mut session, (60.0, 50.0));
        input.handle_up();

        assert_eq!(input.last_point(), None);
        // View (10..60, 50) lands on buffer (20..120, 100).
        assert_eq!(session.buffer().pixel(70, 100), Some(Color::BLACK));
        assert_eq!(session.buffer().pixel(70, 110), Some(Color::WHITE));
        assert!(session.is_modified());
    }
}
