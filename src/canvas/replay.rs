use crate::canvas::input::{Orientation, PointerInput};
use crate::canvas::model::Color;
use crate::canvas::session::CanvasSession;
use crate::canvas::store::DrawingStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded user action. Coordinates are buffer pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayCommand {
    NewCanvas,
    CycleMode,
    SetBrushColor { color: Color },
    SetBrushSize { size: u32 },
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    Stroke { from: [f32; 2], to: [f32; 2] },
    Stamp { at: [f32; 2] },
    OpenAdjustments,
    SetBrightness { factor: f32 },
    SetNoise { level: u8 },
    ToggleInvert,
    ConfirmAdjustments,
    DiscardAdjustments,
    Save { name: String },
    Load { name: String },
    Import { path: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub commands: Vec<ReplayCommand>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read replay script {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize replay script {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub commands: usize,
    pub draws: usize,
}

/// Applies `script` to `session` in order, stopping at the first failure.
/// Relative import paths resolve against `base_dir`.
pub fn run<S: DrawingStore + ?Sized>(
    session: &mut CanvasSession,
    store: &mut S,
    script: &ReplayScript,
    base_dir: &Path,
) -> Result<ReplaySummary> {
    let mut pointer = PointerInput::new(1.0, 1.0, Orientation::Portrait);
    let mut summary = ReplaySummary::default();

    for (index, command) in script.commands.iter().enumerate() {
        let view = session.buffer().width() as f32;
        pointer.resize_view(view, view, Orientation::Portrait);

        let drew = match command {
            ReplayCommand::NewCanvas => {
                session.new_canvas();
                false
            }
            ReplayCommand::CycleMode => {
                session.cycle_mode();
                false
            }
            ReplayCommand::SetBrushColor { color } => {
                session.set_brush_color(*color);
                false
            }
            ReplayCommand::SetBrushSize { size } => {
                session.set_brush_size(*size);
                false
            }
            ReplayCommand::PointerDown { x, y } => {
                pointer.handle_down(session, (*x, *y)).is_some()
            }
            ReplayCommand::PointerMove { x, y } => {
                pointer.handle_move(session, (*x, *y)).is_some()
            }
            ReplayCommand::PointerUp => {
                pointer.handle_up();
                false
            }
            ReplayCommand::Stroke { from, to } => session
                .stroke_segment((from[0], from[1]), (to[0], to[1]))
                .is_some(),
            ReplayCommand::Stamp { at } => session.stamp((at[0], at[1])).is_some(),
            ReplayCommand::OpenAdjustments => {
                session.open_adjustments();
                false
            }
            ReplayCommand::SetBrightness { factor } => {
                session.set_brightness(*factor);
                false
            }
            ReplayCommand::SetNoise { level } => {
                session.set_noise(*level);
                false
            }
            ReplayCommand::ToggleInvert => {
                session.toggle_invert();
                false
            }
            ReplayCommand::ConfirmAdjustments => {
                session.confirm_adjustments();
                false
            }
            ReplayCommand::DiscardAdjustments => {
                session.discard_adjustments();
                false
            }
            ReplayCommand::Save { name } => {
                session
                    .save(&mut *store, name)
                    .with_context(|| format!("replay command #{index}: save '{name}'"))?;
                false
            }
            ReplayCommand::Load { name } => {
                session
                    .load(&*store, name)
                    .with_context(|| format!("replay command #{index}: load '{name}'"))?;
                false
            }
            ReplayCommand::Import { path } => {
                let path = base_dir.join(path);
                let image = image::open(&path)
                    .with_context(|| format!("replay command #{index}: import {}", path.display()))?;
                session.replace_from_external_image(image)?;
                false
            }
        };

        summary.commands += 1;
        if drew {
            summary.draws += 1;
        }
    }

    tracing::info!(
        commands = summary.commands,
        draws = summary.draws,
        "replay finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::settings::CanvasSettings;
    use crate::canvas::state::DrawingMode;
    use crate::canvas::store::MemoryStore;

    #[test]
    fn script_json_uses_tagged_ops() {
        let json = r#"{"commands": [
            {"op": "cycle_mode"},
            {"op": "set_brush_color", "color": {"r": 255, "g": 0, "b": 0, "a": 255}},
            {"op": "stamp", "at": [10.0, 10.0]},
            {"op": "save", "name": "red dot"}
        ]}"#;
        let script: ReplayScript = serde_json::from_str(json).expect("parse");
        assert_eq!(script.commands.len(), 4);
        assert_eq!(
            script.commands[2],
            ReplayCommand::Stamp { at: [10.0, 10.0] }
        );
    }

    #[test]
    fn replay_draws_and_saves() {
        let mut session = CanvasSession::new(&CanvasSettings::default()).expect("session");
        let mut store = MemoryStore::new();
        let script = ReplayScript {
            commands: vec![
                ReplayCommand::SetBrushSize { size: 5 },
                ReplayCommand::PointerDown { x: 100.0, y: 100.0 },
                ReplayCommand::PointerMove { x: 200.0, y: 100.0 },
                ReplayCommand::PointerUp,
                ReplayCommand::CycleMode,
                ReplayCommand::Stamp { at: [400.0, 400.0] },
                ReplayCommand::Save {
                    name: "replayed".into(),
                },
            ],
        };

        let summary = run(&mut session, &mut store, &script, Path::new(".")).expect("replay");
        assert_eq!(summary.commands, 7);
        assert_eq!(summary.draws, 3);
        assert_eq!(session.mode(), DrawingMode::StampCircle);
        assert_eq!(session.buffer().pixel(150, 100), Some(Color::BLACK));
        assert_eq!(session.buffer().pixel(400, 400), Some(Color::BLACK));
        assert_eq!(store.list_names(), vec!["replayed"]);
        assert!(!session.is_modified());
    }

    #[test]
    fn failing_load_names_the_command() {
        let mut session = CanvasSession::new(&CanvasSettings::default()).expect("session");
        let mut store = MemoryStore::new();
        let script = ReplayScript {
            commands: vec![ReplayCommand::Load {
                name: "absent".into(),
            }],
        };
        let err = run(&mut session, &mut store, &script, Path::new(".")).expect_err("missing");
        assert!(format!("{err:#}").contains("replay command #0"));
    }
}
