use crate::canvas::settings::CanvasSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "canvas_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Missing or blank files yield defaults. Loaded values are sanitized.
pub fn load_from_path(path: &Path) -> Result<CanvasSettings> {
    if !path.exists() {
        return Ok(CanvasSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read canvas settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(CanvasSettings::default());
    }

    let mut loaded: CanvasSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize canvas settings file {}", path.display()))?;
    if loaded.sanitize() {
        tracing::warn!(path = %path.display(), "canvas settings contained out-of-range values");
    }
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &CanvasSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create canvas settings parent folder {}", parent.display()))?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize canvas settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write canvas settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::model::Color;

    #[test]
    fn settings_path_is_resolved_next_to_executable() {
        let exe = Path::new("/tmp/canvas/bin/raster_canvas");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(path, Path::new("/tmp/canvas/bin").join(SETTINGS_FILE_NAME));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let loaded = load_from_path(&dir.path().join(SETTINGS_FILE_NAME)).expect("load");
        assert_eq!(loaded, CanvasSettings::default());
    }

    #[test]
    fn blank_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "   ").expect("write");
        assert_eq!(load_from_path(&path).expect("load"), CanvasSettings::default());
    }

    #[test]
    fn save_creates_parent_and_roundtrips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let settings = CanvasSettings {
            canvas_width: 320,
            brush_color: Color::rgba(200, 10, 10, 255),
            brush_size: 12,
            ..CanvasSettings::default()
        };
        save_to_path(&path, &settings).expect("save");
        assert_eq!(load_from_path(&path).expect("load"), settings);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{not json").expect("write");
        let err = load_from_path(&path).expect_err("malformed");
        assert!(format!("{err:#}").contains(SETTINGS_FILE_NAME));
    }
}
