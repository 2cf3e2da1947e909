use crate::canvas::buffer::PixelBuffer;
use crate::canvas::error::CanvasError;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const INDEX_FILE_NAME: &str = "index.json";
const DRAWING_EXTENSION: &str = "png";

/// Named pixel persistence. Saving an existing name overwrites it in place;
/// `list_names` reports names in first-save order without duplicates.
pub trait DrawingStore {
    fn save(&mut self, name: &str, pixels: &PixelBuffer) -> Result<()>;
    /// Fails with [`CanvasError::NotFound`] when nothing is stored under `name`.
    fn load(&self, name: &str) -> Result<PixelBuffer>;
    fn list_names(&self) -> Vec<String>;
}

impl<S: DrawingStore + ?Sized> DrawingStore for Box<S> {
    fn save(&mut self, name: &str, pixels: &PixelBuffer) -> Result<()> {
        (**self).save(name, pixels)
    }

    fn load(&self, name: &str) -> Result<PixelBuffer> {
        (**self).load(name)
    }

    fn list_names(&self) -> Vec<String> {
        (**self).list_names()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    drawings: Vec<(String, PixelBuffer)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawingStore for MemoryStore {
    fn save(&mut self, name: &str, pixels: &PixelBuffer) -> Result<()> {
        validate_name(name)?;
        match self.drawings.iter_mut().find(|(n, _)| n == name) {
            Some((_, stored)) => *stored = pixels.clone(),
            None => self.drawings.push((name.to_string(), pixels.clone())),
        }
        Ok(())
    }

    fn load(&self, name: &str) -> Result<PixelBuffer> {
        self.drawings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, pixels)| pixels.clone())
            .ok_or_else(|| {
                CanvasError::NotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    fn list_names(&self) -> Vec<String> {
        self.drawings.iter().map(|(n, _)| n.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub saved_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct DrawingIndex {
    #[serde(default)]
    drawings: Vec<IndexEntry>,
}

/// Stores each drawing as `<root>/<name>.png` and keeps an ordered
/// `index.json` of saved names next to them.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    index: DrawingIndex,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create drawing folder {}", root.display()))?;
        let index = read_index(&root.join(INDEX_FILE_NAME))?;
        tracing::debug!(root = %root.display(), drawings = index.drawings.len(), "opened drawing store");
        Ok(Self { root, index })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.index.drawings
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(file_name_for(name)))
    }

    fn write_index(&self, index: &DrawingIndex) -> Result<()> {
        let path = self.root.join(INDEX_FILE_NAME);
        let json = serde_json::to_string_pretty(index).context("serialize drawing index")?;
        atomic_write(&path, json.as_bytes())
            .with_context(|| format!("write drawing index {}", path.display()))
    }
}

impl DrawingStore for DirectoryStore {
    fn save(&mut self, name: &str, pixels: &PixelBuffer) -> Result<()> {
        let path = self.path_for(name)?;
        let image = DynamicImage::ImageRgba8(pixels.to_rgba_image()?);
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageOutputFormat::Png)
            .with_context(|| format!("encode drawing {name}"))?;
        atomic_write(&path, png.get_ref())
            .with_context(|| format!("write drawing {}", path.display()))?;

        let mut index = self.index.clone();
        let saved_at = chrono::Local::now().to_rfc3339();
        match index.drawings.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.saved_at = saved_at,
            None => index.drawings.push(IndexEntry {
                name: name.to_string(),
                file: file_name_for(name),
                saved_at,
            }),
        }
        self.write_index(&index)?;
        self.index = index;
        tracing::info!(name, path = %path.display(), "saved drawing");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<PixelBuffer> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(CanvasError::NotFound {
                name: name.to_string(),
            }
            .into());
        }
        let decoded =
            image::open(&path).with_context(|| format!("decode drawing {}", path.display()))?;
        let pixels = PixelBuffer::from_dynamic_image(decoded)
            .with_context(|| format!("normalize drawing {}", path.display()))?;
        tracing::info!(name, path = %path.display(), "loaded drawing");
        Ok(pixels)
    }

    fn list_names(&self) -> Vec<String> {
        self.index.drawings.iter().map(|e| e.name.clone()).collect()
    }
}

/// Rejects names that are empty or could escape the store's folder.
pub fn validate_name(name: &str) -> Result<(), CanvasError> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if invalid {
        return Err(CanvasError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn file_name_for(name: &str) -> String {
    format!("{name}.{DRAWING_EXTENSION}")
}

/// Writes through a temporary file in the same folder so readers never see a
/// half-written file.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

fn read_index(path: &Path) -> Result<DrawingIndex> {
    if !path.exists() {
        return Ok(DrawingIndex::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read drawing index {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(DrawingIndex::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("deserialize drawing index {}", path.display()))
}
