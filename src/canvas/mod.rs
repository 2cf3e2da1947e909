pub mod adjust;
pub mod buffer;
pub mod error;
pub mod input;
pub mod messages;
pub mod model;
pub mod render;
pub mod replay;
pub mod service;
pub mod session;
pub mod settings;
pub mod settings_store;
pub mod state;
pub mod store;

pub use buffer::PixelBuffer;
pub use error::CanvasError;
pub use model::{BrushState, Color};
pub use session::CanvasSession;
pub use state::DrawingMode;
pub use store::{DirectoryStore, DrawingStore, MemoryStore};
