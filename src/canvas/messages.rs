use crate::canvas::buffer::PixelBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// `revision` and `generation` identify the session state the pixels
    /// were captured from.
    Save {
        name: String,
        pixels: PixelBuffer,
        revision: u64,
        generation: u64,
    },
    Load {
        name: String,
    },
    ListNames,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreReply {
    Saved {
        name: String,
        revision: u64,
        generation: u64,
    },
    SaveFailed {
        name: String,
        error: String,
    },
    Loaded {
        name: String,
        pixels: PixelBuffer,
    },
    LoadFailed {
        name: String,
        error: String,
        not_found: bool,
    },
    Names(Vec<String>),
}
