#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    InvalidDimensions {
        width: u32,
        height: u32,
    },
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Raw pixel data whose length does not match `width * height * 4`.
    PixelLength {
        expected: usize,
        actual: usize,
    },
    NotFound {
        name: String,
    },
    InvalidName {
        name: String,
    },
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasError::InvalidDimensions { width, height } => {
                write!(f, "invalid canvas dimensions {width}x{height}")
            }
            CanvasError::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            CanvasError::PixelLength { expected, actual } => {
                write!(f, "pixel data has {actual} bytes, expected {expected}")
            }
            CanvasError::NotFound { name } => write!(f, "drawing '{name}' not found"),
            CanvasError::InvalidName { name } => write!(f, "invalid drawing name '{name}'"),
        }
    }
}

impl std::error::Error for CanvasError {}

/// True when `err` wraps [`CanvasError::NotFound`].
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<CanvasError>(),
        Some(CanvasError::NotFound { .. })
    )
}
