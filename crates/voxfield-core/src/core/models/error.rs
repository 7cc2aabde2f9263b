use thiserror::Error;

/// A cell index `(i, j, k)` or a grid shape `(nx, ny, nz)`.
pub type Index3 = (usize, usize, usize);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Cell index {index:?} is out of bounds for model dimensions {dimensions:?}")]
    OutOfBounds { index: Index3, dimensions: Index3 },

    #[error("Invalid observation grid: {0}")]
    InvalidGrid(String),

    #[error("Model dimensions must all be greater than zero and addressable, got {0:?}")]
    InvalidDimensions(Index3),

    #[error("Cell size must be positive and finite along every axis, got {0:?}")]
    InvalidCellSize((f64, f64, f64)),

    #[error("Model origin must be finite, got {0:?}")]
    InvalidOrigin((f64, f64, f64)),

    #[error("Invalid value for property '{property}': {value}")]
    InvalidProperty { property: &'static str, value: String },

    #[error("Models do not share the same grid geometry")]
    GeometryMismatch,

    #[error("Cell {index:?} is active in both models")]
    Overlap { index: Index3 },

    #[error("Unknown lithology index {0}")]
    UnknownLithology(usize),

    #[error("Lithology index volume has {actual} entries but the model has {expected} cells")]
    IndexVolumeMismatch { expected: usize, actual: usize },
}
