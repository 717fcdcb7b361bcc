//! Error type for figure rendering.

use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised while building or rasterizing a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Coordinate and value arrays do not describe the same mesh.
    #[error("mesh shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The requested colormap name is not known.
    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    /// The axes projection is not supported by this build.
    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    /// No axes with the given key exists in the figure.
    #[error("axes not found: {0}")]
    AxesNotFound(String),

    /// Font loading failed.
    #[error("font error: {0}")]
    Font(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Writing the image failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }
}
