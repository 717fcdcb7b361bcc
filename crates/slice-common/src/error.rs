//! Error types for slice plotting.

use thiserror::Error;

/// Result type alias using SliceError.
pub type Result<T> = std::result::Result<T, SliceError>;

/// Primary error type for slice plotting operations.
#[derive(Debug, Error)]
pub enum SliceError {
    // === Configuration Errors ===
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing rendering capability: {0}")]
    MissingCapability(String),

    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("grid cell not found: {0}")]
    GridCellNotFound(String),

    // === Data Errors ===
    #[error("task not found in datasets: {0}")]
    MissingTask(String),

    #[error("basis '{basis}' not found in dataset '{dataset}'")]
    MissingBasis { dataset: String, basis: String },

    #[error("component {index} out of range for dataset '{dataset}' with {components} components")]
    MissingComponent {
        dataset: String,
        index: usize,
        components: usize,
    },

    #[error("write index {index} out of range for dataset '{dataset}' holding {writes} writes")]
    WriteOutOfRange {
        dataset: String,
        index: usize,
        writes: usize,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("cannot compute color limits of an empty field")]
    EmptyField,

    // === Output Errors ===
    #[error("rendering failed: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(String),
}

impl SliceError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create a MissingBasis error.
    pub fn missing_basis(dataset: impl Into<String>, basis: impl Into<String>) -> Self {
        Self::MissingBasis {
            dataset: dataset.into(),
            basis: basis.into(),
        }
    }

    /// Create a Render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

impl From<std::io::Error> for SliceError {
    fn from(err: std::io::Error) -> Self {
        SliceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SliceError {
    fn from(err: serde_json::Error) -> Self {
        SliceError::Config(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_basis_message() {
        let err = SliceError::missing_basis("T", "theta");
        assert_eq!(err.to_string(), "basis 'theta' not found in dataset 'T'");
    }
}
