//! Mesh file formats

pub mod stl;

pub use stl::{StlFormat, read_stl, write_stl};

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors raised while reading or writing mesh files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The file exists but is not a readable STL.
    #[error("invalid file content: {message}")]
    InvalidContent { message: String },

    /// Writers refuse meshes without polygons.
    #[error("no data to write")]
    EmptyMesh,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
