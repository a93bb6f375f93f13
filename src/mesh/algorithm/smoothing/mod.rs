//! Mesh smoothing algorithms.

pub mod serial;
pub mod traits;

// Re-export core types
pub use serial::SerialSmoothingOps;
pub use traits::{SmoothingOps, SmoothingParams};
