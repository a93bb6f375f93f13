//! Surface filters applied to meshes before boolean operations

pub mod clean;
pub mod normals;
pub mod smoothing;

pub use clean::{CleanParams, CleanReport};
pub use normals::NormalsParams;
pub use smoothing::{SerialSmoothingOps, SmoothingOps, SmoothingParams};
