//! Boolean operations (*union*, *difference*, *intersection*) on STL triangle
//! meshes, computed with [BSP](mesh::bsp) trees, plus the test driver that
//! reads two meshes, optionally cleans them up, combines them and writes the
//! result back to STL.
//!
//! ```no_run
//! use stlbool::{BooleanFilter, BooleanOp, StlFormat, io};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a = io::read_stl("Data0-Union.stl")?;
//! let b = io::read_stl("Data1-Union.stl")?;
//! let result = BooleanFilter::new(BooleanOp::Union).execute(&a, &b)?;
//! io::write_stl(&result, "Data0-Union-Data1.stl", StlFormat::Ascii)?;
//! # Ok(())
//! # }
//! ```
//!
//! The weld tolerance used to compare vertex positions defaults to `1e-6`;
//! set `STLBOOL_TOLERANCE` at build time or call
//! [`float_types::set_tolerance`] before the first mesh operation.

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::all)]

pub mod boolean;
pub mod driver;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod mesh;
pub mod pipeline;
pub mod plan;
pub mod traits;
pub mod triangulated;

pub use boolean::{BooleanFilter, BooleanOp};
pub use errors::{BooleanError, ValidationError};
pub use io::{IoError, StlFormat};
pub use mesh::Mesh;
pub use pipeline::{PreprocessParams, preprocess};
pub use plan::{CaseSelection, TestCase, TestPlan};
pub use traits::CSG;
