//! Validation and boolean-operation errors

use crate::float_types::Real;
use nalgebra::Point3;

/// Problems found while checking a mesh before it is handed to the boolean engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (TooFewPoints) A polygon has fewer than three vertices
    #[error("(TooFewPoints) A polygon has fewer than 3 vertices at: {0}")]
    TooFewPoints(Point3<Real>),
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (DegeneratePolygon) A polygon has (almost) zero area
    #[error("(DegeneratePolygon) A polygon has zero area at: {0}")]
    DegeneratePolygon(Point3<Real>),
    /// (OpenSurface) Some edges are not shared by exactly two triangles
    #[error("(OpenSurface) {boundary_edges} edges are not shared by exactly two triangles")]
    OpenSurface { boundary_edges: usize },
    /// In general, anything else
    #[error("{0}")]
    Other(String),
}

/// Failures reported by [`crate::boolean::BooleanFilter`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BooleanError {
    /// One operand has no polygons
    #[error("input {index} of the boolean filter is empty")]
    EmptyInput { index: usize },
    /// The operation left nothing behind
    #[error("{operation} produced an empty mesh")]
    EmptyResult { operation: String },
    /// An operand failed validation
    #[error("input {index} is invalid")]
    InvalidInput {
        index: usize,
        #[source]
        source: ValidationError,
    },
}
