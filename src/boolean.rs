//! Boolean operator invocation: pick an operation, hand it two meshes,
//! get one mesh back.

use crate::errors::{BooleanError, ValidationError};
use crate::mesh::Mesh;
use crate::traits::CSG;
use serde::Deserialize;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use tracing::{debug, warn};

/// Boolean operation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    /// A ∪ B
    Union,
    /// A ∩ B
    Intersection,
    /// A − B
    Difference,
    /// B − A
    Difference2,
}

impl BooleanOp {
    pub const ALL: [BooleanOp; 4] = [
        BooleanOp::Union,
        BooleanOp::Intersection,
        BooleanOp::Difference,
        BooleanOp::Difference2,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BooleanOp::Union => "Union",
            BooleanOp::Intersection => "Intersection",
            BooleanOp::Difference => "Difference",
            BooleanOp::Difference2 => "Difference2",
        }
    }
}

impl Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown boolean operation `{0}` (expected union, intersection, difference or difference2)")]
pub struct ParseBooleanOpError(pub String);

impl FromStr for BooleanOp {
    type Err = ParseBooleanOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BooleanOp::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseBooleanOpError(s.to_string()))
    }
}

/// Runs one boolean operation on a pair of meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanFilter {
    pub operation: BooleanOp,
}

impl BooleanFilter {
    pub const fn new(operation: BooleanOp) -> Self {
        Self { operation }
    }

    /// Combine `a` and `b`; the result carries `a`'s metadata
    /// (`b`'s for [`BooleanOp::Difference2`]).
    pub fn execute<S: Clone + Debug + Send + Sync>(
        &self,
        a: &Mesh<S>,
        b: &Mesh<S>,
    ) -> Result<Mesh<S>, BooleanError> {
        for (index, input) in [a, b].into_iter().enumerate() {
            if input.is_empty() {
                return Err(BooleanError::EmptyInput { index });
            }
            match input.validate() {
                Ok(()) => {},
                Err(ValidationError::OpenSurface { boundary_edges }) => warn!(
                    index,
                    boundary_edges, "boolean input is not a closed manifold; result may have holes"
                ),
                Err(ValidationError::DegeneratePolygon(at)) => {
                    warn!(index, %at, "boolean input has zero-area polygons")
                },
                Err(source) => return Err(BooleanError::InvalidInput { index, source }),
            }
        }

        let result = match self.operation {
            BooleanOp::Union => a.union(b),
            BooleanOp::Intersection => a.intersection(b),
            BooleanOp::Difference => a.difference(b),
            BooleanOp::Difference2 => b.difference(a),
        };

        debug!(
            operation = %self.operation,
            a = a.polygons.len(),
            b = b.polygons.len(),
            result = result.polygons.len(),
            "boolean"
        );

        if result.is_empty() {
            return Err(BooleanError::EmptyResult {
                operation: self.operation.to_string(),
            });
        }
        Ok(result)
    }
}
