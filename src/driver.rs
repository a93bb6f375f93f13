//! Runs test cases: read both operands, optionally preprocess them,
//! apply the boolean operation and save the result.
//!
//! Progress goes to stdout in a fixed format (`<a> <Op> <b>`, then
//! `SavePolyData <path> Succeed!` or `Failed!`); everything else is logged.

use crate::boolean::BooleanFilter;
use crate::errors::BooleanError;
use crate::io::{IoError, StlFormat};
use crate::mesh::Mesh;
use crate::pipeline::{PreprocessParams, preprocess};
use crate::plan::{CaseSelection, PlanError, TestCase, TestPlan};
use crate::traits::CSG;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("case `{case}` failed")]
    Boolean {
        case: String,
        #[source]
        source: BooleanError,
    },
    #[error("could not save {path}")]
    Save { path: PathBuf },
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Load one operand.
pub fn read_stl_data(path: impl AsRef<Path>) -> Result<Mesh<()>, DriverError> {
    let path = path.as_ref();
    crate::io::read_stl(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `mesh` and report the outcome on stdout. Returns `true` on success.
pub fn save_poly_data<S: Clone + Debug + Send + Sync>(
    path: impl AsRef<Path>,
    mesh: &Mesh<S>,
    format: StlFormat,
) -> bool {
    let path = path.as_ref();
    match crate::io::write_stl(mesh, path, format) {
        Ok(()) => {
            println!("SavePolyData {} Succeed!", path.display());
            true
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "write failed");
            println!("SavePolyData {} Failed!", path.display());
            false
        },
    }
}

pub fn preprocess_data<S: Clone + Debug + Send + Sync>(
    mesh: &Mesh<S>,
    params: &PreprocessParams,
) -> Mesh<S> {
    preprocess(mesh, params)
}

/// Where files live and how results are written.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Relative case paths are resolved against this directory
    pub data_dir: Option<PathBuf>,
    pub format: StlFormat,
    pub preprocess: PreprocessParams,
}

impl RunContext {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_format(mut self, format: StlFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessParams) -> Self {
        self.preprocess = preprocess;
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Summary of a finished case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: String,
    pub input_triangles: [usize; 2],
    pub output_triangles: usize,
    pub manifold: bool,
    pub output: PathBuf,
}

/// Run one case. The `SavePolyData` line is printed even when reading or
/// the boolean operation fails, since nothing can be written then.
pub fn run_case(case: &TestCase, ctx: &RunContext) -> Result<CaseOutcome, DriverError> {
    let [a_path, b_path] = &case.inputs;
    println!("{} {} {}", a_path.display(), case.operation, b_path.display());

    let output = ctx.resolve(&case.output);
    let combined = match combine(case, ctx) {
        Ok(combined) => combined,
        Err(e) => {
            save_poly_data(&output, &Mesh::<()>::new(), ctx.format);
            return Err(e);
        },
    };

    if !save_poly_data(&output, &combined.result, ctx.format) {
        return Err(DriverError::Save { path: output });
    }

    Ok(CaseOutcome {
        name: case.name.clone(),
        input_triangles: combined.input_triangles,
        output_triangles: combined.result.triangle_count(),
        manifold: combined.result.is_manifold(),
        output,
    })
}

struct Combined {
    input_triangles: [usize; 2],
    result: Mesh<()>,
}

fn combine(case: &TestCase, ctx: &RunContext) -> Result<Combined, DriverError> {
    let mut a = read_stl_data(ctx.resolve(&case.inputs[0]))?;
    let mut b = read_stl_data(ctx.resolve(&case.inputs[1]))?;

    if case.preprocess {
        a = preprocess_data(&a, &ctx.preprocess);
        b = preprocess_data(&b, &ctx.preprocess);
    }

    let input_triangles = [a.triangle_count(), b.triangle_count()];
    let result = BooleanFilter::new(case.operation)
        .execute(&a, &b)
        .map_err(|source| DriverError::Boolean {
            case: case.name.clone(),
            source,
        })?;

    Ok(Combined {
        input_triangles,
        result,
    })
}

/// Per-case results of a plan run, in execution order.
#[derive(Debug, Default)]
pub struct PlanReport {
    pub results: Vec<(usize, Result<CaseOutcome, DriverError>)>,
}

impl PlanReport {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures() == 0
    }
}

/// Run the selected cases; a failing case does not stop the others.
pub fn run_plan(
    plan: &TestPlan,
    selection: &CaseSelection,
    ctx: &RunContext,
) -> Result<PlanReport, DriverError> {
    let selected = plan.select(selection)?;

    for case in plan.cases.iter().filter(|c| !c.enabled) {
        if !selected.iter().any(|(_, s)| std::ptr::eq(*s, case)) {
            info!(
                case = %case.name,
                note = case.note.as_deref().unwrap_or(""),
                "skipping disabled case"
            );
        }
    }

    let mut report = PlanReport::default();
    for (number, case) in selected {
        let result = run_case(case, ctx);
        match &result {
            Ok(outcome) => info!(
                number,
                case = %outcome.name,
                a = outcome.input_triangles[0],
                b = outcome.input_triangles[1],
                result = outcome.output_triangles,
                manifold = outcome.manifold,
                "case finished"
            ),
            Err(e) => error!(number, case = %case.name, error = %DisplayChain(e), "case failed"),
        }
        report.results.push((number, result));
    }
    Ok(report)
}

/// Stand-in operands written under the stock file names: a cube, a sphere
/// over one of its corners, a bar through the cube and a small sphere
/// buried inside it.
pub fn sample_inputs() -> Vec<(&'static str, Mesh<()>)> {
    vec![
        ("Data0-Union.stl", Mesh::cube(10.0, None)),
        (
            "Data1-Union.stl",
            Mesh::sphere(6.0, 32, 16, None).translate(10.0, 10.0, 10.0),
        ),
        (
            "Data3-Crash.stl",
            Mesh::cuboid(20.0, 4.0, 4.0, None).translate(-5.0, 3.0, 3.0),
        ),
        (
            "Data4-Crash.stl",
            Mesh::sphere(3.0, 24, 12, None).translate(5.0, 5.0, 5.0),
        ),
    ]
}

/// Write [`sample_inputs`] into `dir`, creating it if needed.
pub fn generate_samples(dir: impl AsRef<Path>, format: StlFormat) -> Result<Vec<PathBuf>, IoError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    sample_inputs()
        .into_iter()
        .map(|(name, mesh)| {
            let path = dir.join(name);
            crate::io::write_stl(&mesh, &path, format)?;
            info!(path = %path.display(), triangles = mesh.triangle_count(), "sample written");
            Ok(path)
        })
        .collect()
}

/// Formats an error with its whole `source()` chain.
pub struct DisplayChain<'a>(pub &'a dyn std::error::Error);

impl std::fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(e) = source {
            write!(f, ": {e}")?;
            source = e.source();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_data_dir() {
        let ctx = RunContext::default().with_data_dir("/data");
        assert_eq!(ctx.resolve(Path::new("a.stl")), PathBuf::from("/data/a.stl"));
        assert_eq!(ctx.resolve(Path::new("/abs/a.stl")), PathBuf::from("/abs/a.stl"));
        assert_eq!(
            RunContext::default().resolve(Path::new("a.stl")),
            PathBuf::from("a.stl")
        );
    }

    #[test]
    fn empty_mesh_is_not_saved() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("empty.stl");
        assert!(!save_poly_data(&path, &Mesh::<()>::new(), StlFormat::Ascii));
        assert!(!path.exists());
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = DriverError::Boolean {
            case: "x".into(),
            source: BooleanError::EmptyInput { index: 1 },
        };
        assert_eq!(
            DisplayChain(&err).to_string(),
            "case `x` failed: input 1 of the boolean filter is empty"
        );
    }
}
