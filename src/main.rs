//! `stlbool` command line: run the boolean test plan, a single ad-hoc case,
//! or write sample inputs.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use stlbool::driver::{self, DisplayChain, RunContext};
use stlbool::{BooleanOp, CaseSelection, StlFormat, TestCase, TestPlan, float_types};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stlbool", version, about = "Boolean operations on STL meshes")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,

    /// Write binary STL instead of ASCII
    #[arg(long, global = true)]
    binary: bool,

    /// Weld tolerance for comparing vertex positions
    #[arg(long, global = true, value_name = "T")]
    tolerance: Option<f64>,

    /// Exit without waiting for Enter
    #[arg(long, global = true)]
    no_pause: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the test plan (the default)
    Run(RunArgs),
    /// Run one case
    Bool {
        /// union, intersection, difference or difference2
        op: BooleanOp,
        a: PathBuf,
        b: PathBuf,
        out: PathBuf,
        /// Preprocess both inputs first
        #[arg(long)]
        preprocess: bool,
    },
    /// Write sample inputs under the stock file names
    Generate { dir: PathBuf },
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    /// TOML test plan; the built-in cases are used otherwise
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Run only case N (1-based, repeatable), even if disabled
    #[arg(long = "case", value_name = "N")]
    cases: Vec<usize>,

    /// Include disabled cases
    #[arg(long, conflicts_with = "cases")]
    all: bool,

    /// Directory that relative case paths are resolved against
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "stlbool=info",
        1 => "stlbool=debug",
        _ => "stlbool=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run_plan(args: RunArgs, format: StlFormat) -> Result<bool> {
    let plan = match &args.plan {
        Some(path) => TestPlan::load(path)?,
        None => TestPlan::builtin(),
    };
    let selection = if !args.cases.is_empty() {
        CaseSelection::Numbers(args.cases)
    } else if args.all {
        CaseSelection::All
    } else {
        CaseSelection::Enabled
    };

    let mut ctx = RunContext::default()
        .with_format(format)
        .with_preprocess(plan.preprocess.clone());
    if let Some(dir) = args.data_dir {
        ctx = ctx.with_data_dir(dir);
    }

    let report = driver::run_plan(&plan, &selection, &ctx)?;
    info!(
        cases = report.results.len(),
        failed = report.failures(),
        "plan finished"
    );
    Ok(report.all_succeeded())
}

fn execute(cli: Cli) -> Result<bool> {
    let format = if cli.binary {
        StlFormat::Binary
    } else {
        StlFormat::Ascii
    };

    match cli.command {
        None => run_plan(cli.run, format),
        Some(Command::Run(args)) => run_plan(args, format),
        Some(Command::Bool {
            op,
            a,
            b,
            out,
            preprocess,
        }) => {
            let case = TestCase::new("ad-hoc", op, a, b, out).with_preprocess(preprocess);
            let ctx = RunContext::default().with_format(format);
            match driver::run_case(&case, &ctx) {
                Ok(outcome) => {
                    info!(
                        result = outcome.output_triangles,
                        manifold = outcome.manifold,
                        "case finished"
                    );
                    Ok(true)
                },
                Err(e) => {
                    warn!(error = %DisplayChain(&e), "case failed");
                    Ok(false)
                },
            }
        },
        Some(Command::Generate { dir }) => {
            let written = driver::generate_samples(&dir, format)
                .with_context(|| format!("writing samples to {}", dir.display()))?;
            info!(files = written.len(), dir = %dir.display(), "samples written");
            Ok(true)
        },
    }
}

fn pause() {
    let mut line = String::new();
    // EOF or a closed stdin ends the wait as well
    let _ = std::io::stdin().read_line(&mut line);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(t) = cli.tolerance {
        if !float_types::set_tolerance(t) {
            warn!(tolerance = t, "tolerance already set; ignoring --tolerance");
        }
    }

    let no_pause = cli.no_pause;
    let outcome = execute(cli);

    if !no_pause {
        pause();
    }

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        },
    }
}
