//! The instance generation run behind the command line.
//!
//! A run generates [`INSTANCES_PER_RUN`] instances of the same size. Iteration `k`
//! re-seeds a fresh generator from the [`SeedSequence`], formulates and solves the
//! instance and writes its report to `n{n}_k{k}.txt`. The solver's search log of the
//! main solve is captured into the same file, between the model summary and the
//! solution. Each report file is owned by its iteration and closed before the next one
//! starts.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use prodmix::generate::{GenerateArgs, generate_main};
//!
//! let args = GenerateArgs {
//!     index: 0,
//!     size: 2,
//!     presolve: true,
//!     no_presolve: false,
//!     output_dir: "reports".into(),
//! };
//!
//! generate_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use crate::{
    instance::{INSTANCES_PER_RUN, ProblemInstance, SeedSequence, generate_instance, rng_for_seed},
    lp_solver::{OptimizationStatus, SolverOptions},
    model::{PlanOutcome, build_production_model},
    report,
};

/// Command-line arguments of a generation run.
#[derive(Parser, Debug)]
#[clap(
    name = "prodmix",
    about = "Generate production-planning instances, solve them as MILPs and report the results"
)]
pub struct GenerateArgs {
    /// Base seed index (may be negative)
    #[clap(short = 'i', allow_negative_numbers = true)]
    pub index: i64,

    /// Instance size (number of products)
    #[clap(short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub size: u64,

    /// Enable solver presolve
    #[clap(short = 'p', overrides_with = "no_presolve")]
    pub presolve: bool,

    /// Disable solver presolve (default)
    #[clap(long = "no-p", overrides_with = "presolve")]
    pub no_presolve: bool,

    /// Directory receiving the per-instance reports
    #[clap(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl GenerateArgs {
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            presolve: self.presolve && !self.no_presolve,
            ..Default::default()
        }
    }
}

/// Name of the model and report of iteration `k` for instances of size `n`.
pub fn instance_name(n: u64, k: u64) -> String {
    format!("n{}_k{}", n, k)
}

/// Write the full report of one instance and return the status of its solve.
///
/// Infeasible instances get a conflict listing in place of the solution. When
/// `solver_log` is the file behind `writer`, the search log of the solve lands between
/// the model summary and the solution; without it the log is discarded.
pub fn solve_instance(
    writer: &mut dyn Write,
    solver_log: Option<&File>,
    name: &str,
    instance: &ProblemInstance,
    options: &SolverOptions,
) -> Result<OptimizationStatus> {
    report::write_parameters(writer, instance)?;

    let model = build_production_model(instance, name);
    report::write_model_information(writer, &model.builder, options)?;
    // The log is appended to the file directly, after everything buffered so far
    writer.flush()?;

    let outcome = model.solve(options, solver_log)?;
    match &outcome {
        PlanOutcome::Solved(solution) => {
            report::write_solution(writer, &model.builder, solution)?;
        }
        PlanOutcome::Infeasible { conflict, .. } => {
            warn!(conflict = conflict.len(), "{} is infeasible", name);
            report::write_conflict(writer, &model.builder, conflict)?;
        }
    }

    let solution = outcome.solution();
    report::write_statistics(writer, &solution.statistics)?;

    Ok(solution.status)
}

fn write_report(
    path: &Path,
    name: &str,
    instance: &ProblemInstance,
    options: &SolverOptions,
) -> Result<OptimizationStatus> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(&file);

    let status = solve_instance(&mut writer, Some(&file), name, instance, options)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report file {}", path.display()))?;

    Ok(status)
}

/// Generate, solve and report every instance of a run.
pub fn generate_main(args: GenerateArgs) -> Result<()> {
    let options = args.solver_options();
    let GenerateArgs {
        index,
        size,
        output_dir,
        ..
    } = args;

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let products = usize::try_from(size).context("Instance size does not fit in memory")?;

    for (k, seed) in SeedSequence::new(index, size, INSTANCES_PER_RUN) {
        let name = instance_name(size, k);
        let path = output_dir.join(format!("{}.txt", name));
        info!(k, seed, path = %path.display(), "generating instance");

        let mut rng = rng_for_seed(seed);
        let instance = generate_instance(products, &mut rng);

        let status = write_report(&path, &name, &instance, &options)?;
        info!(k, status = ?status, "finished {}", name);
    }

    Ok(())
}
