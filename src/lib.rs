//! Production-planning instance generator and MILP driver
//!
//! `prodmix` draws random instances of a single-item-per-product production problem,
//! formulates each one as a mixed-integer linear program, solves it with an external
//! MILP solver and writes a plain-text report per instance.
//!
//! # The Problem
//!
//! Each product *i* has an activation cost `s[i]`, a fixed raw-material usage `e[i]`
//! paid when the product is activated, a unit profit `c[i]`, a unit raw-material usage
//! `p[i]` and a production cap `M[i] = 1`. A shared raw-material budget `Q` bounds the
//! total usage. The model maximises
//!
//! ```text
//! Σ c[i]·x[i] − s[i]·y[i]
//! ```
//!
//! over integer quantities `x[i]` and binary activation flags `y[i]`, linked by the
//! big-M constraint `x[i] ≤ 1000·y[i]`.
//!
//! # Workflow
//!
//! 1. **Generation** ([`instance`]): coefficients are drawn from uniform
//!    distributions with an explicitly seeded generator.
//! 2. **Formulation** ([`model`]): the instance becomes a branded
//!    [`lp_solver::LPModelBuilder`].
//! 3. **Solving** ([`lp_solver`]): the model runs on CBC or Gurobi; infeasible models
//!    go through conflict refinement.
//! 4. **Reporting** ([`report`]): parameters, model summary, solution or conflict and
//!    solve statistics are written to `n{n}_k{k}.txt`.
//!
//! [`generate`] ties these together in the five-instance loop behind the command line.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use prodmix::instance::{generate_instance, rng_for_seed};
//! use prodmix::model::build_production_model;
//! use prodmix::lp_solver::SolverOptions;
//!
//! let mut rng = rng_for_seed(42);
//! let instance = generate_instance(10, &mut rng);
//! let model = build_production_model(&instance, "example");
//! let options = SolverOptions {
//!     presolve: true,
//!     ..Default::default()
//! };
//! let outcome = model.solve(&options, None)?;
//! println!("{:?}", outcome.solution().status);
//! # Ok(())
//! # }
//! ```

use std::{error::Error, fmt};

pub mod generate;
pub mod instance;
pub mod lp_solver;
pub mod model;
pub mod report;

pub use generate::{GenerateArgs, generate_main};

/// Application-level errors.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// A hand-built instance has coefficient vectors of different lengths.
    MismatchedLengths {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// Conflict refinement was requested for a model that has a feasible point.
    NotInfeasible,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MismatchedLengths {
                field,
                expected,
                found,
            } => write!(
                f,
                "Coefficient vector {} has {} entries, expected {}",
                field, found, expected
            ),
            AppError::NotInfeasible => write!(f, "Model is feasible, no conflict to refine"),
        }
    }
}

impl Error for AppError {}
