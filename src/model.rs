//! MILP formulation of a production-planning instance.
//!
//! For products `i = 0..n` the model has an integer quantity `x_i ≥ 0` and a binary
//! activation flag `y_i`, and the constraints
//!
//! ```text
//! nonnegativity_i:   x_i ≥ 0
//! max_production_i:  x_i ≤ M[i]
//! activation_i:      x_i − D·y_i ≤ 0            (D = 1000)
//! raw_material:      Σ p[i]·x_i + e[i]·y_i ≤ Q
//! ```
//!
//! with objective `max Σ c[i]·x_i − s[i]·y_i`. The per-product families are added
//! family by family, followed by the single budget constraint.

use std::fs::File;

use anyhow::{Context, Result};
use tracing::debug;

use crate::constraint;
use crate::instance::ProblemInstance;
use crate::lp_solver::output_suppression::LogCapture;
use crate::lp_solver::{
    ConstraintId, LPModelBuilder, LPSolution, LinearExpression, OptimizationSense,
    SolverOptions, VariableId, VariableType,
};

/// Big-M constant of the activation constraints.
pub const BIG_M: f64 = 1000.0;

/// Brand of production-planning models.
pub enum ProductionPlan {}

/// A production-planning model ready to be solved.
pub struct ProductionModel {
    pub builder: LPModelBuilder<ProductionPlan>,
    /// `x_i`, units of each product
    pub production: Vec<VariableId<ProductionPlan>>,
    /// `y_i`, whether each product is activated
    pub activation: Vec<VariableId<ProductionPlan>>,
}

/// What a solve of a [`ProductionModel`] produced.
pub enum PlanOutcome {
    /// The backend returned a status other than infeasible.
    Solved(LPSolution<ProductionPlan>),
    /// The model is infeasible; `conflict` is an irreducible set of its constraints.
    Infeasible {
        solution: LPSolution<ProductionPlan>,
        conflict: Vec<ConstraintId>,
    },
}

impl PlanOutcome {
    /// The solution of the main solve, whatever its status
    pub fn solution(&self) -> &LPSolution<ProductionPlan> {
        match self {
            PlanOutcome::Solved(solution) => solution,
            PlanOutcome::Infeasible { solution, .. } => solution,
        }
    }
}

/// Formulate `instance` as a MILP named `name`.
pub fn build_production_model(instance: &ProblemInstance, name: &str) -> ProductionModel {
    let n = instance.len();
    let mut builder = LPModelBuilder::<ProductionPlan>::new();
    builder.set_name(name);

    let production: Vec<_> = (0..n)
        .map(|i| builder.add_variable(format!("x_{}", i), VariableType::Integer, 0.0, f64::INFINITY))
        .collect();
    let activation: Vec<_> = (0..n)
        .map(|i| builder.add_variable(format!("y_{}", i), VariableType::Binary, 0.0, 1.0))
        .collect();

    for (i, &x) in production.iter().enumerate() {
        builder.add_constraint(constraint!(format!("nonnegativity_{}", i), (x) >= 0.0));
    }

    for (i, (&x, &cap)) in production
        .iter()
        .zip(instance.max_production())
        .enumerate()
    {
        builder.add_constraint(constraint!(format!("max_production_{}", i), (x) <= cap));
    }

    for (i, (&x, &y)) in production.iter().zip(&activation).enumerate() {
        builder.add_constraint(constraint!(
            format!("activation_{}", i),
            (x - BIG_M * y) <= 0.0
        ));
    }

    let usage: LinearExpression<ProductionPlan> = (0..n)
        .map(|i| {
            instance.unit_usage()[i] * production[i]
                + instance.activation_usage()[i] * activation[i]
        })
        .sum();
    builder.add_constraint(constraint!("raw_material", (usage) <= instance.material()));

    let profit: LinearExpression<ProductionPlan> = (0..n)
        .map(|i| {
            instance.unit_profit()[i] * production[i]
                - instance.activation_cost()[i] * activation[i]
        })
        .sum();
    builder.set_objective(profit, OptimizationSense::Maximize);

    ProductionModel {
        builder,
        production,
        activation,
    }
}

impl ProductionModel {
    /// Solve the model, refining the conflict when it turns out infeasible.
    ///
    /// With a `solver_log` file, the search log of the main solve is appended to it.
    /// Refinement trial solves run silenced either way.
    pub fn solve(
        &self,
        options: &SolverOptions,
        solver_log: Option<&File>,
    ) -> Result<PlanOutcome> {
        let solution = match solver_log {
            Some(file) => {
                let _capture = LogCapture::stdout_into(file)
                    .context("Failed to redirect the solver log")?;
                self.builder.solve_with(&SolverOptions {
                    log_output: true,
                    ..*options
                })?
            }
            None => self.builder.solve_with(options)?,
        };
        debug!(
            status = ?solution.status,
            seconds = solution.statistics.solve_time.as_secs_f64(),
            "solved {}",
            self.builder.name()
        );

        if solution.status.is_infeasible() {
            let conflict = self.builder.refine_conflict(options)?;
            debug!(size = conflict.len(), "refined conflict of {}", self.builder.name());
            return Ok(PlanOutcome::Infeasible { solution, conflict });
        }

        Ok(PlanOutcome::Solved(solution))
    }
}
