//! Plain-text instance reports.
//!
//! A report holds, in order: the coefficient vectors of the instance, a summary of
//! the model, the solution (or, for infeasible models, the conflicting constraints)
//! and the solve statistics.

use std::io::{self, Write};

use itertools::Itertools;
use prettytable::*;

use crate::instance::ProblemInstance;
use crate::lp_solver::{
    ConstraintId, LPModelBuilder, LPSolution, OptimizationSense, OptimizationStatus,
    SolveStatistics, SolverOptions,
};

fn format_vector(values: &[f64]) -> String {
    format!("[{}]", values.iter().map(|v| format!("{:.8}", v)).join(" "))
}

/// Write the coefficient vectors `s`, `e`, `c`, `p` and the budget `Q`.
pub fn write_parameters(writer: &mut dyn Write, instance: &ProblemInstance) -> io::Result<()> {
    writeln!(
        writer,
        "s_i - fixed cost of starting production of product i [profit/cost unit]:\n{}",
        format_vector(instance.activation_cost())
    )?;
    writeln!(
        writer,
        "e_i - raw material used to start production of product i [usage unit]:\n{}",
        format_vector(instance.activation_usage())
    )?;
    writeln!(
        writer,
        "c_i - unit profit from producing product i [profit/cost unit]:\n{}",
        format_vector(instance.unit_profit())
    )?;
    writeln!(
        writer,
        "p_i - unit raw material usage of product i [usage unit]:\n{}",
        format_vector(instance.unit_usage())
    )?;
    writeln!(
        writer,
        "Q - total raw material available [usage unit]: {:.8}",
        instance.material()
    )
}

/// Write the model summary: variable and constraint counts, parameters, objective.
pub fn write_model_information<Brand>(
    writer: &mut dyn Write,
    builder: &LPModelBuilder<Brand>,
    options: &SolverOptions,
) -> io::Result<()> {
    let info = builder.information();

    writeln!(writer, "Model: {}", builder.name())?;
    writeln!(writer, " - number of variables: {}", info.variables())?;
    writeln!(
        writer,
        "   - binary={}, integer={}, continuous={}",
        info.binary, info.integer, info.continuous
    )?;
    writeln!(writer, " - number of constraints: {}", info.constraints())?;
    writeln!(
        writer,
        "   - linear={} (<=: {}, ==: {}, >=: {})",
        info.constraints(),
        info.less_equal,
        info.equal,
        info.greater_equal
    )?;
    writeln!(
        writer,
        " - parameters: presolve={}",
        if options.presolve { "on" } else { "off" }
    )?;
    writeln!(
        writer,
        " - objective: {}",
        match info.objective {
            Some(OptimizationSense::Maximize) => "maximize",
            Some(OptimizationSense::Minimize) => "minimize",
            None => "none",
        }
    )?;
    writeln!(writer, " - problem type is: {}", info.problem_type())
}

fn status_name(status: OptimizationStatus) -> &'static str {
    match status {
        OptimizationStatus::Optimal => "optimal",
        OptimizationStatus::Feasible => "feasible",
        OptimizationStatus::Infeasible => "infeasible",
        OptimizationStatus::Unbounded => "unbounded",
        OptimizationStatus::InfeasibleOrUnbounded => "infeasible or unbounded",
        OptimizationStatus::Other(status) => status,
    }
}

/// Write the objective, the status and every variable value.
///
/// Without a usable solution only the status is written.
pub fn write_solution<Brand>(
    writer: &mut dyn Write,
    builder: &LPModelBuilder<Brand>,
    solution: &LPSolution<Brand>,
) -> io::Result<()> {
    if !solution.status.has_solution() {
        return writeln!(
            writer,
            "No solution for {} (status: {})",
            builder.name(),
            status_name(solution.status)
        );
    }

    writeln!(writer, "solution for: {}", builder.name())?;
    writeln!(writer, "objective: {:.6}", solution.objective_value)?;
    writeln!(writer, "status: {}", status_name(solution.status))?;

    let mut table = Table::new();
    table.set_titles(row!["Variable", "Value"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for (var_id, info) in builder.variables() {
        let value = solution.get_value(var_id).unwrap_or(0.0);
        table.add_row(row![info.name, format!("{}", value)]);
    }
    table.print(writer)?;

    Ok(())
}

/// Write the constraints of a refined conflict with their definitions.
pub fn write_conflict<Brand>(
    writer: &mut dyn Write,
    builder: &LPModelBuilder<Brand>,
    conflict: &[ConstraintId],
) -> io::Result<()> {
    writeln!(
        writer,
        "Model {} is infeasible. Conflict set ({} {}):",
        builder.name(),
        conflict.len(),
        if conflict.len() == 1 {
            "constraint"
        } else {
            "constraints"
        }
    )?;

    if conflict.is_empty() {
        return writeln!(writer, "  (variable domains alone are contradictory)");
    }

    let mut table = Table::new();
    table.set_titles(row!["Constraint", "Definition"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for &constr_id in conflict {
        table.add_row(row![
            builder.constraint(constr_id).name(),
            builder.format_constraint(constr_id),
        ]);
    }
    table.print(writer)?;

    Ok(())
}

/// Write the node count and the solve time in seconds.
pub fn write_statistics(writer: &mut dyn Write, statistics: &SolveStatistics) -> io::Result<()> {
    match statistics.node_count {
        Some(nodes) => writeln!(writer, "Nodes explored: {}", nodes)?,
        None => writeln!(writer, "Nodes explored: not reported by solver")?,
    }
    writeln!(
        writer,
        "Solve time [s]: {:.6}",
        statistics.solve_time.as_secs_f64()
    )
}
