use std::collections::HashMap;
use std::time::Instant;

use crate::lp_solver::output_suppression::SilenceGuard;
use crate::lp_solver::*;
use ::coin_cbc::{Model, Sense};

/// Round a floating-point number to a specified number of significant digits
/// This is an workaround to mask floating point errors in CBC.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

/// Solve a model using Coin CBC
///
/// CBC does not expose the branch-and-bound node count through its C interface
/// bindings, so [`SolveStatistics::node_count`] is always `None` here.
pub fn solve_coin_cbc<Brand>(
    builder: &LPModelBuilder<Brand>,
    options: &SolverOptions,
) -> Result<LPSolution<Brand>> {
    let _silence = if options.log_output {
        None
    } else {
        Some(SilenceGuard::stdout()?)
    };
    let mut model = Model::default();
    let mut var_map = HashMap::new();

    if !options.presolve {
        model.set_parameter("presolve", "off");
        model.set_parameter("preprocess", "off");
    }

    for (var_id, var_info) in builder.variables() {
        let col = match var_info.var_type {
            VariableType::Continuous => {
                let col = model.add_col();
                model.set_col_lower(col, var_info.lower_bound);
                model.set_col_upper(col, var_info.upper_bound);
                col
            }
            VariableType::Integer => {
                let col = model.add_integer();
                model.set_col_lower(col, var_info.lower_bound);
                model.set_col_upper(col, var_info.upper_bound);
                col
            }
            VariableType::Binary => model.add_binary(),
        };
        var_map.insert(var_id, col);
    }

    for constraint in &builder.constraints {
        let row = model.add_row();

        for term in &constraint.expression.terms {
            let col = var_map.get(&term.variable).ok_or_else(|| {
                anyhow::anyhow!("Variable {:?} not found in model", term.variable)
            })?;
            model.set_weight(row, *col, term.coefficient);
        }

        let rhs_adjusted = constraint.rhs - constraint.expression.constant;

        match constraint.sense {
            ConstraintSense::LessEqual => {
                model.set_row_upper(row, rhs_adjusted);
            }
            ConstraintSense::Equal => {
                model.set_row_equal(row, rhs_adjusted);
            }
            ConstraintSense::GreaterEqual => {
                model.set_row_lower(row, rhs_adjusted);
            }
        }
    }

    if let Some(obj_info) = &builder.objective {
        for term in &obj_info.expression.terms {
            let col = var_map.get(&term.variable).ok_or_else(|| {
                anyhow::anyhow!("Variable {:?} not found in model", term.variable)
            })?;
            model.set_obj_coeff(*col, term.coefficient);
        }

        let sense = match obj_info.sense {
            OptimizationSense::Minimize => Sense::Minimize,
            OptimizationSense::Maximize => Sense::Maximize,
        };

        model.set_obj_sense(sense);
    }

    let started = Instant::now();
    let solution = model.solve();
    let solve_time = started.elapsed();

    let status = if solution.raw().is_proven_optimal() {
        OptimizationStatus::Optimal
    } else if solution.raw().is_proven_infeasible() {
        OptimizationStatus::Infeasible
    } else if solution.raw().is_continuous_unbounded() {
        OptimizationStatus::Unbounded
    } else {
        OptimizationStatus::Other("Unknown status")
    };

    let mut variable_values = vec![0.0; var_map.len()];
    if status.has_solution() {
        for (var_id, col) in var_map.iter() {
            let value = solution.col(*col);
            variable_values[var_id.index()] = match builder.variable(*var_id).var_type {
                VariableType::Continuous => round_to_sig_digits(value, 8),
                // integral columns come back with tolerance noise
                VariableType::Integer | VariableType::Binary => value.round() + 0.0,
            };
        }
    }

    // CBC never sees the constant term of the objective
    let objective_value = match &builder.objective {
        Some(obj_info) if status.has_solution() => round_to_sig_digits(
            solution.raw().obj_value() + obj_info.expression.constant,
            8,
        ),
        _ => 0.0,
    };

    Ok(LPSolution {
        status,
        objective_value,
        statistics: SolveStatistics {
            solve_time,
            node_count: None,
        },
        variable_values,
        _brand: std::marker::PhantomData,
    })
}
