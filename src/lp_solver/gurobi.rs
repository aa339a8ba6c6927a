use std::collections::HashMap;
use std::time::Instant;

use ::gurobi::{ConstrSense, Env, LinExpr, Model, ModelSense, Status, VarType, attr, param};

use crate::lp_solver::*;

/// Solve a model using Gurobi
pub fn solve_gurobi<Brand>(
    builder: &LPModelBuilder<Brand>,
    options: &SolverOptions,
) -> Result<LPSolution<Brand>> {
    let mut env = Env::new("")?;
    env.set(param::OutputFlag, i32::from(options.log_output))?;
    if !options.presolve {
        env.set(param::Presolve, 0)?;
    }
    let mut model = Model::new(builder.name(), &env)?;

    let mut var_map = HashMap::new();
    for (var_id, var_info) in builder.variables() {
        let vtype = match var_info.var_type {
            VariableType::Continuous => VarType::Continuous,
            VariableType::Integer => VarType::Integer,
            VariableType::Binary => VarType::Binary,
        };

        let var = model.add_var(
            &var_info.name,
            vtype,
            0.0, // objective coefficient
            var_info.lower_bound,
            var_info.upper_bound,
            &[], // coefficients for existing constraints
            &[], // constraint indices
        )?;

        var_map.insert(var_id, var);
    }
    model.update()?;

    for constraint in &builder.constraints {
        let mut gurobi_expr = LinExpr::new();

        for term in &constraint.expression.terms {
            let var = var_map.get(&term.variable).ok_or_else(|| {
                anyhow::anyhow!("Variable {:?} not found in model", term.variable)
            })?;
            gurobi_expr = gurobi_expr.add_term(term.coefficient, var.clone());
        }
        gurobi_expr = gurobi_expr.add_constant(constraint.expression.constant);

        let sense = match constraint.sense {
            ConstraintSense::LessEqual => ConstrSense::Less,
            ConstraintSense::Equal => ConstrSense::Equal,
            ConstraintSense::GreaterEqual => ConstrSense::Greater,
        };

        model.add_constr(&constraint.name, gurobi_expr, sense, constraint.rhs)?;
    }

    // Update the model before setting objective
    model.update()?;

    if let Some(obj_info) = &builder.objective {
        let mut gurobi_expr = LinExpr::new();

        for term in &obj_info.expression.terms {
            let var = var_map.get(&term.variable).ok_or_else(|| {
                anyhow::anyhow!("Variable {:?} not found in model", term.variable)
            })?;
            gurobi_expr = gurobi_expr.add_term(term.coefficient, var.clone());
        }
        gurobi_expr = gurobi_expr.add_constant(obj_info.expression.constant);

        let sense = match obj_info.sense {
            OptimizationSense::Minimize => ModelSense::Minimize,
            OptimizationSense::Maximize => ModelSense::Maximize,
        };

        model.set_objective(gurobi_expr, sense)?;
    }

    let started = Instant::now();
    model.optimize()?;
    let solve_time = started.elapsed();

    let optimization_status = match model.status()? {
        Status::Optimal => OptimizationStatus::Optimal,
        Status::SubOptimal => OptimizationStatus::Feasible,
        Status::Infeasible => OptimizationStatus::Infeasible,
        Status::InfOrUnbd => OptimizationStatus::InfeasibleOrUnbounded,
        Status::Unbounded => OptimizationStatus::Unbounded,
        _ => OptimizationStatus::Other("Unknown status"),
    };

    let node_count = model.get(attr::NodeCount)?;

    let mut variable_values = vec![0.0; var_map.len()];
    let objective_value = if optimization_status.has_solution() {
        for (var_id, var) in &var_map {
            variable_values[var_id.index()] = var.get(&model, attr::X)?;
        }
        model.get(attr::ObjVal)?
    } else {
        0.0
    };

    Ok(LPSolution {
        status: optimization_status,
        objective_value,
        statistics: SolveStatistics {
            solve_time,
            node_count: Some(node_count.max(0.0) as u64),
        },
        variable_values,
        _brand: std::marker::PhantomData,
    })
}
